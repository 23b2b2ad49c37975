//! Drive the free-play loop against an in-memory board.
//!
//! Run with: `cargo run --example free_play_demo`

use std::io::Cursor;

use keytone::device::{Device, DeviceConfig, Mode};
use keytone::hal::{Clock, KeyInput, LedBus, NavButton, ScriptStore, StorageError, TextDisplay, ToneGen};
use keytone::input::KeyMask;
use keytone::script::SongName;

/// Scripted key timeline: each entry is (from_ms, mask bits).
struct DemoKeys {
    now_ms: std::rc::Rc<std::cell::Cell<u64>>,
    timeline: Vec<(u64, u8)>,
}

impl KeyInput for DemoKeys {
    fn sample_keys(&mut self) -> KeyMask {
        let now = self.now_ms.get();
        let bits = self
            .timeline
            .iter()
            .rev()
            .find(|(from, _)| *from <= now)
            .map(|(_, bits)| *bits)
            .unwrap_or(0);
        KeyMask::from_bits(bits)
    }

    fn nav_pressed(&mut self, _button: NavButton) -> bool {
        false
    }
}

struct DemoClock {
    now_ms: std::rc::Rc<std::cell::Cell<u64>>,
}

impl Clock for DemoClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }
}

struct StdoutDisplay;

impl TextDisplay for StdoutDisplay {
    fn clear(&mut self) {}
    fn set_cursor(&mut self, _col: u8, _row: u8) {}
    fn print(&mut self, text: &str) {
        println!("lcd   | {}", text);
    }
}

struct StdoutLeds;

impl LedBus for StdoutLeds {
    fn write(&mut self, bits: u8) {
        println!("leds  | {:08b}", bits);
    }
}

struct StdoutTone;

impl ToneGen for StdoutTone {
    fn start(&mut self, freq_hz: u32) {
        println!("tone  | start {} Hz", freq_hz);
    }
    fn stop(&mut self) {
        println!("tone  | stop");
    }
    fn beep(&mut self, freq_hz: u32, duration_ms: u32) {
        println!("tone  | beep {} Hz for {} ms", freq_hz, duration_ms);
    }
}

struct NoStorage;

impl ScriptStore for NoStorage {
    type Script = Cursor<Vec<u8>>;

    fn available(&mut self) -> bool {
        false
    }

    fn list_scripts(&mut self, _limit: usize) -> Result<Vec<SongName>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn open(&mut self, name: &SongName) -> Result<Self::Script, StorageError> {
        Err(StorageError::NotFound(name.as_str().to_string()))
    }
}

fn main() {
    let now_ms = std::rc::Rc::new(std::cell::Cell::new(0));
    let keys = DemoKeys {
        now_ms: std::rc::Rc::clone(&now_ms),
        // A single key, then a chord, then silence.
        timeline: vec![(0, 0), (20, 0b0000_0001), (120, 0b0001_0001), (240, 0)],
    };
    let clock = DemoClock { now_ms };

    let mut device = Device::new(
        keys,
        StdoutDisplay,
        StdoutLeds,
        StdoutTone,
        NoStorage,
        clock,
        DeviceConfig::default(),
    );

    device.set_mode(Mode::FreePlay);
    for _ in 0..60 {
        device.step();
    }
    device.set_mode(Mode::Menu);
}
