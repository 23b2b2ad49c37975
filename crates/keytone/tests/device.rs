//! End-to-end scenarios for the mode state machine, run against a scripted
//! in-memory board.

use std::cell::{Cell, RefCell};
use std::io::Cursor;
use std::rc::Rc;

use keytone::device::{Device, DeviceConfig, Mode};
use keytone::hal::{
    Clock, KeyInput, LedBus, NavButton, ScriptStore, StorageError, TextDisplay, ToneGen,
};
use keytone::input::KeyMask;
use keytone::script::SongName;

/// Half-open activation window on the virtual timeline.
#[derive(Debug, Clone, Copy)]
struct Window {
    from_ms: u64,
    to_ms: u64,
}

impl Window {
    fn contains(&self, now: u64) -> bool {
        self.from_ms <= now && now < self.to_ms
    }
}

fn window(from_ms: u64, to_ms: u64) -> Window {
    Window { from_ms, to_ms }
}

struct TestKeys {
    now: Rc<Cell<u64>>,
    key_plan: Vec<(Window, u8)>,
    nav_plan: Vec<(NavButton, Window)>,
}

impl KeyInput for TestKeys {
    fn sample_keys(&mut self) -> KeyMask {
        let now = self.now.get();
        let bits = self
            .key_plan
            .iter()
            .filter(|(win, _)| win.contains(now))
            .fold(0u8, |acc, (_, bits)| acc | bits);
        KeyMask::from_bits(bits)
    }

    fn nav_pressed(&mut self, button: NavButton) -> bool {
        let now = self.now.get();
        self.nav_plan
            .iter()
            .any(|(b, win)| *b == button && win.contains(now))
    }
}

struct TestClock {
    now: Rc<Cell<u64>>,
}

impl Clock for TestClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

struct TestDisplay {
    lines: Rc<RefCell<Vec<String>>>,
}

impl TextDisplay for TestDisplay {
    fn clear(&mut self) {}

    fn set_cursor(&mut self, _col: u8, _row: u8) {}

    fn print(&mut self, text: &str) {
        self.lines.borrow_mut().push(text.to_string());
    }
}

struct TestLeds {
    writes: Rc<RefCell<Vec<u8>>>,
}

impl LedBus for TestLeds {
    fn write(&mut self, bits: u8) {
        self.writes.borrow_mut().push(bits);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToneEvent {
    Start(u32),
    Stop,
    Beep(u32),
}

struct TestTone {
    events: Rc<RefCell<Vec<ToneEvent>>>,
}

impl ToneGen for TestTone {
    fn start(&mut self, freq_hz: u32) {
        self.events.borrow_mut().push(ToneEvent::Start(freq_hz));
    }

    fn stop(&mut self) {
        self.events.borrow_mut().push(ToneEvent::Stop);
    }

    fn beep(&mut self, freq_hz: u32, _duration_ms: u32) {
        self.events.borrow_mut().push(ToneEvent::Beep(freq_hz));
    }
}

struct MemStore {
    present: bool,
    songs: Vec<(String, String)>,
}

impl ScriptStore for MemStore {
    type Script = Cursor<Vec<u8>>;

    fn available(&mut self) -> bool {
        self.present
    }

    fn list_scripts(&mut self, limit: usize) -> Result<Vec<SongName>, StorageError> {
        if !self.present {
            return Err(StorageError::Unavailable);
        }
        Ok(self
            .songs
            .iter()
            .take(limit)
            .map(|(name, _)| SongName::truncated(name))
            .collect())
    }

    fn open(&mut self, name: &SongName) -> Result<Self::Script, StorageError> {
        self.songs
            .iter()
            .find(|(candidate, _)| candidate == name.as_str())
            .map(|(_, body)| Cursor::new(body.clone().into_bytes()))
            .ok_or_else(|| StorageError::NotFound(name.as_str().to_string()))
    }
}

struct Probes {
    lines: Rc<RefCell<Vec<String>>>,
    led_writes: Rc<RefCell<Vec<u8>>>,
    tone_events: Rc<RefCell<Vec<ToneEvent>>>,
}

impl Probes {
    fn printed(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|line| line.contains(needle))
    }

    fn beeps(&self) -> Vec<ToneEvent> {
        self.tone_events
            .borrow()
            .iter()
            .copied()
            .filter(|event| matches!(event, ToneEvent::Beep(_)))
            .collect()
    }
}

type TestDevice = Device<TestKeys, TestDisplay, TestLeds, TestTone, MemStore, TestClock>;

fn build_device(
    key_plan: Vec<(Window, u8)>,
    nav_plan: Vec<(NavButton, Window)>,
    songs: Vec<(&str, &str)>,
) -> (TestDevice, Probes) {
    build_device_with_storage(key_plan, nav_plan, songs, true)
}

fn build_device_with_storage(
    key_plan: Vec<(Window, u8)>,
    nav_plan: Vec<(NavButton, Window)>,
    songs: Vec<(&str, &str)>,
    present: bool,
) -> (TestDevice, Probes) {
    let now = Rc::new(Cell::new(0));
    let lines = Rc::new(RefCell::new(Vec::new()));
    let led_writes = Rc::new(RefCell::new(Vec::new()));
    let tone_events = Rc::new(RefCell::new(Vec::new()));

    let device = Device::new(
        TestKeys {
            now: Rc::clone(&now),
            key_plan,
            nav_plan,
        },
        TestDisplay {
            lines: Rc::clone(&lines),
        },
        TestLeds {
            writes: Rc::clone(&led_writes),
        },
        TestTone {
            events: Rc::clone(&tone_events),
        },
        MemStore {
            present,
            songs: songs
                .into_iter()
                .map(|(name, body)| (name.to_string(), body.to_string()))
                .collect(),
        },
        TestClock { now },
        DeviceConfig::default(),
    );

    (
        device,
        Probes {
            lines,
            led_writes,
            tone_events,
        },
    )
}

fn step_until(device: &mut TestDevice, target: &Mode, max_steps: usize) -> bool {
    for _ in 0..max_steps {
        if device.mode() == target {
            return true;
        }
        device.step();
    }
    device.mode() == target
}

#[test]
fn test_free_play_idle_is_silent_and_blank() {
    let (mut device, probes) = build_device(vec![], vec![], vec![]);
    device.set_mode(Mode::FreePlay);

    for _ in 0..20 {
        device.step();
    }

    assert!(probes.led_writes.borrow().is_empty());
    assert!(probes.tone_events.borrow().is_empty());
}

#[test]
fn test_free_play_chord_blends_in_pitch_space() {
    // Keys 0 and 4 held together from 10 ms to 200 ms.
    let (mut device, probes) = build_device(vec![(window(10, 200), 0b0001_0001)], vec![], vec![]);
    device.set_mode(Mode::FreePlay);

    for _ in 0..80 {
        device.step();
    }

    assert_eq!(*probes.led_writes.borrow(), vec![0b0001_0001, 0]);
    assert_eq!(
        *probes.tone_events.borrow(),
        vec![ToneEvent::Start(320), ToneEvent::Stop]
    );
}

#[test]
fn test_free_play_exits_on_ok_press() {
    let (mut device, _probes) = build_device(
        vec![],
        vec![(NavButton::Ok, window(30, 80))],
        vec![],
    );
    device.set_mode(Mode::FreePlay);

    assert!(step_until(&mut device, &Mode::Menu, 50));
}

#[test]
fn test_menu_commits_free_play_on_short_press() {
    let (mut device, _probes) = build_device(
        vec![],
        vec![(NavButton::Ok, window(10, 100))],
        vec![],
    );

    assert!(step_until(&mut device, &Mode::FreePlay, 50));
}

#[test]
fn test_menu_absorbs_six_second_hold() {
    // OK held for 6000 ms, past the 5000 ms long-press floor.
    let (mut device, probes) = build_device(
        vec![],
        vec![(NavButton::Ok, window(0, 6000))],
        vec![],
    );

    device.step();
    assert_eq!(device.mode(), &Mode::Menu);

    let drawn_before = probes.lines.borrow().len();
    device.step();
    assert_eq!(device.mode(), &Mode::Menu);
    assert!(probes.lines.borrow().len() > drawn_before, "menu redraws");
}

#[test]
fn test_menu_toggle_reaches_song_mode() {
    // Short NEXT toggles the highlight, short OK then commits Song Mode.
    // With no scripts on storage, Song-Select reports and falls back to
    // the menu on its own.
    let (mut device, probes) = build_device(
        vec![],
        vec![
            (NavButton::Next, window(10, 60)),
            (NavButton::Ok, window(200, 260)),
        ],
        vec![],
    );

    for _ in 0..80 {
        device.step();
    }

    assert_eq!(device.mode(), &Mode::Menu);
    assert!(probes.printed("No songs"));
}

#[test]
fn test_song_select_with_no_scripts_returns_to_menu() {
    let (mut device, probes) = build_device(vec![], vec![], vec![]);

    device.set_mode(Mode::SongSelect);

    assert_eq!(device.mode(), &Mode::Menu);
    assert!(probes.printed("No songs"));
}

#[test]
fn test_song_select_cycles_with_wraparound() {
    let (mut device, probes) = build_device(
        vec![],
        vec![
            (NavButton::Next, window(10, 60)),
            (NavButton::Next, window(300, 350)),
        ],
        vec![("ODE.TXT", "0 100\n"), ("SCALE.TXT", "1 100\n")],
    );

    device.set_mode(Mode::SongSelect);
    for _ in 0..120 {
        device.step();
    }

    assert_eq!(device.mode(), &Mode::SongSelect);
    assert!(probes.printed("Song 2/2"));
    // Second press wraps back to the first entry.
    let lines = probes.lines.borrow();
    let last_header = lines
        .iter()
        .rev()
        .find(|line| line.starts_with("Song "))
        .cloned();
    assert_eq!(last_header.as_deref(), Some("Song 1/2"));
}

#[test]
fn test_song_select_back_key_cancels() {
    let (mut device, _probes) = build_device(
        vec![(window(0, 10_000), 0b0000_0001)],
        vec![],
        vec![("ODE.TXT", "0 100\n")],
    );

    device.set_mode(Mode::SongSelect);
    device.step();

    assert_eq!(device.mode(), &Mode::Menu);
}

#[test]
fn test_song_play_open_failure_returns_to_select() {
    let (mut device, probes) = build_device(vec![], vec![], vec![("ODE.TXT", "0 100\n")]);

    device.set_mode(Mode::SongPlay(SongName::truncated("MISSING.TXT")));
    device.step();

    assert_eq!(device.mode(), &Mode::SongSelect);
    assert!(probes.printed("Can't open"));
    assert!(probes.beeps().is_empty());
}

#[test]
fn test_song_play_miss_fails_with_one_chime() {
    // The script requires key 0; nothing is ever pressed.
    let (mut device, probes) = build_device(vec![], vec![], vec![("ODE.TXT", "0 100\n")]);

    device.set_mode(Mode::SongPlay(SongName::truncated("ODE.TXT")));
    device.step();

    assert_eq!(device.mode(), &Mode::SongSelect);
    assert_eq!(probes.beeps().len(), 1, "failure tone exactly once");
    assert!(probes.printed("Try again!"));
    // The target mask was latched, then blanked at window end.
    assert_eq!(*probes.led_writes.borrow(), vec![0b0000_0001, 0]);
}

#[test]
fn test_song_play_success_returns_to_menu() {
    // Both steps are held correctly for the whole run.
    let script = "0 100\n# bridge\n\n4 80\n";
    let (mut device, probes) = build_device(
        vec![(window(0, 100_000), 0b0001_0001)],
        vec![],
        vec![("DUET.TXT", script)],
    );

    device.set_mode(Mode::SongPlay(SongName::truncated("DUET.TXT")));
    device.step();

    assert_eq!(device.mode(), &Mode::Menu);
    assert_eq!(probes.beeps().len(), 1, "success tone exactly once");
    assert!(probes.printed("Well done!"));

    // Live feedback sounded only the intersection of each step.
    let events = probes.tone_events.borrow();
    let starts: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            ToneEvent::Start(freq) => Some(*freq),
            _ => None,
        })
        .collect();
    assert_eq!(starts, vec![262, 392]);
}

#[test]
fn test_song_of_rests_is_silent_success() {
    let (mut device, probes) = build_device(vec![], vec![], vec![("REST.TXT", "9 300\n\n8 100\n")]);

    device.set_mode(Mode::SongPlay(SongName::truncated("REST.TXT")));
    device.step();

    assert_eq!(device.mode(), &Mode::Menu);
    assert_eq!(probes.beeps().len(), 1);
    assert!(probes.led_writes.borrow().is_empty());
}

#[test]
fn test_boot_reports_missing_storage_once() {
    let (mut device, probes) = build_device_with_storage(vec![], vec![], vec![], false);

    device.boot();

    assert_eq!(device.mode(), &Mode::Menu);
    assert_eq!(
        probes
            .lines
            .borrow()
            .iter()
            .filter(|line| line.contains("No storage"))
            .count(),
        1
    );
}
