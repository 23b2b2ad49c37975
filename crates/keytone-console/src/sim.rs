//! Host-backed implementations of the board collaborators.
//!
//! These let the real device core run on a development machine: scripts
//! come from a filesystem directory, the LCD and the output peripherals
//! are logged, time is either the wall clock or a virtual counter, and an
//! auto-player "presses" whatever the LED latch currently shows.

use std::cell::Cell;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use keytone::hal::{
    Clock, KeyInput, LedBus, NavButton, ScriptStore, StorageError, TextDisplay, ToneGen,
};
use keytone::input::KeyMask;
use keytone::script::{SCRIPT_EXT, SongName};

/// Columns of the simulated character display.
const DISPLAY_COLS: usize = 16;

/// Rows of the simulated character display.
const DISPLAY_ROWS: usize = 2;

/// Wall-clock or virtual time source.
///
/// The virtual variant advances only when the core sleeps, which makes a
/// whole song play out instantly while keeping every measured duration
/// exactly what the board would see.
pub enum SimClock {
    Wall { origin: Instant },
    Virtual { now_ms: u64 },
}

impl SimClock {
    pub fn wall() -> Self {
        SimClock::Wall {
            origin: Instant::now(),
        }
    }

    pub fn virtual_start() -> Self {
        SimClock::Virtual { now_ms: 0 }
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        match self {
            SimClock::Wall { origin } => origin.elapsed().as_millis() as u64,
            SimClock::Virtual { now_ms } => *now_ms,
        }
    }

    fn sleep_ms(&mut self, ms: u64) {
        match self {
            SimClock::Wall { .. } => std::thread::sleep(Duration::from_millis(ms)),
            SimClock::Virtual { now_ms } => *now_ms += ms,
        }
    }
}

/// A 16x2 character display rendered into the log.
pub struct ConsoleDisplay {
    rows: [[char; DISPLAY_COLS]; DISPLAY_ROWS],
    cursor: (usize, usize),
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        ConsoleDisplay {
            rows: [[' '; DISPLAY_COLS]; DISPLAY_ROWS],
            cursor: (0, 0),
        }
    }

    fn log_frame(&self) {
        for row in &self.rows {
            let text: String = row.iter().collect();
            log::debug!(target: "lcd", "[{}]", text);
        }
    }
}

impl Default for ConsoleDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TextDisplay for ConsoleDisplay {
    fn clear(&mut self) {
        self.rows = [[' '; DISPLAY_COLS]; DISPLAY_ROWS];
        self.cursor = (0, 0);
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.cursor = (
            (col as usize).min(DISPLAY_COLS - 1),
            (row as usize).min(DISPLAY_ROWS - 1),
        );
    }

    fn print(&mut self, text: &str) {
        let (mut col, row) = self.cursor;
        for ch in text.chars() {
            if col >= DISPLAY_COLS {
                break;
            }
            self.rows[row][col] = ch;
            col += 1;
        }
        self.cursor = (col.min(DISPLAY_COLS - 1), row);
        self.log_frame();
    }
}

/// LED latch that keeps a shadow copy for the auto-player to read.
pub struct LedSink {
    shadow: Rc<Cell<u8>>,
}

impl LedSink {
    pub fn new(shadow: Rc<Cell<u8>>) -> Self {
        LedSink { shadow }
    }
}

impl LedBus for LedSink {
    fn write(&mut self, bits: u8) {
        self.shadow.set(bits);
        log::debug!(target: "led", "latch {:08b}", bits);
    }
}

/// Tone generator that logs instead of sounding.
pub struct ToneSink;

impl ToneGen for ToneSink {
    fn start(&mut self, freq_hz: u32) {
        log::debug!(target: "tone", "start {} Hz", freq_hz);
    }

    fn stop(&mut self) {
        log::debug!(target: "tone", "stop");
    }

    fn beep(&mut self, freq_hz: u32, duration_ms: u32) {
        log::info!(target: "tone", "chime {} Hz for {} ms", freq_hz, duration_ms);
    }
}

/// Script storage over a filesystem directory.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: &Path) -> Self {
        DirStore {
            root: root.to_path_buf(),
        }
    }
}

impl ScriptStore for DirStore {
    type Script = BufReader<File>;

    fn available(&mut self) -> bool {
        self.root.is_dir()
    }

    fn list_scripts(&mut self, limit: usize) -> Result<Vec<SongName>, StorageError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            let is_script = path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(SCRIPT_EXT));
            if is_script && let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(SongName::truncated(file_name));
            }
        }
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        names.truncate(limit);
        Ok(names)
    }

    fn open(&mut self, name: &SongName) -> Result<Self::Script, StorageError> {
        let path = self.root.join(name.as_str());
        match File::open(&path) {
            Ok(file) => Ok(BufReader::new(file)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.as_str().to_string()))
            }
            Err(err) => Err(StorageError::from(err)),
        }
    }
}

/// Auto-player that presses exactly what the LED bar shows.
///
/// Song playback lights the required keys before the response window, so a
/// player that follows the lights plays every song perfectly. `miss_at`
/// makes it sit out one step (1-based count of lit steps) to exercise the
/// failure path.
pub struct LightChaser {
    shadow: Rc<Cell<u8>>,
    last_seen: u8,
    lit_steps: usize,
    miss_at: Option<usize>,
}

impl LightChaser {
    pub fn new(shadow: Rc<Cell<u8>>, miss_at: Option<usize>) -> Self {
        LightChaser {
            shadow,
            last_seen: 0,
            lit_steps: 0,
            miss_at,
        }
    }
}

impl KeyInput for LightChaser {
    fn sample_keys(&mut self) -> KeyMask {
        let bits = self.shadow.get();
        if bits == 0 {
            self.last_seen = 0;
            return KeyMask::EMPTY;
        }
        if bits != self.last_seen {
            self.lit_steps += 1;
            self.last_seen = bits;
        }
        if Some(self.lit_steps) == self.miss_at {
            KeyMask::EMPTY
        } else {
            KeyMask::from_bits(bits)
        }
    }

    fn nav_pressed(&mut self, _button: NavButton) -> bool {
        false
    }
}
