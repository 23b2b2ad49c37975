//! Collaborator traits for the board peripherals.
//!
//! The core never touches hardware directly: every peripheral is reached
//! through one of the narrow traits below, so the same state machine runs
//! against real drivers on the board, a terminal-backed simulator on a host,
//! or scripted fakes in tests. Implementations own all electrical detail
//! (active-low key lines, latch sequencing, LCD addressing); the traits
//! speak only in logical values.

use std::fmt;
use std::io;

use crate::input::KeyMask;
use crate::script::SongName;

/// The two discrete navigation buttons next to the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavButton {
    /// Cycles the current selection.
    Next,
    /// Confirms the current selection.
    Ok,
}

/// Key matrix and navigation-button input lines.
pub trait KeyInput {
    /// Poll all eight key lines once and return the instantaneous mask.
    ///
    /// Must not block and must not debounce; the caller samples every cycle.
    fn sample_keys(&mut self) -> KeyMask;

    /// Instantaneous state of one navigation button (true = held down).
    fn nav_pressed(&mut self, button: NavButton) -> bool;
}

/// The LED bar behind the shift register.
pub trait LedBus {
    /// Serialize-and-latch one 8-bit word onto the LED outputs.
    ///
    /// Callers are expected to suppress redundant writes; implementations
    /// may treat every call as a full latch sequence.
    fn write(&mut self, bits: u8);
}

/// The single-voice tone generator driving the piezo buzzer.
pub trait ToneGen {
    /// Start (or retune) continuous output at `freq_hz`.
    fn start(&mut self, freq_hz: u32);

    /// Stop continuous output.
    fn stop(&mut self);

    /// Play a one-shot tone of `duration_ms`, used for status chimes.
    ///
    /// May return before the tone finishes; the caller sequences any
    /// required delay itself.
    fn beep(&mut self, freq_hz: u32, duration_ms: u32);
}

/// The character display, addressed as columns and rows of text.
pub trait TextDisplay {
    /// Blank the whole display and home the cursor.
    fn clear(&mut self);

    /// Move the cursor to `col`, `row`.
    fn set_cursor(&mut self, col: u8, row: u8);

    /// Print `text` at the cursor position.
    fn print(&mut self, text: &str);
}

/// Millisecond time source and delay primitive.
///
/// Keeping time behind a trait keeps the poll loops free of any
/// platform-specific blocking construct and lets tests drive a virtual
/// clock through the same code paths the board runs.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;

    /// Suspend execution for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u64);
}

/// Errors surfaced by the script storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The storage medium is absent or failed to initialize.
    Unavailable,
    /// No entry with the given name exists.
    NotFound(String),
    /// An underlying I/O operation failed; the message is the only
    /// information the medium gives us.
    Io(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "storage unavailable"),
            StorageError::NotFound(name) => write!(f, "no such script: {}", name),
            StorageError::Io(msg) => write!(f, "storage i/o error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

/// The removable-storage collaborator holding song scripts.
pub trait ScriptStore {
    /// Line source for one opened script.
    type Script: io::BufRead;

    /// True when the medium initialized and can be scanned.
    ///
    /// A device with absent storage still runs; song mode just finds
    /// nothing. The default assumes the medium is present.
    fn available(&mut self) -> bool {
        true
    }

    /// Scan the root directory for script files, returning at most `limit`
    /// entries. The result is a fresh snapshot; callers never hold it across
    /// re-entries into song selection.
    fn list_scripts(&mut self, limit: usize) -> Result<Vec<SongName>, StorageError>;

    /// Open the named script for streaming line reads.
    fn open(&mut self, name: &SongName) -> Result<Self::Script, StorageError>;
}
