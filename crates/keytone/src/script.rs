//! Song script parsing and streaming.
//!
//! A song script is plain text, one instruction per line:
//!
//! ```text
//! # twinkle, first bar
//! 0 400
//! 0,4 400
//! 9 200
//! ```
//!
//! Each instruction is a comma-separated list of key indices, one space, and
//! a duration in milliseconds. Blank lines and `#` comments are skipped.
//! Parsing is deliberately tolerant: a line without the separator or with a
//! malformed duration is skipped, and out-of-range key indices are dropped
//! from the mask, so `9 200` above degrades to a 200 ms rest rather than an
//! error. [`ScriptStream`] applies these rules lazily over any line source,
//! so a whole song is never held in memory.

use std::fmt;
use std::io::BufRead;

use crate::hal::StorageError;
use crate::input::KeyMask;

/// Maximum stored length of a script filename, in bytes.
///
/// Matches the 8.3-style naming of the storage medium; anything longer is
/// truncated for both display and open-by-name purposes.
pub const MAX_NAME_LEN: usize = 12;

/// File extension that marks a file as a song script.
pub const SCRIPT_EXT: &str = "txt";

/// A script filename, bounded to [`MAX_NAME_LEN`] bytes.
///
/// Storage scans can return arbitrary names; this type truncates on
/// construction (on a character boundary) so the rest of the core never
/// handles an unbounded string from the medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongName {
    bytes: [u8; MAX_NAME_LEN],
    len: u8,
}

impl SongName {
    /// Build a name from `source`, truncating to [`MAX_NAME_LEN`] bytes on
    /// a character boundary.
    pub fn truncated(source: &str) -> Self {
        let mut bytes = [0u8; MAX_NAME_LEN];
        let mut len = 0usize;
        for ch in source.chars() {
            let ch_len = ch.len_utf8();
            if len + ch_len > MAX_NAME_LEN {
                break;
            }
            ch.encode_utf8(&mut bytes[len..]);
            len += ch_len;
        }
        SongName {
            bytes,
            len: len as u8,
        }
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        // Construction only copies whole characters, so the prefix is
        // always valid UTF-8.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("")
    }

    /// True for the zero-length name.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Display for SongName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed script instruction: the keys to play and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptStep {
    /// Keys required for this step. Empty means a rest.
    pub mask: KeyMask,
    /// Nominal duration in milliseconds.
    pub duration_ms: u32,
}

impl ScriptStep {
    /// True when this step is a timed silence.
    pub fn is_rest(&self) -> bool {
        self.mask.is_empty()
    }
}

/// Classification of one raw script line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLine {
    /// A playable instruction (possibly a rest).
    Step(ScriptStep),
    /// A `#` comment line.
    Comment,
    /// A blank line.
    Blank,
    /// A line that did not parse; playback skips it.
    Skipped,
}

/// Parse one raw line of script text.
///
/// Never fails: everything that is not a well-formed instruction comes back
/// as [`ScriptLine::Comment`], [`ScriptLine::Blank`] or
/// [`ScriptLine::Skipped`].
pub fn parse_line(line: &str) -> ScriptLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ScriptLine::Blank;
    }
    if trimmed.starts_with('#') {
        return ScriptLine::Comment;
    }

    let Some((keys, duration)) = trimmed.split_once(' ') else {
        return ScriptLine::Skipped;
    };
    let Ok(duration_ms) = duration.trim().parse::<u32>() else {
        return ScriptLine::Skipped;
    };

    let mut mask = KeyMask::EMPTY;
    for field in keys.split(',') {
        if let Ok(key) = field.trim().parse::<u8>() {
            // Out-of-range indices are dropped, not rejected; a line that
            // loses all its keys this way degrades to a rest.
            mask = mask.with_key(key);
        }
    }

    ScriptLine::Step(ScriptStep { mask, duration_ms })
}

/// Lazy instruction stream over a buffered line source.
///
/// Yields one [`ScriptStep`] per playable line, silently skipping comments,
/// blanks and malformed lines. I/O failures from the underlying reader
/// surface as `Err` items and end the stream.
pub struct ScriptStream<R: BufRead> {
    reader: R,
    line: String,
    line_no: usize,
}

impl<R: BufRead> ScriptStream<R> {
    /// Wrap `reader` in a streaming parser.
    pub fn new(reader: R) -> Self {
        ScriptStream {
            reader,
            line: String::new(),
            line_no: 0,
        }
    }

    /// Number of raw lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for ScriptStream<R> {
    type Item = Result<ScriptStep, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_no += 1;
                    if let ScriptLine::Step(step) = parse_line(&self.line) {
                        return Some(Ok(step));
                    }
                }
                Err(err) => return Some(Err(StorageError::from(err))),
            }
        }
    }
}
