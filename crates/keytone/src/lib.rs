//! keytone: mode state machine and tone-synthesis core for an 8-key
//! musical toy.
//!
//! The device is an 8-key keyboard that drives a piezo buzzer, an LED bar
//! behind a shift register, a small character display, and an optional
//! song-playback mode that streams note scripts from removable storage.
//! This crate is the portable core of that firmware: the mode state machine
//! (Menu / Free Play / Song Select / Song Play), the per-cycle key sampling
//! and pitch-blended tone synthesis, the edge-triggered output actuation,
//! and the streaming song-script interpreter. Everything hardware-specific
//! stays behind the collaborator traits in [`hal`], so the same core runs
//! on the board, in a host simulator, or under test against scripted fakes.
//!
//! Key properties:
//! - Single-threaded and cooperative: [`Device::step`] runs one bounded
//!   cycle of the active mode; there is no preemption and no interrupt
//!   handling in the core.
//! - Chords are blended in pitch (semitone) space, not frequency space, so
//!   simultaneous keys sound at their perceptual midpoint.
//! - Peripheral writes are edge-triggered: the LED latch and the tone
//!   generator are only touched when the computed value changes.
//! - Song scripts are parsed lazily, one line at a time; a song is never
//!   materialized in memory.
//!
//! # Examples
//!
//! Blending a chord the way the free-play loop does:
//!
//! ```rust
//! use keytone::input::KeyMask;
//! use keytone::pitch::blended_frequency;
//!
//! // Keys 0 and 4 (262 Hz and 392 Hz) blend to their pitch-space midpoint,
//! // not the arithmetic mean of the frequencies.
//! let chord = KeyMask::EMPTY.with_key(0).with_key(4);
//! assert_eq!(blended_frequency(chord), 320);
//! ```
//!
//! Streaming a song script:
//!
//! ```rust
//! use std::io::Cursor;
//! use keytone::script::ScriptStream;
//!
//! let script = "# demo\n0 400\n0,4 400\n";
//! let steps: Vec<_> = ScriptStream::new(Cursor::new(script))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(steps.len(), 2);
//! assert_eq!(steps[1].duration_ms, 400);
//! ```

pub mod device;
pub mod hal;
pub mod input;
mod mode;
pub mod output;
pub mod pitch;
pub mod script;

pub use device::{Device, DeviceConfig, MenuItem, Mode};
pub use hal::{Clock, KeyInput, LedBus, NavButton, ScriptStore, StorageError, TextDisplay, ToneGen};
pub use input::{KEY_COUNT, KEY_FREQS_HZ, KeyMask, PressKind, PressTiming};
pub use output::{LedBitOrder, OutputState};
pub use script::{ScriptLine, ScriptStep, ScriptStream, SongName};
