//! Key matrix sampling and navigation-button press classification.
//!
//! The eight playing keys are sampled as a whole into a [`KeyMask`] once per
//! cycle and never debounced: at the ~5 ms sampling cadence a bouncing
//! contact merely retriggers the same edge-suppressed output. The two
//! navigation buttons are different: menu actions must distinguish a tap
//! from a deliberate hold, so [`classify_press`] measures the hold time
//! against configurable thresholds.

use crate::hal::{Clock, KeyInput, NavButton};

/// Number of playing keys on the board.
pub const KEY_COUNT: usize = 8;

/// Base frequency of each key in Hz, C major scale from middle C.
pub const KEY_FREQS_HZ: [u16; KEY_COUNT] = [262, 294, 330, 349, 392, 440, 494, 523];

/// Set of currently pressed keys, bit *i* set iff key *i* is down.
///
/// A mask is an instantaneous sample: it always reflects the most recent
/// poll and is never carried across cycles except as the "last emitted"
/// copy kept by the output actuator for edge detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyMask(u8);

impl KeyMask {
    /// The mask with no keys pressed.
    pub const EMPTY: KeyMask = KeyMask(0);

    /// Build a mask from a raw bit pattern.
    pub const fn from_bits(bits: u8) -> Self {
        KeyMask(bits)
    }

    /// Raw bit pattern of the mask.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True when no key is pressed.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when key `key` is pressed. Out-of-range keys read as released.
    pub const fn pressed(self, key: u8) -> bool {
        (key as usize) < KEY_COUNT && self.0 & (1 << key) != 0
    }

    /// Return this mask with key `key` added. Out-of-range keys are dropped.
    pub const fn with_key(self, key: u8) -> Self {
        if (key as usize) < KEY_COUNT {
            KeyMask(self.0 | (1 << key))
        } else {
            self
        }
    }

    /// Keys pressed in both masks.
    pub const fn intersection(self, other: KeyMask) -> KeyMask {
        KeyMask(self.0 & other.0)
    }

    /// True when every key of `required` is also pressed in `self`.
    pub const fn contains_all(self, required: KeyMask) -> bool {
        self.0 & required.0 == required.0
    }

    /// Number of pressed keys.
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate the pressed key indices in ascending order.
    pub fn keys(self) -> impl Iterator<Item = u8> {
        (0..KEY_COUNT as u8).filter(move |key| self.pressed(*key))
    }
}

/// Navigation-button timing thresholds.
///
/// The short/long boundary differs between observed board revisions, so all
/// three values are configuration rather than constants. A hold that falls
/// between `short_press_max_ms` and `long_press_min_ms` classifies as
/// [`PressKind::Indeterminate`]; what to do with it is the caller's policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressTiming {
    /// Interval between polls of the button line while held.
    pub poll_interval_ms: u64,
    /// Holds strictly shorter than this are short presses.
    pub short_press_max_ms: u64,
    /// Holds at least this long are long presses.
    pub long_press_min_ms: u64,
}

impl Default for PressTiming {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5,
            short_press_max_ms: 300,
            long_press_min_ms: 5000,
        }
    }
}

/// Classification of a completed navigation-button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressKind {
    /// Released before the short-press ceiling.
    Short,
    /// Held past the long-press floor.
    Long,
    /// Released in the band between the two thresholds.
    Indeterminate,
}

/// Classify a press of `button`, or return `None` when it is not held.
///
/// When the line is asserted this polls it at `timing.poll_interval_ms`
/// until release, measuring the hold time with the supplied clock, then
/// classifies the hold against the configured thresholds. This is the one
/// deliberately waiting primitive in the core; it runs only in discrete
/// navigation contexts, never on the audio sampling path.
pub fn classify_press<K, C>(
    keys: &mut K,
    clock: &mut C,
    button: NavButton,
    timing: &PressTiming,
) -> Option<PressKind>
where
    K: KeyInput,
    C: Clock,
{
    if !keys.nav_pressed(button) {
        return None;
    }

    let pressed_at = clock.now_ms();
    while keys.nav_pressed(button) {
        clock.sleep_ms(timing.poll_interval_ms);
    }
    let held_ms = clock.now_ms().saturating_sub(pressed_at);

    Some(if held_ms < timing.short_press_max_ms {
        PressKind::Short
    } else if held_ms >= timing.long_press_min_ms {
        PressKind::Long
    } else {
        PressKind::Indeterminate
    })
}
