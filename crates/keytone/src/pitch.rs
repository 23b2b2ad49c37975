//! Frequency/pitch conversion utilities.
//!
//! This module provides the bidirectional mapping between linear frequency
//! in Hertz and the logarithmic pitch (semitone) scale, and the chord
//! blending helper built on top of it. Blending simultaneously pressed keys
//! happens in pitch space rather than frequency space: the arithmetic mean
//! of raw Hz values is biased toward the higher note, while the mean of
//! pitches lands on the perceptual midpoint of the chord.
//!
//! # Examples
//!
//! ```
//! use keytone::pitch::{frequency_to_pitch, pitch_to_frequency};
//!
//! let pitch = frequency_to_pitch(440.0);
//! assert!((pitch - 69.0).abs() < 1e-9);
//! assert!((pitch_to_frequency(pitch) - 440.0).abs() < 1e-9);
//! ```

use crate::input::{KEY_FREQS_HZ, KeyMask};

/// Reference A4 frequency (440 Hz).
const A4_HZ: f64 = 440.0;

/// Pitch value assigned to A4 on the semitone scale.
const A4_PITCH: f64 = 69.0;

/// Semitones per octave (12-EDO).
const SEMITONES_PER_OCTAVE: f64 = 12.0;

/// Convert a frequency in Hz to its pitch (semitone) value.
///
/// Computes `12 * log2(f / 440) + 69`. Only defined for positive, finite
/// frequencies; anything else yields a non-finite result that callers must
/// not feed back into [`pitch_to_frequency`].
pub fn frequency_to_pitch(freq_hz: f64) -> f64 {
    SEMITONES_PER_OCTAVE * (freq_hz / A4_HZ).log2() + A4_PITCH
}

/// Convert a pitch (semitone) value back to a frequency in Hz.
///
/// Computes `440 * 2^((p - 69) / 12)`. Total inverse of
/// [`frequency_to_pitch`] on the positive frequency domain.
pub fn pitch_to_frequency(pitch: f64) -> f64 {
    A4_HZ * 2.0_f64.powf((pitch - A4_PITCH) / SEMITONES_PER_OCTAVE)
}

/// Blend all pressed keys of `mask` into a single output frequency.
///
/// Returns 0 (the silence sentinel) for the empty mask. Otherwise each
/// pressed key's fixed base frequency is converted to pitch, the pitches are
/// arithmetically averaged, and the mean is converted back and rounded to
/// the nearest integer Hz.
///
/// # Examples
///
/// ```
/// use keytone::input::KeyMask;
/// use keytone::pitch::blended_frequency;
///
/// assert_eq!(blended_frequency(KeyMask::EMPTY), 0);
/// // A single key sounds at exactly its base frequency.
/// assert_eq!(blended_frequency(KeyMask::from_bits(0b0010_0000)), 440);
/// ```
pub fn blended_frequency(mask: KeyMask) -> u32 {
    let mut pitch_sum = 0.0_f64;
    let mut count = 0_u32;

    for key in mask.keys() {
        pitch_sum += frequency_to_pitch(f64::from(KEY_FREQS_HZ[key as usize]));
        count += 1;
    }

    if count == 0 {
        return 0;
    }

    let mean = pitch_sum / f64::from(count);
    (pitch_to_frequency(mean) + 0.5) as u32
}
