//! Edge-triggered LED and tone actuation.
//!
//! Both output peripherals are written only when the computed value differs
//! from the last emitted one. For the shift register this saves a pointless
//! serialize-and-latch sequence every 5 ms; for the tone generator it is
//! audible correctness: restarting the generator resets its phase, and
//! doing that every cycle turns a held chord into a clicking mess.
//!
//! [`OutputState`] owns the two "last emitted" values. It belongs to
//! whichever mode is active, and [`OutputState::quiesce`] is the handoff
//! every mode transition performs so no stale light or tone leaks into the
//! next mode.

use crate::hal::{LedBus, ToneGen};
use crate::input::KeyMask;

/// Wiring order of the LED bar relative to the logical mask.
///
/// One board revision routes the shift-register outputs across mirrored
/// traces, so logical bit *i* must be transmitted as bit *7−i*. Which
/// revision is in play is configuration, not code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedBitOrder {
    /// Logical bit *i* drives output bit *i*.
    #[default]
    Direct,
    /// Logical bit *i* drives output bit *7−i*.
    Reversed,
}

/// Last-emitted output values plus the LED wiring configuration.
#[derive(Debug, Clone)]
pub struct OutputState {
    bit_order: LedBitOrder,
    last_leds: u8,
    last_freq_hz: u32,
}

impl OutputState {
    /// Create the actuator in the neutral state (LEDs blank, tone off).
    ///
    /// The peripherals themselves power up blank and silent, so the neutral
    /// starting point needs no initial write.
    pub fn new(bit_order: LedBitOrder) -> Self {
        OutputState {
            bit_order,
            last_leds: 0,
            last_freq_hz: 0,
        }
    }

    /// Drive the LED bar to show `mask`, suppressing redundant writes.
    pub fn set_leds<L: LedBus>(&mut self, bus: &mut L, mask: KeyMask) {
        let bits = mask.bits();
        if bits == self.last_leds {
            return;
        }
        let wire = match self.bit_order {
            LedBitOrder::Direct => bits,
            LedBitOrder::Reversed => bits.reverse_bits(),
        };
        bus.write(wire);
        self.last_leds = bits;
    }

    /// Drive the buzzer to `freq_hz`, suppressing redundant writes.
    ///
    /// A frequency of 0 is the silence sentinel and stops the generator.
    pub fn set_tone<T: ToneGen>(&mut self, tone: &mut T, freq_hz: u32) {
        if freq_hz == self.last_freq_hz {
            return;
        }
        if freq_hz == 0 {
            tone.stop();
        } else {
            tone.start(freq_hz);
        }
        self.last_freq_hz = freq_hz;
    }

    /// Return both outputs to the neutral state (blank, silent).
    ///
    /// Every mode transition must call this before the successor runs.
    pub fn quiesce<L: LedBus, T: ToneGen>(&mut self, bus: &mut L, tone: &mut T) {
        self.set_leds(bus, KeyMask::EMPTY);
        self.set_tone(tone, 0);
    }
}
