//! Free play: live keyboard with blended tone output.

use crate::device::{Device, Mode};
use crate::hal::{Clock, KeyInput, LedBus, NavButton, ScriptStore, TextDisplay, ToneGen};
use crate::input::PressKind;
use crate::pitch::blended_frequency;

impl<K, D, L, T, S, C> Device<K, D, L, T, S, C>
where
    K: KeyInput,
    D: TextDisplay,
    L: LedBus,
    T: ToneGen,
    S: ScriptStore,
    C: Clock,
{
    pub(crate) fn enter_free_play(&mut self) -> Option<Mode> {
        self.display.clear();
        self.display.set_cursor(0, 0);
        self.display.print("Free Play");
        self.display.set_cursor(0, 1);
        self.display.print("OK = menu");
        None
    }

    /// One sampling cycle: keys to LEDs and blended tone, both
    /// edge-triggered, then an OK check for the way back to the menu.
    pub(crate) fn free_play_cycle(&mut self) -> Mode {
        let mask = self.keys.sample_keys();
        self.out.set_leds(&mut self.leds, mask);
        self.out.set_tone(&mut self.tone, blended_frequency(mask));

        match self.classify(NavButton::Ok) {
            Some(PressKind::Short) | Some(PressKind::Long) => return Mode::Menu,
            _ => {}
        }

        self.clock.sleep_ms(self.config.scan_interval_ms);
        Mode::FreePlay
    }
}
