//! Song playback: stream the script, cue each step, judge the response.
//!
//! The playback contract is all-or-nothing: one missed step aborts the
//! whole song and returns to selection. There are no per-step retries.

use crate::device::{
    Device, FAIL_CHIME_HZ, FAIL_CHIME_MS, Mode, SUCCESS_CHIME_HZ, SUCCESS_CHIME_MS,
};
use crate::hal::{Clock, KeyInput, LedBus, ScriptStore, TextDisplay, ToneGen};
use crate::input::KeyMask;
use crate::pitch::blended_frequency;
use crate::script::{ScriptStep, ScriptStream, SongName};

impl<K, D, L, T, S, C> Device<K, D, L, T, S, C>
where
    K: KeyInput,
    D: TextDisplay,
    L: LedBus,
    T: ToneGen,
    S: ScriptStore,
    C: Clock,
{
    pub(crate) fn enter_song_play(&mut self, name: &SongName) -> Option<Mode> {
        self.display.clear();
        self.display.set_cursor(0, 0);
        self.display.print("Playing");
        self.display.set_cursor(0, 1);
        self.display.print(name.as_str());
        None
    }

    /// Play the whole script. One cycle of this mode is one complete song:
    /// the script is finite, so the cycle is bounded.
    pub(crate) fn song_play_cycle(&mut self, name: &SongName) -> Mode {
        let reader = match self.store.open(name) {
            Ok(reader) => reader,
            Err(_) => {
                self.message("Can't open", name.as_str());
                return Mode::SongSelect;
            }
        };

        for item in ScriptStream::new(reader) {
            let step = match item {
                Ok(step) => step,
                Err(_) => {
                    self.message("Read error", name.as_str());
                    return Mode::SongSelect;
                }
            };

            if step.is_rest() {
                self.clock.sleep_ms(u64::from(step.duration_ms));
                continue;
            }

            if !self.perform_step(&step) {
                self.tone.beep(FAIL_CHIME_HZ, FAIL_CHIME_MS);
                self.message("Try again!", name.as_str());
                return Mode::SongSelect;
            }
        }

        self.tone.beep(SUCCESS_CHIME_HZ, SUCCESS_CHIME_MS);
        self.message("Well done!", name.as_str());
        Mode::Menu
    }

    /// Cue one step and judge the player's response.
    ///
    /// Returns false when the required mask was not fully held at the end
    /// of the response window.
    fn perform_step(&mut self, step: &ScriptStep) -> bool {
        // The target lights up immediately and stays lit for the whole step.
        self.out.set_leds(&mut self.leds, step.mask);
        self.draw_step_keys(step.mask);

        // Cosmetic countdown over the step's nominal duration.
        let segments = self.config.cue_segments.max(1);
        let seg_ms = u64::from((step.duration_ms / segments).max(1));
        for remaining in (1..=segments).rev() {
            self.draw_countdown(remaining, segments);
            self.clock.sleep_ms(seg_ms);
        }

        // Response window: live audio feedback for every partially correct
        // press, judged only against the final sample at timeout.
        let window_ms =
            u64::from(step.duration_ms) * u64::from(self.config.response_window_factor);
        let deadline = self.clock.now_ms().saturating_add(window_ms);
        let mut live = KeyMask::EMPTY;
        while self.clock.now_ms() < deadline {
            live = self.keys.sample_keys();
            let hit = live.intersection(step.mask);
            self.out.set_tone(&mut self.tone, blended_frequency(hit));
            self.clock.sleep_ms(self.config.scan_interval_ms);
        }

        self.out.set_tone(&mut self.tone, 0);
        self.out.set_leds(&mut self.leds, KeyMask::EMPTY);

        live.contains_all(step.mask)
    }

    fn draw_step_keys(&mut self, mask: KeyMask) {
        let mut line = String::from("Play:");
        for key in mask.keys() {
            line.push(' ');
            // Keys are labeled 1..8 on the case.
            line.push(char::from(b'1' + key));
        }
        self.display.clear();
        self.display.set_cursor(0, 0);
        self.display.print(&line);
    }

    fn draw_countdown(&mut self, remaining: u32, total: u32) {
        let mut bar = String::with_capacity(total as usize);
        for slot in 0..total {
            bar.push(if slot < remaining { '=' } else { ' ' });
        }
        self.display.set_cursor(0, 1);
        self.display.print(&bar);
    }
}
