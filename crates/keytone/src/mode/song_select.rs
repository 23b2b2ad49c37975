//! Song selection: a fresh directory scan, a wrapping cursor, and the
//! optional back-key cancel gesture.

use crate::device::{Device, Mode};
use crate::hal::{Clock, KeyInput, LedBus, NavButton, ScriptStore, TextDisplay, ToneGen};
use crate::input::PressKind;

impl<K, D, L, T, S, C> Device<K, D, L, T, S, C>
where
    K: KeyInput,
    D: TextDisplay,
    L: LedBus,
    T: ToneGen,
    S: ScriptStore,
    C: Clock,
{
    /// Scan storage on every entry. The previous list is discarded, never
    /// patched: removable media can change between visits.
    pub(crate) fn enter_song_select(&mut self) -> Option<Mode> {
        self.songs = self
            .store
            .list_scripts(self.config.max_song_entries)
            .unwrap_or_default();

        if self.songs.is_empty() {
            self.message("No songs", "Check storage");
            return Some(Mode::Menu);
        }

        self.song_cursor = 0;
        self.needs_redraw = true;
        None
    }

    pub(crate) fn song_select_cycle(&mut self) -> Mode {
        if self.songs.is_empty() {
            return Mode::Menu;
        }

        if self.needs_redraw {
            self.draw_song_select();
            self.needs_redraw = false;
        }

        if let Some(back) = self.config.back_key
            && self.keys.sample_keys().pressed(back)
        {
            return Mode::Menu;
        }

        if let Some(PressKind::Short) = self.classify(NavButton::Next) {
            self.song_cursor = (self.song_cursor + 1) % self.songs.len();
            self.needs_redraw = true;
        }

        match self.classify(NavButton::Ok) {
            Some(PressKind::Short) => {
                return Mode::SongPlay(self.songs[self.song_cursor]);
            }
            Some(_) => self.needs_redraw = true,
            None => {}
        }

        self.clock.sleep_ms(self.config.scan_interval_ms);
        Mode::SongSelect
    }

    fn draw_song_select(&mut self) {
        let header = format!("Song {}/{}", self.song_cursor + 1, self.songs.len());
        let name = self.songs[self.song_cursor];
        self.display.clear();
        self.display.set_cursor(0, 0);
        self.display.print(&header);
        self.display.set_cursor(0, 1);
        self.display.print(name.as_str());
    }
}
