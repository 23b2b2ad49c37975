//! Main menu: a two-item toggle between Free Play and Song Mode.

use crate::device::{Device, MenuItem, Mode};
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
    pub(crate) fn enter_menu(&mut self) -> Option<Mode> {
        self.draw_menu();
        self.needs_redraw = false;
        None
    }

    pub(crate) fn menu_cycle(&mut self) -> Mode {
        if self.needs_redraw {
            self.draw_menu();
            self.needs_redraw = false;
        }

        if let Some(PressKind::Short) = self.classify(NavButton::Next) {
            self.menu_cursor = self.menu_cursor.toggled();
            self.needs_redraw = true;
        }

        match self.classify(NavButton::Ok) {
            Some(PressKind::Short) => {
                return match self.menu_cursor {
                    MenuItem::FreePlay => Mode::FreePlay,
                    MenuItem::SongMode => Mode::SongSelect,
                };
            }
            // Long and middle-band holds are absorbed with a redraw: a
            // stuck OK button must not keep committing mode entries.
            Some(_) => self.needs_redraw = true,
            None => {}
        }

        self.clock.sleep_ms(self.config.scan_interval_ms);
        Mode::Menu
    }

    fn draw_menu(&mut self) {
        let marker = |item| if self.menu_cursor == item { '>' } else { ' ' };
        let top = format!("{} Free Play", marker(MenuItem::FreePlay));
        let bottom = format!("{} Song Mode", marker(MenuItem::SongMode));
        self.display.clear();
        self.display.set_cursor(0, 0);
        self.display.print(&top);
        self.display.set_cursor(0, 1);
        self.display.print(&bottom);
    }
}
