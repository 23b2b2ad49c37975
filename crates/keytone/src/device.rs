//! Device context and top-level mode dispatch.
//!
//! [`Device`] is the explicit context the whole state machine threads
//! through: the six peripheral collaborators, the configuration, the
//! edge-triggered output state and the per-mode cursors all live here, so
//! there is no global mutable state and no hidden coupling between mode
//! handlers. [`Device::step`] runs one bounded cooperative cycle of the
//! active mode and performs at most one transition; [`Device::run`] is the
//! firmware entry loop.

use crate::hal::{Clock, KeyInput, LedBus, ScriptStore, TextDisplay, ToneGen};
use crate::input::PressTiming;
use crate::output::{LedBitOrder, OutputState};
use crate::script::SongName;

/// One-shot chime frequency played when a song is completed.
pub(crate) const SUCCESS_CHIME_HZ: u32 = 1047;

/// One-shot chime duration for a completed song.
pub(crate) const SUCCESS_CHIME_MS: u32 = 400;

/// One-shot chime frequency played when a song is failed.
pub(crate) const FAIL_CHIME_HZ: u32 = 196;

/// One-shot chime duration for a failed song.
pub(crate) const FAIL_CHIME_MS: u32 = 700;

/// Tunable behavior of the device.
///
/// Everything observed to vary across board revisions or firmware variants
/// is collected here rather than hardcoded: press thresholds, the response
/// window factor, the LED wiring order, the back-key assignment and the
/// song list capacity.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Navigation-button classification thresholds.
    pub press: PressTiming,
    /// Delay between key-sampling cycles in the audio paths.
    pub scan_interval_ms: u64,
    /// Response window length as a multiple of each step's duration.
    pub response_window_factor: u32,
    /// Number of segments in the cosmetic cue countdown bar.
    pub cue_segments: u32,
    /// Wiring order of the LED bar.
    pub led_bit_order: LedBitOrder,
    /// Key that cancels out of song selection, if the revision has one.
    pub back_key: Option<u8>,
    /// Capacity of the song list rebuilt on each Song-Select entry.
    pub max_song_entries: usize,
    /// How long status messages stay on the display.
    pub message_hold_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            press: PressTiming::default(),
            scan_interval_ms: 5,
            response_window_factor: 2,
            cue_segments: 8,
            led_bit_order: LedBitOrder::Direct,
            back_key: Some(0),
            max_song_entries: 16,
            message_hold_ms: 1200,
        }
    }
}

/// The two entries of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    /// Live keyboard mode.
    FreePlay,
    /// Song selection and playback.
    SongMode,
}

impl MenuItem {
    /// The other menu entry.
    pub fn toggled(self) -> Self {
        match self {
            MenuItem::FreePlay => MenuItem::SongMode,
            MenuItem::SongMode => MenuItem::FreePlay,
        }
    }
}

/// The device's operating mode. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Two-item mode menu.
    Menu,
    /// Live keyboard: keys light LEDs and sound the blended tone.
    FreePlay,
    /// Scrolling through the scripts found on storage.
    SongSelect,
    /// Playing (and judging) the named script.
    SongPlay(SongName),
}

/// The complete device: collaborators, configuration and mode state.
pub struct Device<K, D, L, T, S, C> {
    pub(crate) keys: K,
    pub(crate) display: D,
    pub(crate) leds: L,
    pub(crate) tone: T,
    pub(crate) store: S,
    pub(crate) clock: C,
    pub(crate) config: DeviceConfig,
    pub(crate) out: OutputState,
    mode: Mode,
    pub(crate) menu_cursor: MenuItem,
    pub(crate) songs: Vec<SongName>,
    pub(crate) song_cursor: usize,
    pub(crate) needs_redraw: bool,
}

impl<K, D, L, T, S, C> Device<K, D, L, T, S, C>
where
    K: KeyInput,
    D: TextDisplay,
    L: LedBus,
    T: ToneGen,
    S: ScriptStore,
    C: Clock,
{
    /// Assemble a device from its collaborators.
    ///
    /// The device starts in [`Mode::Menu`] with both outputs neutral.
    pub fn new(keys: K, display: D, leds: L, tone: T, store: S, clock: C, config: DeviceConfig) -> Self {
        let out = OutputState::new(config.led_bit_order);
        Device {
            keys,
            display,
            leds,
            tone,
            store,
            clock,
            config,
            out,
            mode: Mode::Menu,
            menu_cursor: MenuItem::FreePlay,
            songs: Vec::new(),
            song_cursor: 0,
            needs_redraw: true,
        }
    }

    /// The currently active mode.
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// One-time startup reporting before the main loop.
    ///
    /// A storage medium that failed to initialize is reported here exactly
    /// once; the device then proceeds in degraded operation (song mode will
    /// simply find no scripts).
    pub fn boot(&mut self) {
        if !self.store.available() {
            self.message("No storage", "Song mode off");
        }
        self.transition(Mode::Menu);
    }

    /// Run the device forever: boot, then step the active mode.
    pub fn run(&mut self) {
        self.boot();
        loop {
            self.step();
        }
    }

    /// Run one cooperative cycle of the active mode.
    ///
    /// Menu, Free-Play and Song-Select cycles are single poll iterations;
    /// a Song-Play cycle plays the whole script, its natural bounded unit.
    /// Performs the mode transition, including the neutral output handoff,
    /// when the cycle requests one.
    pub fn step(&mut self) {
        let next = match self.mode.clone() {
            Mode::Menu => self.menu_cycle(),
            Mode::FreePlay => self.free_play_cycle(),
            Mode::SongSelect => self.song_select_cycle(),
            Mode::SongPlay(name) => self.song_play_cycle(&name),
        };
        if next != self.mode {
            self.transition(next);
        }
    }

    /// Force a transition to `mode`, as if the active handler requested it.
    ///
    /// Frontends use this to drop the device straight into a mode (for
    /// example, host tooling that plays one script without navigating the
    /// menu). The same neutral-output handoff applies.
    pub fn set_mode(&mut self, mode: Mode) {
        self.transition(mode);
    }

    /// Perform a transition: quiesce outputs, enter the target mode, and
    /// follow any cascaded transition the entry work produces (for example
    /// an empty Song-Select falling straight back to the menu).
    fn transition(&mut self, target: Mode) {
        let mut next = target;
        loop {
            self.out.quiesce(&mut self.leds, &mut self.tone);
            self.mode = next;
            match self.enter_current() {
                Some(further) => next = further,
                None => break,
            }
        }
    }

    /// Mode-entry work for the freshly assigned mode. Returns a cascaded
    /// transition target when entry cannot complete (no songs, open failure).
    fn enter_current(&mut self) -> Option<Mode> {
        match self.mode.clone() {
            Mode::Menu => self.enter_menu(),
            Mode::FreePlay => self.enter_free_play(),
            Mode::SongSelect => self.enter_song_select(),
            Mode::SongPlay(name) => self.enter_song_play(&name),
        }
    }

    /// Classify a press of `button` against the configured thresholds.
    pub(crate) fn classify(&mut self, button: crate::hal::NavButton) -> Option<crate::input::PressKind> {
        crate::input::classify_press(&mut self.keys, &mut self.clock, button, &self.config.press)
    }

    /// Show a two-line status message for the configured hold time.
    pub(crate) fn message(&mut self, top: &str, bottom: &str) {
        self.display.clear();
        self.display.set_cursor(0, 0);
        self.display.print(top);
        self.display.set_cursor(0, 1);
        self.display.print(bottom);
        self.clock.sleep_ms(self.config.message_hold_ms);
    }
}
