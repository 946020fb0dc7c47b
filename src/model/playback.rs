//! Playback state machine and timing state
//!
//! `PlaybackMachine` is the single source of truth for playback: it tracks
//! the user's play *intent* separately from the *observed* state reported by
//! the audio backend, and every backend event is reconciled against it. The
//! machine is pure — methods return effect decisions (play, pause, reload,
//! advance) and the controller carries them out against the backend.

use std::time::Instant;

/// Effect decision returned by [`PlaybackMachine::toggle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleAction {
    /// Source is ready; command the backend to play.
    Play,
    /// Command the backend to pause.
    Pause,
    /// No usable source (idle / ended / errored); re-run the load pipeline.
    Reload,
    /// Nothing to do (load already in flight, or reset in progress).
    Ignored,
}

/// Effect decision returned by [`PlaybackMachine::on_ended`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndedOutcome {
    /// Stale event from a superseded load.
    Ignored,
    /// Playback stopped; autoplay is off or the last surah finished.
    Finished,
    /// Autoplay continuation: load the given surah and keep playing.
    Advance(u16),
}

/// Playback intent and element state, reconciled against backend events.
///
/// Events are tagged with a load generation; anything from a superseded
/// load is discarded, which is the only cancellation mechanism for
/// in-flight loads. The `resetting` guard keeps concurrent effects from
/// racing a full reset mid-flight.
#[derive(Debug)]
pub struct PlaybackMachine {
    intent: bool,
    playing: bool,
    loading: bool,
    autoplay: bool,
    user_initiated: bool,
    resetting: bool,
    source_open: bool,
    load_pending: bool,
    current_url: Option<String>,
    generation: u64,
}

impl PlaybackMachine {
    pub fn new() -> Self {
        Self {
            intent: false,
            playing: false,
            loading: false,
            autoplay: false,
            user_initiated: false,
            resetting: false,
            source_open: false,
            load_pending: false,
            current_url: None,
            generation: 0,
        }
    }

    pub fn intent(&self) -> bool {
        self.intent
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Register a new resolved source URL.
    ///
    /// Returns the generation to load under, or `None` when the URL matches
    /// the currently open source (de-dup: no redundant reload) or a reset is
    /// in progress. Intent is preserved across source changes, so switching
    /// surahs mid-playback flows straight into loading the new source.
    pub fn begin_load(&mut self, url: String) -> Option<u64> {
        if self.resetting {
            return None;
        }
        if self.source_open && self.current_url.as_deref() == Some(url.as_str()) {
            return None;
        }

        self.generation += 1;
        self.current_url = Some(url);
        self.source_open = false;
        self.load_pending = true;
        self.playing = false;
        self.loading = self.intent;
        Some(self.generation)
    }

    pub fn on_load_started(&mut self, generation: u64) {
        if !self.is_current(generation) || self.resetting {
            return;
        }
        if self.intent {
            self.loading = true;
        }
    }

    /// The backend opened and decoded the source. Returns whether play
    /// should be commanded (intent is consulted here, resolving any race
    /// with a pause that happened while the load was in flight).
    pub fn on_ready(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) || self.resetting {
            return false;
        }
        self.source_open = true;
        self.load_pending = false;
        self.intent && !self.playing
    }

    pub fn on_playing(&mut self, generation: u64) {
        if !self.is_current(generation) {
            return;
        }
        self.loading = false;
        self.playing = true;
    }

    /// Observed pause that is not part of a reset: the element stopped, so
    /// intent follows it down.
    pub fn on_paused(&mut self, generation: u64) {
        if !self.is_current(generation) || self.resetting {
            return;
        }
        self.playing = false;
        self.intent = false;
        self.loading = false;
    }

    pub fn on_stalled(&mut self, generation: u64) {
        if !self.is_current(generation) {
            return;
        }
        if self.playing {
            self.loading = true;
        }
    }

    /// Natural end of track. With autoplay on and surahs remaining, intent
    /// survives and the caller re-runs the pipeline for the next surah; at
    /// the last surah autoplay disarms and playback stops.
    pub fn on_ended(&mut self, generation: u64, surah: u16) -> EndedOutcome {
        if !self.is_current(generation) {
            return EndedOutcome::Ignored;
        }
        self.playing = false;
        self.loading = false;
        self.source_open = false;
        self.load_pending = false;
        self.current_url = None;

        if self.autoplay && surah < super::source::SURAH_COUNT {
            self.intent = true;
            EndedOutcome::Advance(surah + 1)
        } else {
            self.intent = false;
            self.autoplay = false;
            EndedOutcome::Finished
        }
    }

    /// Media error: full state reset. Returns whether a message should be
    /// surfaced — aborts before any user-initiated play are expected (a
    /// reset clearing the source mid-load) and stay silent.
    pub fn on_error(&mut self, generation: u64, aborted: bool) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        let surface = !(aborted && !self.user_initiated);
        self.intent = false;
        self.playing = false;
        self.loading = false;
        self.autoplay = false;
        self.source_open = false;
        self.load_pending = false;
        self.current_url = None;
        surface
    }

    /// User play/pause toggle. Flips intent; autoplay arms with every
    /// explicit play and disarms with every explicit pause.
    pub fn toggle(&mut self) -> ToggleAction {
        if self.resetting {
            return ToggleAction::Ignored;
        }
        self.intent = !self.intent;
        self.autoplay = self.intent;

        if self.intent {
            self.user_initiated = true;
            if self.source_open {
                self.loading = !self.playing;
                ToggleAction::Play
            } else if self.load_pending {
                // Load already in flight; Ready will consult intent.
                self.loading = true;
                ToggleAction::Ignored
            } else {
                // Idle / no source: self-healing reload of the selection.
                self.loading = true;
                ToggleAction::Reload
            }
        } else {
            self.loading = false;
            if self.playing || self.source_open {
                ToggleAction::Pause
            } else {
                ToggleAction::Ignored
            }
        }
    }

    /// Manual autoplay override, independent of play/pause. Returns the new
    /// state.
    pub fn toggle_autoplay(&mut self) -> bool {
        self.autoplay = !self.autoplay;
        self.autoplay
    }

    /// Start a full reset (reciter/moshaf change, invalid selection).
    ///
    /// Bumps the generation so every in-flight event goes stale, zeroes all
    /// derived state and raises the transitional guard; the caller stops the
    /// backend and then calls [`finish_reset`](Self::finish_reset).
    pub fn begin_reset(&mut self) {
        self.resetting = true;
        self.generation += 1;
        self.intent = false;
        self.playing = false;
        self.loading = false;
        self.autoplay = false;
        self.source_open = false;
        self.load_pending = false;
        self.current_url = None;
    }

    pub fn finish_reset(&mut self) {
        self.resetting = false;
    }
}

impl Default for PlaybackMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal timing state for smooth progress gauge updates
#[derive(Clone)]
pub struct PlaybackTiming {
    pub position_ms: u64,
    pub last_update: Instant,
    pub is_playing: bool,
    /// 0 when the stream duration is unknown.
    pub duration_ms: u64,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            position_ms: 0,
            last_update: Instant::now(),
            is_playing: false,
            duration_ms: 0,
        }
    }
}

impl PlaybackTiming {
    pub fn current_position_ms(&self) -> u64 {
        let raw = if self.is_playing {
            let elapsed = self.last_update.elapsed().as_millis() as u64;
            self.position_ms.saturating_add(elapsed)
        } else {
            self.position_ms
        };
        if self.duration_ms > 0 {
            raw.min(self.duration_ms)
        } else {
            raw
        }
    }

    pub fn update_position(&mut self, new_position_ms: u64, is_playing: bool) {
        let current_calculated = self.current_position_ms();
        let diff = new_position_ms as i64 - current_calculated as i64;

        let state_changed = self.is_playing != is_playing;
        let significant_jump = !(-2000..=2000).contains(&diff);
        let was_paused = !self.is_playing;
        let acceptable_sync = diff >= -100;

        if state_changed || significant_jump || was_paused || acceptable_sync {
            self.position_ms = new_position_ms;
            self.last_update = Instant::now();
        }
        self.is_playing = is_playing;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Complete playback information for rendering the header
#[derive(Clone, Debug, Default)]
pub struct PlaybackInfo {
    pub reciter: Option<String>,
    pub moshaf: Option<String>,
    pub surah: u16,
    pub surah_name: Option<String>,
    pub intent: bool,
    pub is_playing: bool,
    pub is_loading: bool,
    pub autoplay: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_machine(url: &str) -> (PlaybackMachine, u64) {
        let mut m = PlaybackMachine::new();
        let generation = m.begin_load(url.to_string()).unwrap();
        (m, generation)
    }

    #[test]
    fn toggle_twice_settles_without_redundant_commands() {
        // No source yet: the first toggle asks for a reload, the second
        // undoes it without ever issuing play or pause.
        let mut m = PlaybackMachine::new();
        assert_eq!(m.toggle(), ToggleAction::Reload);
        assert!(m.intent());
        assert_eq!(m.toggle(), ToggleAction::Ignored);
        assert!(!m.intent());
        assert!(!m.is_loading());
    }

    #[test]
    fn ready_with_intent_commands_play() {
        let (mut m, generation) = loaded_machine("https://host/001.mp3");
        m.toggle();
        m.on_load_started(generation);
        assert!(m.is_loading());
        assert!(m.on_ready(generation));
        m.on_playing(generation);
        assert!(m.is_playing());
        assert!(!m.is_loading());
    }

    #[test]
    fn ready_without_intent_is_a_noop() {
        let (mut m, generation) = loaded_machine("https://host/001.mp3");
        assert!(!m.on_ready(generation));
        assert!(!m.is_playing());
    }

    #[test]
    fn pause_raced_by_late_ready_wins() {
        // Play, then pause while the load is still in flight: the Ready
        // event must consult intent and not start playback.
        let mut m = PlaybackMachine::new();
        m.toggle();
        let generation = m.begin_load("https://host/002.mp3".to_string()).unwrap();
        assert_eq!(m.toggle(), ToggleAction::Ignored);
        assert!(!m.on_ready(generation));
    }

    #[test]
    fn stale_generation_events_are_discarded() {
        let (mut m, old) = loaded_machine("https://host/001.mp3");
        let new = m.begin_load("https://host/002.mp3".to_string()).unwrap();
        assert_ne!(old, new);
        m.on_playing(old);
        assert!(!m.is_playing());
        assert_eq!(m.on_ended(old, 1), EndedOutcome::Ignored);
    }

    #[test]
    fn same_open_url_does_not_reload() {
        let (mut m, generation) = loaded_machine("https://host/001.mp3");
        m.on_ready(generation);
        assert!(m.begin_load("https://host/001.mp3".to_string()).is_none());
        // A different surah does trigger a fresh load.
        assert!(m.begin_load("https://host/002.mp3".to_string()).is_some());
    }

    #[test]
    fn surah_change_preserves_intent() {
        let (mut m, generation) = loaded_machine("https://host/050.mp3");
        m.toggle();
        m.on_ready(generation);
        m.on_playing(generation);

        let next = m.begin_load("https://host/051.mp3".to_string()).unwrap();
        assert!(m.intent());
        assert!(m.is_loading());
        assert!(m.on_ready(next));
    }

    #[test]
    fn ended_with_autoplay_advances() {
        let (mut m, generation) = loaded_machine("https://host/050.mp3");
        m.toggle();
        m.on_ready(generation);
        m.on_playing(generation);

        assert_eq!(m.on_ended(generation, 50), EndedOutcome::Advance(51));
        assert!(m.intent());
        assert!(m.autoplay());
    }

    #[test]
    fn ended_at_last_surah_disarms_autoplay() {
        let (mut m, generation) = loaded_machine("https://host/114.mp3");
        m.toggle();
        m.on_ready(generation);
        m.on_playing(generation);

        assert_eq!(m.on_ended(generation, 114), EndedOutcome::Finished);
        assert!(!m.intent());
        assert!(!m.autoplay());
    }

    #[test]
    fn ended_without_autoplay_stops() {
        let (mut m, generation) = loaded_machine("https://host/003.mp3");
        m.toggle();
        m.on_ready(generation);
        m.on_playing(generation);
        // Explicit pause disarms autoplay, then the track runs out.
        m.toggle();
        m.on_paused(generation);
        assert_eq!(m.on_ended(generation, 3), EndedOutcome::Finished);
        assert!(!m.intent());
    }

    #[test]
    fn native_pause_clears_intent() {
        let (mut m, generation) = loaded_machine("https://host/001.mp3");
        m.toggle();
        m.on_ready(generation);
        m.on_playing(generation);
        m.on_paused(generation);
        assert!(!m.intent());
        assert!(!m.is_playing());
        assert!(!m.is_loading());
    }

    #[test]
    fn error_resets_everything() {
        let (mut m, generation) = loaded_machine("https://host/001.mp3");
        m.toggle();
        m.on_ready(generation);
        m.on_playing(generation);

        assert!(m.on_error(generation, false));
        assert!(!m.intent());
        assert!(!m.is_playing());
        assert!(!m.is_loading());
        assert!(!m.autoplay());
        assert!(m.current_url().is_none());
    }

    #[test]
    fn abort_before_user_play_stays_silent() {
        let (mut m, generation) = loaded_machine("https://host/001.mp3");
        assert!(!m.on_error(generation, true));

        // After the user has initiated playback, aborts do surface.
        let generation = m.begin_load("https://host/001.mp3".to_string()).unwrap();
        m.toggle();
        assert!(m.on_error(generation, true));
    }

    #[test]
    fn reset_clears_state_and_invalidates_in_flight_events() {
        let (mut m, generation) = loaded_machine("https://host/001.mp3");
        m.toggle();
        m.begin_reset();

        assert!(m.current_url().is_none());
        assert!(!m.intent());
        assert!(!m.is_loading());
        // Events from the superseded load are dropped.
        assert!(!m.on_ready(generation));
        // Effects are suppressed until the reset completes.
        assert_eq!(m.toggle(), ToggleAction::Ignored);
        assert!(m.begin_load("https://host/009.mp3".to_string()).is_none());

        m.finish_reset();
        assert!(m.begin_load("https://host/009.mp3".to_string()).is_some());
    }

    #[test]
    fn toggle_after_ended_reloads() {
        let (mut m, generation) = loaded_machine("https://host/004.mp3");
        m.toggle();
        m.on_ready(generation);
        m.on_playing(generation);
        m.toggle();
        m.on_paused(generation);
        m.on_ended(generation, 4);

        assert_eq!(m.toggle(), ToggleAction::Reload);
    }

    #[test]
    fn timing_clamps_to_known_duration() {
        let mut t = PlaybackTiming::default();
        t.duration_ms = 60_000;
        t.update_position(59_900, true);
        std::thread::sleep(std::time::Duration::from_millis(150));
        assert_eq!(t.current_position_ms(), 60_000);
    }

    #[test]
    fn timing_ignores_small_backwards_jitter_while_playing() {
        let mut t = PlaybackTiming::default();
        t.duration_ms = 60_000;
        t.update_position(10_000, true);
        let before = t.position_ms;
        // A slightly stale position report must not rewind the gauge.
        t.update_position(9_500, true);
        assert_eq!(t.position_ms, before);
    }
}
