//! Main application model with state management

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::catalog::{Moshaf, Reciter, SurahInfo};
use super::playback::{
    EndedOutcome, PlaybackInfo, PlaybackMachine, PlaybackTiming, ToggleAction,
};
use super::quran_client::QuranApiClient;
use super::source::SURAH_COUNT;
use super::text::SurahText;
use super::types::{ActiveSection, DisplaySettings, UiState};

/// Identical consecutive error messages inside this window are dropped.
const ERROR_DEDUP_WINDOW: Duration = Duration::from_secs(3);

/// Sidebar snapshot handed to the view.
#[derive(Clone, Default)]
pub struct CatalogView {
    pub reciter_names: Vec<String>,
    pub active_reciter: Option<usize>,
    pub active_moshaf_name: Option<String>,
    pub surah_labels: Vec<String>,
    /// Availability on the active moshaf, indexed by surah - 1.
    pub available: Vec<bool>,
}

/// Reading panel snapshot handed to the view.
#[derive(Clone)]
pub struct ReadingView {
    pub text: SurahText,
    pub settings: DisplaySettings,
}

/// Main application model containing all state
pub struct AppModel {
    pub api: Option<QuranApiClient>,
    reciters: Arc<Mutex<Vec<Reciter>>>,
    active_reciter: Arc<Mutex<Option<usize>>>,
    active_moshaf: Arc<Mutex<Option<Moshaf>>>,
    surah_names: Arc<Mutex<Vec<SurahInfo>>>,
    display: Arc<Mutex<DisplaySettings>>,
    machine: Arc<Mutex<PlaybackMachine>>,
    timing: Arc<Mutex<PlaybackTiming>>,
    surah_text: Arc<Mutex<SurahText>>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            api: None,
            reciters: Arc::new(Mutex::new(Vec::new())),
            active_reciter: Arc::new(Mutex::new(None)),
            active_moshaf: Arc::new(Mutex::new(None)),
            surah_names: Arc::new(Mutex::new(Vec::new())),
            display: Arc::new(Mutex::new(DisplaySettings::default())),
            machine: Arc::new(Mutex::new(PlaybackMachine::new())),
            timing: Arc::new(Mutex::new(PlaybackTiming::default())),
            surah_text: Arc::new(Mutex::new(SurahText::placeholder(1))),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_api_client(&mut self, client: QuranApiClient) {
        self.api = Some(client);
    }

    pub async fn get_api_client(&self) -> Option<QuranApiClient> {
        self.api.clone()
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    pub async fn set_reciters(&self, reciters: Vec<Reciter>) {
        let mut state = self.ui_state.lock().await;
        state.catalog_loading = false;
        state.reciter_selected = state.reciter_selected.min(reciters.len().saturating_sub(1));
        drop(state);
        *self.reciters.lock().await = reciters;
    }

    pub async fn get_reciter(&self, index: usize) -> Option<Reciter> {
        self.reciters.lock().await.get(index).cloned()
    }

    pub async fn reciter_count(&self) -> usize {
        self.reciters.lock().await.len()
    }

    pub async fn set_active_reciter(&self, index: usize) {
        *self.active_reciter.lock().await = Some(index);
    }

    pub async fn set_active_moshaf(&self, moshaf: Option<Moshaf>) {
        *self.active_moshaf.lock().await = moshaf;
    }

    pub async fn get_active_moshaf(&self) -> Option<Moshaf> {
        self.active_moshaf.lock().await.clone()
    }

    pub async fn active_moshaf_id(&self) -> Option<u32> {
        self.active_moshaf.lock().await.as_ref().map(|m| m.id)
    }

    pub async fn set_surah_names(&self, names: Vec<SurahInfo>) {
        *self.surah_names.lock().await = names;
    }

    pub async fn surah_name(&self, surah: u16) -> Option<String> {
        self.surah_names
            .lock()
            .await
            .iter()
            .find(|s| s.id == surah)
            .map(|s| s.name.clone())
    }

    pub async fn set_catalog_loading(&self, loading: bool) {
        self.ui_state.lock().await.catalog_loading = loading;
    }

    pub async fn get_catalog_view(&self) -> CatalogView {
        let reciters = self.reciters.lock().await;
        let active_reciter = *self.active_reciter.lock().await;
        let moshaf = self.active_moshaf.lock().await.clone();
        let names = self.surah_names.lock().await;

        let mut available = vec![moshaf.is_none(); SURAH_COUNT as usize];
        if let Some(ref m) = moshaf {
            for n in m.surah_numbers() {
                if (1..=SURAH_COUNT).contains(&n) {
                    available[(n - 1) as usize] = true;
                }
            }
        }

        let surah_labels = (1..=SURAH_COUNT)
            .map(|n| {
                let name = names
                    .iter()
                    .find(|s| s.id == n)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| format!("Surah {}", n));
                format!("{:03}  {}", n, name)
            })
            .collect();

        CatalogView {
            reciter_names: reciters.iter().map(|r| r.name.clone()).collect(),
            active_reciter,
            active_moshaf_name: moshaf.map(|m| m.name),
            surah_labels,
            available,
        }
    }

    // ========================================================================
    // Display settings & surah text
    // ========================================================================

    pub async fn get_display_settings(&self) -> DisplaySettings {
        *self.display.lock().await
    }

    pub async fn selected_surah(&self) -> u16 {
        self.display.lock().await.selected_surah
    }

    pub async fn set_selected_surah(&self, surah: u16) {
        let mut display = self.display.lock().await;
        display.selected_surah = surah;
        drop(display);
        let mut state = self.ui_state.lock().await;
        state.surah_selected = (surah - 1) as usize;
        state.content_scroll = 0;
    }

    pub async fn increase_font(&self) {
        self.display.lock().await.increase_font();
    }

    pub async fn decrease_font(&self) {
        self.display.lock().await.decrease_font();
    }

    pub async fn toggle_view_mode(&self) {
        let mut display = self.display.lock().await;
        display.view_mode = display.view_mode.toggle();
    }

    pub async fn set_surah_text(&self, text: SurahText) {
        *self.surah_text.lock().await = text;
    }

    pub async fn get_reading_view(&self) -> ReadingView {
        ReadingView {
            text: self.surah_text.lock().await.clone(),
            settings: *self.display.lock().await,
        }
    }

    // ========================================================================
    // Playback machine
    // ========================================================================

    pub async fn begin_load(&self, url: String) -> Option<u64> {
        let mut machine = self.machine.lock().await;
        let generation = machine.begin_load(url);
        if let Some(generation) = generation {
            tracing::debug!(
                generation,
                url = machine.current_url().unwrap_or_default(),
                "audio source registered"
            );
        }
        generation
    }

    pub async fn toggle_playback(&self) -> ToggleAction {
        self.machine.lock().await.toggle()
    }

    pub async fn toggle_autoplay(&self) -> bool {
        self.machine.lock().await.toggle_autoplay()
    }

    pub async fn begin_playback_reset(&self) {
        self.machine.lock().await.begin_reset();
        self.timing.lock().await.reset();
    }

    pub async fn finish_playback_reset(&self) {
        self.machine.lock().await.finish_reset();
    }

    pub async fn player_load_started(&self, generation: u64) {
        self.machine.lock().await.on_load_started(generation);
    }

    /// Source opened. Stores the reported duration and returns whether the
    /// controller should command play.
    pub async fn player_ready(&self, generation: u64, duration_ms: u64) -> bool {
        let mut machine = self.machine.lock().await;
        let should_play = machine.on_ready(generation);
        if generation == machine.generation() {
            let mut timing = self.timing.lock().await;
            timing.reset();
            timing.duration_ms = duration_ms;
        }
        should_play
    }

    pub async fn player_playing(&self, generation: u64) {
        let mut machine = self.machine.lock().await;
        machine.on_playing(generation);
        if generation == machine.generation() {
            let mut timing = self.timing.lock().await;
            let position = timing.current_position_ms();
            timing.update_position(position, true);
        }
    }

    pub async fn player_paused(&self, generation: u64) {
        let mut machine = self.machine.lock().await;
        machine.on_paused(generation);
        if generation == machine.generation() {
            let mut timing = self.timing.lock().await;
            let position = timing.current_position_ms();
            timing.update_position(position, false);
        }
    }

    pub async fn player_stalled(&self, generation: u64) {
        self.machine.lock().await.on_stalled(generation);
    }

    pub async fn update_playback_position(&self, generation: u64, position_ms: u64) {
        let machine = self.machine.lock().await;
        if generation != machine.generation() {
            return;
        }
        let is_playing = machine.is_playing();
        drop(machine);
        self.timing
            .lock()
            .await
            .update_position(position_ms, is_playing);
    }

    /// Natural end of track. Applies the autoplay decision to the surah
    /// selection; the controller re-runs the source pipeline on `Advance`.
    pub async fn player_ended(&self, generation: u64) -> EndedOutcome {
        let surah = self.selected_surah().await;
        let outcome = self.machine.lock().await.on_ended(generation, surah);
        self.timing.lock().await.reset();
        if let EndedOutcome::Advance(next) = outcome {
            self.set_selected_surah(next).await;
        }
        outcome
    }

    /// Media error. Returns whether a message should be surfaced.
    pub async fn player_error(&self, generation: u64, aborted: bool) -> bool {
        let surfaced = self.machine.lock().await.on_error(generation, aborted);
        self.timing.lock().await.reset();
        surfaced
    }

    pub async fn playback_intent(&self) -> bool {
        self.machine.lock().await.intent()
    }

    pub async fn is_playing(&self) -> bool {
        self.machine.lock().await.is_playing()
    }

    pub async fn get_playback_info(&self) -> PlaybackInfo {
        let machine = self.machine.lock().await;
        let timing = self.timing.lock().await;
        let display = self.display.lock().await;
        let reciters = self.reciters.lock().await;
        let active_reciter = *self.active_reciter.lock().await;
        let moshaf = self.active_moshaf.lock().await.clone();
        let surah = display.selected_surah;
        drop(display);
        let surah_name = self
            .surah_names
            .lock()
            .await
            .iter()
            .find(|s| s.id == surah)
            .map(|s| s.name.clone());

        PlaybackInfo {
            reciter: active_reciter.and_then(|i| reciters.get(i).map(|r| r.name.clone())),
            moshaf: moshaf.map(|m| m.name),
            surah,
            surah_name,
            intent: machine.intent(),
            is_playing: machine.is_playing(),
            is_loading: machine.is_loading(),
            autoplay: machine.autoplay(),
            position_ms: timing.current_position_ms(),
            duration_ms: timing.duration_ms,
        }
    }

    // ========================================================================
    // UI state
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn cycle_section_forward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn cycle_section_backward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.prev();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        let mut state = self.ui_state.lock().await;
        state.active_section = section;
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Reciters => {
                if state.reciter_selected > 0 {
                    state.reciter_selected -= 1;
                }
            }
            ActiveSection::Surahs => {
                if state.surah_selected > 0 {
                    state.surah_selected -= 1;
                }
            }
            ActiveSection::Reading => {
                state.content_scroll = state.content_scroll.saturating_sub(1);
            }
        }
    }

    pub async fn move_selection_down(&self) {
        let reciter_count = self.reciter_count().await;
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Reciters => {
                if state.reciter_selected < reciter_count.saturating_sub(1) {
                    state.reciter_selected += 1;
                }
            }
            ActiveSection::Surahs => {
                if state.surah_selected < (SURAH_COUNT as usize) - 1 {
                    state.surah_selected += 1;
                }
            }
            ActiveSection::Reading => {
                state.content_scroll = state.content_scroll.saturating_add(1);
            }
        }
    }

    pub async fn scroll_page(&self, down: bool, page: u16) {
        let mut state = self.ui_state.lock().await;
        state.content_scroll = if down {
            state.content_scroll.saturating_add(page)
        } else {
            state.content_scroll.saturating_sub(page)
        };
    }

    // ========================================================================
    // Errors & overlays
    // ========================================================================

    /// Surface an error message. Identical consecutive messages inside the
    /// dedup window are dropped so a flapping source does not stack toasts.
    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        if let (Some(existing), Some(ts)) = (&state.error_message, state.error_timestamp) {
            if *existing == message && ts.elapsed() < ERROR_DEDUP_WINDOW {
                return;
            }
        }
        tracing::warn!(message = %message, "surfacing error");
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > 5 {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_errors_inside_window_are_dropped() {
        let model = AppModel::new();
        model.set_error("Network error".to_string()).await;
        let first_ts = model.get_ui_state().await.error_timestamp;
        model.set_error("Network error".to_string()).await;
        assert_eq!(model.get_ui_state().await.error_timestamp, first_ts);

        // A different message replaces the toast immediately.
        model.set_error("Decode error".to_string()).await;
        let state = model.get_ui_state().await;
        assert_eq!(state.error_message.as_deref(), Some("Decode error"));
    }

    #[tokio::test]
    async fn selecting_a_surah_resets_scroll_and_cursor() {
        let model = AppModel::new();
        model.scroll_page(true, 10).await;
        model.set_selected_surah(36).await;
        let state = model.get_ui_state().await;
        assert_eq!(state.surah_selected, 35);
        assert_eq!(state.content_scroll, 0);
        assert_eq!(model.selected_surah().await, 36);
    }

    #[tokio::test]
    async fn autoplay_advance_moves_the_selection() {
        let model = AppModel::new();
        model.set_selected_surah(50).await;
        let generation = model
            .begin_load("https://host/050.mp3".to_string())
            .await
            .unwrap();
        model.toggle_playback().await;
        model.player_ready(generation, 0).await;
        model.player_playing(generation).await;

        let outcome = model.player_ended(generation).await;
        assert_eq!(outcome, EndedOutcome::Advance(51));
        assert_eq!(model.selected_surah().await, 51);
        assert!(model.playback_intent().await);
    }
}
