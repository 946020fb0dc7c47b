//! Playback control and the source pipeline

use crate::model::{SURAH_COUNT, ToggleAction, resolve_audio_url};

use super::AppController;

impl AppController {
    /// User play/pause toggle. The machine decides the effect; this just
    /// carries it out against the backend.
    pub async fn toggle_playback(&self) {
        let model = self.model.lock().await;
        let action = model.toggle_playback().await;
        drop(model);
        tracing::debug!(?action, "playback toggled");

        match action {
            ToggleAction::Play => {
                let backend_guard = self.audio_backend.lock().await;
                if let Some(backend) = backend_guard.as_ref() {
                    backend.play().await;
                } else {
                    drop(backend_guard);
                    self.backend_missing().await;
                }
            }
            ToggleAction::Pause => {
                let backend_guard = self.audio_backend.lock().await;
                if let Some(backend) = backend_guard.as_ref() {
                    backend.pause().await;
                }
            }
            ToggleAction::Reload => {
                self.sync_source().await;
            }
            ToggleAction::Ignored => {}
        }
    }

    pub async fn toggle_autoplay(&self) {
        let model = self.model.lock().await;
        let enabled = model.toggle_autoplay().await;
        tracing::debug!(enabled, "autoplay toggled");
    }

    /// Activate a reciter from the catalog list. Re-selects the moshaf; a
    /// changed moshaf means a full playback reset followed by a paused
    /// preload of the current selection.
    pub async fn select_reciter(&self, index: usize) {
        let model = self.model.lock().await;
        let Some(reciter) = model.get_reciter(index).await else {
            return;
        };
        let new_moshaf = reciter.default_moshaf().cloned();
        let Some(moshaf) = new_moshaf else {
            model
                .set_error(format!("No recordings available for {}", reciter.name))
                .await;
            return;
        };

        let changed = model.active_moshaf_id().await != Some(moshaf.id);
        model.set_active_reciter(index).await;
        tracing::info!(reciter = %reciter.name, moshaf = %moshaf.name, changed, "reciter selected");
        model.set_active_moshaf(Some(moshaf)).await;
        drop(model);

        if changed {
            self.full_reset().await;
            self.sync_source().await;
        }
    }

    /// Change the surah selection. Playback intent is preserved: with a
    /// track playing this flows straight into loading the new source.
    pub async fn select_surah(&self, surah: u16) {
        if !(1..=SURAH_COUNT).contains(&surah) {
            return;
        }
        let model = self.model.lock().await;
        model.set_selected_surah(surah).await;
        let has_moshaf = model.get_active_moshaf().await.is_some();
        drop(model);

        self.load_surah_text(surah).await;
        if has_moshaf {
            self.sync_source().await;
        }
    }

    pub async fn next_surah(&self) {
        let surah = self.model.lock().await.selected_surah().await;
        if surah < SURAH_COUNT {
            self.select_surah(surah + 1).await;
        }
    }

    pub async fn previous_surah(&self) {
        let surah = self.model.lock().await.selected_surah().await;
        if surah > 1 {
            self.select_surah(surah - 1).await;
        }
    }

    /// Re-derive the source URL from the active moshaf and selected surah
    /// and hand it to the backend. The machine de-dups identical URLs, so
    /// calling this again for an unchanged open source is a no-op.
    ///
    /// Validation failures (no moshaf, surah missing from the edition, bad
    /// server URL) fully reset playback and surface a message.
    pub(crate) async fn sync_source(&self) {
        let model = self.model.lock().await;
        let Some(moshaf) = model.get_active_moshaf().await else {
            model.set_error("Select a reciter first".to_string()).await;
            drop(model);
            self.full_reset().await;
            return;
        };
        let surah = model.selected_surah().await;

        if !moshaf.has_surah(surah) {
            model
                .set_error(format!(
                    "Surah {:03} is not available in {}",
                    surah, moshaf.name
                ))
                .await;
            drop(model);
            self.full_reset().await;
            return;
        }

        match resolve_audio_url(&moshaf.server, surah) {
            Ok(url) => {
                let generation = model.begin_load(url.clone()).await;
                drop(model);
                let Some(generation) = generation else {
                    return;
                };

                let backend_guard = self.audio_backend.lock().await;
                if let Some(backend) = backend_guard.as_ref() {
                    backend.load(url, generation).await;
                } else {
                    drop(backend_guard);
                    self.backend_missing().await;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, surah, "audio source resolution failed");
                model.set_error(format!("Cannot derive audio URL: {}", e)).await;
                drop(model);
                self.full_reset().await;
            }
        }
    }

    /// Full playback reset: pause and clear the backend source, zero all
    /// derived state. The machine's transitional guard keeps concurrent
    /// effects from racing the reset mid-flight.
    pub(crate) async fn full_reset(&self) {
        let model = self.model.lock().await;
        model.begin_playback_reset().await;
        drop(model);

        let backend_guard = self.audio_backend.lock().await;
        if let Some(backend) = backend_guard.as_ref() {
            backend.stop().await;
        }
        drop(backend_guard);

        let model = self.model.lock().await;
        model.finish_playback_reset().await;
    }

    async fn backend_missing(&self) {
        tracing::warn!("audio backend not ready");
        let model = self.model.lock().await;
        model
            .set_error("Audio backend not ready. Please try again.".to_string())
            .await;
        drop(model);
        self.full_reset().await;
    }
}
