//! Audio backend event listener — the media event reconciler
//!
//! Consumes the backend's `PlayerEvent` channel and reconciles each event
//! against the playback machine. Intent is consulted at every transition,
//! which is what resolves races between user actions and in-flight events
//! (e.g. a pause racing a Ready). Events from superseded load generations
//! are dropped inside the machine.

use crate::audio::{MediaErrorKind, PlayerEvent, PlayerEventChannel};
use crate::model::EndedOutcome;

use super::AppController;

impl AppController {
    pub fn start_player_event_listener(&self, mut event_channel: PlayerEventChannel) {
        let model = self.model.clone();
        let controller = self.clone();
        tracing::info!("Starting player event listener");

        tokio::spawn(async move {
            while let Some(event) = event_channel.recv().await {
                let model_guard = model.lock().await;

                if model_guard.should_quit().await {
                    tracing::debug!("Player event listener shutting down");
                    break;
                }

                match event {
                    PlayerEvent::LoadStarted { generation } => {
                        tracing::debug!(generation, "PlayerEvent::LoadStarted");
                        model_guard.player_load_started(generation).await;
                    }
                    PlayerEvent::Ready {
                        generation,
                        duration,
                    } => {
                        let duration_ms = duration.map(|d| d.as_millis() as u64).unwrap_or(0);
                        tracing::debug!(generation, duration_ms, "PlayerEvent::Ready");
                        let should_play = model_guard.player_ready(generation, duration_ms).await;
                        if should_play {
                            drop(model_guard);
                            let backend_guard = controller.audio_backend.lock().await;
                            if let Some(backend) = backend_guard.as_ref() {
                                backend.play().await;
                            }
                            continue;
                        }
                    }
                    PlayerEvent::Playing { generation } => {
                        tracing::debug!(generation, "PlayerEvent::Playing");
                        model_guard.player_playing(generation).await;
                    }
                    PlayerEvent::Position {
                        generation,
                        position,
                    } => {
                        model_guard
                            .update_playback_position(generation, position.as_millis() as u64)
                            .await;
                    }
                    PlayerEvent::Paused { generation } => {
                        tracing::debug!(generation, "PlayerEvent::Paused");
                        model_guard.player_paused(generation).await;
                    }
                    PlayerEvent::Stalled { generation } => {
                        tracing::debug!(generation, "PlayerEvent::Stalled");
                        model_guard.player_stalled(generation).await;
                    }
                    PlayerEvent::Ended { generation } => {
                        let outcome = model_guard.player_ended(generation).await;
                        tracing::info!(generation, ?outcome, "PlayerEvent::Ended");
                        drop(model_guard);

                        if let EndedOutcome::Advance(next) = outcome {
                            controller.load_surah_text(next).await;
                            controller.sync_source().await;
                        }
                        continue;
                    }
                    PlayerEvent::Error { generation, kind } => {
                        let aborted = kind == MediaErrorKind::Aborted;
                        let surfaced = model_guard.player_error(generation, aborted).await;
                        tracing::warn!(generation, ?kind, surfaced, "PlayerEvent::Error");
                        if surfaced {
                            model_guard
                                .set_error(Self::media_error_message(kind).to_string())
                                .await;
                        }
                    }
                }
            }
        });
    }
}
