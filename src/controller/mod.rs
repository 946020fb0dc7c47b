//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and manages playback operations.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `playback`: Playback control and the source pipeline
//! - `navigation`: Catalog and surah text loading
//! - `player_events`: Audio backend event listener (the reconciler)

mod input;
mod navigation;
mod playback;
mod player_events;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::audio::{AudioBackend, MediaErrorKind};
use crate::model::AppModel;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) audio_backend: Arc<Mutex<Option<AudioBackend>>>,
    event_listener_started: Arc<Mutex<bool>>,
}

impl AppController {
    pub fn new(
        model: Arc<Mutex<AppModel>>,
        audio_backend: Arc<Mutex<Option<AudioBackend>>>,
    ) -> Self {
        Self {
            model,
            audio_backend,
            event_listener_started: Arc::new(Mutex::new(false)),
        }
    }

    /// Try to start the player event listener if backend is ready and not already started
    pub async fn try_start_event_listener(&self) {
        let mut started = self.event_listener_started.lock().await;
        if *started {
            return;
        }

        let backend_guard = self.audio_backend.lock().await;
        if let Some(backend) = backend_guard.as_ref() {
            if let Some(event_channel) = backend.get_player_event_channel().await {
                *started = true;
                drop(backend_guard);
                drop(started);
                self.start_player_event_listener(event_channel);
            }
        }
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        let error_str = error.to_string();

        if error_str.contains("request failed") {
            "Network error. Check your connection and try again.".to_string()
        } else if error_str.contains("malformed") {
            "The catalog API returned an unexpected payload.".to_string()
        } else if error_str.contains("returned 429") {
            "Rate limited by the catalog API. Please wait a moment.".to_string()
        } else if error_str.contains("returned") {
            format!("The catalog API rejected the request: {}", error_str)
        } else {
            format!("Error: {}", error_str)
        }
    }

    pub(crate) fn media_error_message(kind: MediaErrorKind) -> &'static str {
        match kind {
            MediaErrorKind::Aborted => "Audio loading was interrupted.",
            MediaErrorKind::Network => {
                "Network error while fetching audio. Check your connection and try again."
            }
            MediaErrorKind::Decode => "This recording could not be decoded.",
            MediaErrorKind::Unsupported => "This audio source is not supported.",
            MediaErrorKind::Unknown => "Audio playback failed.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_error_messages_are_distinct_per_kind() {
        let kinds = [
            MediaErrorKind::Aborted,
            MediaErrorKind::Network,
            MediaErrorKind::Decode,
            MediaErrorKind::Unsupported,
            MediaErrorKind::Unknown,
        ];
        for a in kinds {
            for b in kinds {
                if a != b {
                    assert_ne!(
                        AppController::media_error_message(a),
                        AppController::media_error_message(b)
                    );
                }
            }
        }
    }
}
