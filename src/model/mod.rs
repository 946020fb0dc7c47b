//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (sections, view settings, UI state)
//! - `catalog`: Reciter/moshaf/surah types from the mp3quran API
//! - `source`: Audio file URL resolution
//! - `playback`: Playback state machine and timing state
//! - `text`: Surah text loading for the reading panel
//! - `quran_client`: mp3quran API client wrapper
//! - `app_model`: Main application model with state management methods

mod app_model;
mod catalog;
mod playback;
mod quran_client;
mod source;
mod text;
mod types;

// Re-export all public types for convenient access
pub use types::{ActiveSection, DisplaySettings, UiState, ViewMode};

pub use catalog::{Moshaf, Reciter, SurahInfo};

pub use playback::{EndedOutcome, PlaybackInfo, ToggleAction};

pub use source::{SURAH_COUNT, resolve_audio_url};

pub use text::SurahText;

pub use quran_client::{CATALOG_LANGUAGE, QuranApiClient};

pub use app_model::{AppModel, CatalogView, ReadingView};
