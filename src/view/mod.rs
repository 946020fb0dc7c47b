//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `layout`: Sidebar structure (reciter and surah lists)
//! - `header`: Playback header with the progress gauge
//! - `content`: Reading panel rendering
//! - `overlays`: Modal overlays (error, help)

mod content;
mod header;
mod layout;
mod overlays;
mod utils;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
};

use crate::model::{CatalogView, PlaybackInfo, ReadingView, UiState};

pub struct AppView;

impl AppView {
    pub fn render(
        frame: &mut Frame,
        playback: &PlaybackInfo,
        ui_state: &UiState,
        catalog: &CatalogView,
        reading: &ReadingView,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Playback header
                Constraint::Min(0),    // Sidebar + reading panel
                Constraint::Length(1), // Key hints
            ])
            .split(frame.area());

        // Top: playback state and progress
        header::render_header(frame, chunks[0], playback);

        // Middle: Sidebar (Reciters + Surahs) and the reading panel
        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Sidebar
                Constraint::Percentage(70), // Reading panel
            ])
            .split(chunks[1]);

        layout::render_sidebar(frame, main_chunks[0], ui_state, catalog);
        content::render_reading(frame, main_chunks[1], ui_state, reading);

        // Bottom: key hints
        let hints = Paragraph::new(
            " Tab sections · ↑↓ move · Enter select · Space play/pause · N/P surah · H help · Q quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hints, chunks[2]);

        // Error notification overlay (if there's an error)
        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        // Help popup overlay (if open)
        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}
