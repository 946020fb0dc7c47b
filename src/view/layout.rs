//! Sidebar rendering (reciter and surah lists)

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListItem, Padding},
};

use super::utils::render_scrollable_list;
use crate::model::{ActiveSection, CatalogView, UiState};

pub fn render_sidebar(frame: &mut Frame, area: Rect, ui_state: &UiState, catalog: &CatalogView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(50), // Reciters
            Constraint::Percentage(50), // Surahs
        ])
        .split(area);

    render_reciter_list(frame, chunks[0], ui_state, catalog);
    render_surah_list(frame, chunks[1], ui_state, catalog);
}

fn render_reciter_list(frame: &mut Frame, area: Rect, ui_state: &UiState, catalog: &CatalogView) {
    let is_focused = ui_state.active_section == ActiveSection::Reciters;

    let items: Vec<ListItem> = if ui_state.catalog_loading {
        vec![ListItem::new("Loading reciters...").style(Style::default().fg(Color::Yellow))]
    } else {
        catalog
            .reciter_names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let is_active = catalog.active_reciter == Some(i);
                let marker = if is_active { "● " } else { "  " };

                let style = if i == ui_state.reciter_selected && is_focused {
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD)
                } else if i == ui_state.reciter_selected || is_active {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                ListItem::new(format!("{}{}", marker, name)).style(style)
            })
            .collect()
    };

    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let title = match &catalog.active_moshaf_name {
        Some(name) => format!(" Reciters — {} ", name),
        None => " Reciters ".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, area, items, ui_state.reciter_selected, block);
}

fn render_surah_list(frame: &mut Frame, area: Rect, ui_state: &UiState, catalog: &CatalogView) {
    let is_focused = ui_state.active_section == ActiveSection::Surahs;

    let items: Vec<ListItem> = catalog
        .surah_labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let available = catalog.available.get(i).copied().unwrap_or(true);

            let style = if i == ui_state.surah_selected && is_focused {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else if i == ui_state.surah_selected {
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else if !available {
                // Not on the active moshaf's server
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(label.clone()).style(style)
        })
        .collect();

    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Surahs ")
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, area, items, ui_state.surah_selected, block);
}
