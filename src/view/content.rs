//! Reading panel rendering

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::model::{ActiveSection, ReadingView, UiState, ViewMode};

pub fn render_reading(frame: &mut Frame, area: Rect, ui_state: &UiState, reading: &ReadingView) {
    let is_focused = ui_state.active_section == ActiveSection::Reading;
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let settings = reading.settings;
    // Font size maps to reading margins and verse spacing in the terminal.
    let margin = settings.font_size as u16 * 2;
    let spacing = settings.font_size.saturating_sub(1).min(2) as usize;

    let mut lines: Vec<Line> = Vec::new();
    match settings.view_mode {
        ViewMode::Verses => {
            for (i, verse) in reading.text.verses.iter().enumerate() {
                if i > 0 {
                    for _ in 0..spacing {
                        lines.push(Line::from(""));
                    }
                }
                lines.push(Line::from(verse.clone()));
            }
        }
        ViewMode::Continuous => {
            lines.push(Line::from(reading.text.verses.join(" ")));
        }
    }

    if reading.text.from_placeholder {
        lines.push(Line::from(""));
        lines.push(
            Line::from("(text asset missing — showing placeholder)")
                .style(Style::default().fg(Color::DarkGray)),
        );
    }

    let title = format!(
        " Surah {:03} · {} · size {} ",
        reading.text.surah,
        settings.view_mode.label(),
        settings.font_size
    );

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Right)
        .wrap(Wrap { trim: false })
        .scroll((ui_state.content_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .padding(Padding::horizontal(margin))
                .border_style(border_style),
        );

    frame.render_widget(paragraph, area);
}
