//! Playback header rendering

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
};

use super::utils::format_duration;
use crate::model::PlaybackInfo;

pub fn render_header(frame: &mut Frame, area: Rect, playback: &PlaybackInfo) {
    let surah_label = match &playback.surah_name {
        Some(name) => format!("{:03} {}", playback.surah, name),
        None => format!("Surah {:03}", playback.surah),
    };

    let status_text = match &playback.reciter {
        None => " No reciter selected".to_string(),
        Some(reciter) => {
            let glyph = if playback.is_loading {
                "◌"
            } else if playback.is_playing {
                "▶"
            } else {
                "⏸"
            };
            let moshaf = playback.moshaf.as_deref().unwrap_or("");
            format!(" {} {} | {} ({})", glyph, surah_label, reciter, moshaf)
        }
    };

    let autoplay_text = if playback.autoplay {
        "Autoplay: On"
    } else {
        "Autoplay: Off"
    };
    let buffer_text = if playback.is_loading {
        " | Buffering..."
    } else {
        ""
    };

    let time_str = if playback.duration_ms > 0 {
        format!(
            "{} / {}",
            format_duration(playback.position_ms),
            format_duration(playback.duration_ms)
        )
    } else {
        format_duration(playback.position_ms)
    };

    let progress_ratio = if playback.duration_ms > 0 {
        (playback.position_ms as f64 / playback.duration_ms as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let gauge_style = if playback.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Green)
    };

    let title = format!("{} ", status_text);
    let controls_info = format!(" {}{} ", autoplay_text, buffer_text);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(gauge_style)
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}
