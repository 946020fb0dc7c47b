//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::model::ActiveSection;
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // Handle error message first (blocks all other interactions)
        if model.has_error().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    model.clear_error().await;
                    Ok(())
                }
                _ => Ok(()),
            };
        }

        // Handle help popup
        if model.is_help_popup_open().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') => {
                    model.hide_help_popup().await;
                    Ok(())
                }
                _ => Ok(()),
            };
        }

        let ui_state = model.get_ui_state().await;

        // Section-specific bindings
        match ui_state.active_section {
            ActiveSection::Reciters => {
                if key.code == KeyCode::Enter {
                    let selected = ui_state.reciter_selected;
                    drop(model);
                    self.select_reciter(selected).await;
                    return Ok(());
                }
            }
            ActiveSection::Surahs => {
                if key.code == KeyCode::Enter {
                    let surah = ui_state.surah_selected as u16 + 1;
                    drop(model);
                    self.select_surah(surah).await;
                    return Ok(());
                }
            }
            ActiveSection::Reading => match key.code {
                KeyCode::PageUp => {
                    model.scroll_page(false, 10).await;
                    return Ok(());
                }
                KeyCode::PageDown => {
                    model.scroll_page(true, 10).await;
                    return Ok(());
                }
                _ => {}
            },
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab => {
                model.cycle_section_forward().await;
            }
            KeyCode::BackTab => {
                model.cycle_section_backward().await;
            }
            KeyCode::Up => {
                model.move_selection_up().await;
            }
            KeyCode::Down => {
                model.move_selection_down().await;
            }
            // Play/Pause toggle
            KeyCode::Char(' ') => {
                drop(model);
                self.toggle_playback().await;
            }
            // Next surah
            KeyCode::Char('n') | KeyCode::Char('N') => {
                drop(model);
                self.next_surah().await;
            }
            // Previous surah
            KeyCode::Char('p') | KeyCode::Char('P') => {
                drop(model);
                self.previous_surah().await;
            }
            // Toggle autoplay chaining
            KeyCode::Char('a') | KeyCode::Char('A') => {
                drop(model);
                self.toggle_autoplay().await;
            }
            // Toggle view mode
            KeyCode::Char('v') | KeyCode::Char('V') => {
                model.toggle_view_mode().await;
            }
            // Font size
            KeyCode::Char('+') | KeyCode::Char('=') => {
                model.increase_font().await;
            }
            KeyCode::Char('-') => {
                model.decrease_font().await;
            }
            // Reload the catalog
            KeyCode::Char('r') | KeyCode::Char('R') => {
                drop(model);
                let controller = self.clone();
                tokio::spawn(async move {
                    controller.load_catalog().await;
                });
            }
            // Show help popup
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.show_help_popup().await;
            }
            _ => {}
        }
        Ok(())
    }
}
