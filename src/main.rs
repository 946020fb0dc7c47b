mod audio;
mod controller;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::Mutex;

use audio::AudioBackend;
use controller::AppController;
use model::{AppModel, QuranApiClient};
use view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== quran-rs starting ===");

    // Step 1: Wire the catalog API client into the model
    let mut app_model = AppModel::new();
    app_model.set_api_client(QuranApiClient::new());
    let model = Arc::new(Mutex::new(app_model));

    // Step 2: Initialize the audio backend in the background; the controller
    // attaches the event listener once it is up
    let audio_backend: Arc<Mutex<Option<AudioBackend>>> = Arc::new(Mutex::new(None));
    let audio_backend_init = audio_backend.clone();
    let model_for_init = model.clone();
    tokio::spawn(async move {
        match AudioBackend::new().await {
            Ok(backend) => {
                *audio_backend_init.lock().await = Some(backend);
            }
            Err(e) => {
                tracing::error!(error = %e, "audio backend init failed");
                let model = model_for_init.lock().await;
                model.set_error(format!("Audio init failed: {}", e)).await;
            }
        }
    });

    let controller = AppController::new(model.clone(), audio_backend.clone());

    // Step 3: Load the catalog and the initial surah text in the background
    let controller_for_init = controller.clone();
    tokio::spawn(async move {
        controller_for_init.load_catalog().await;
        controller_for_init.load_surah_text(1).await;
    });

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model.clone(), controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("quran-rs shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        // Attaches the player event listener once the backend is up; cheap
        // no-op afterwards
        controller.try_start_event_listener().await;

        // Get current state
        let (playback, ui_state, catalog, reading, should_quit) = {
            let model_guard = model.lock().await;

            // Auto-clear old errors (after 5 seconds)
            model_guard.auto_clear_old_errors().await;

            (
                model_guard.get_playback_info().await,
                model_guard.get_ui_state().await,
                model_guard.get_catalog_view().await,
                model_guard.get_reading_view().await,
                model_guard.should_quit().await,
            )
        };

        // Draw UI
        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, &catalog, &reading);
        })?;

        // Handle input with shorter poll time for smoother UI updates
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                let _ = controller.handle_key_event(key).await;
            }
        }

        if should_quit {
            break;
        }
    }

    Ok(())
}
