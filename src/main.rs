mod app;
mod cli;
mod error;
mod issues;
mod map;
mod tasks;
mod tui;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use crate::app::{AppState, Settings};
use crate::cli::Args;
use crate::error::{IssueMapError, Result};
use crate::issues::IssueService;
use crate::tasks::{Channels, Fetcher, FetcherConfig, FetcherEvent};
use crate::tui::TuiApp;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Log to a file so the TUI stays clean
    init_tracing(args.verbose, &args.log_path())?;

    info!("issuemap v{} starting", env!("CARGO_PKG_VERSION"));

    let settings = Settings::from_args(&args)?;
    let state = AppState::new(settings);

    // Set up graceful shutdown
    let shutdown_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        info!("Received Ctrl-C, shutting down...");
        shutdown_state.quit();
    });

    // Run the application
    if let Err(e) = run(state).await {
        error!(recoverable = e.is_recoverable(), "Application error: {}", e);
        return Err(e);
    }

    info!("issuemap shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber writing to `path`
fn init_tracing(verbose: bool, path: &Path) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| {
            IssueMapError::Config(format!("cannot create log directory {:?}: {}", dir, e))
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| IssueMapError::Config(format!("cannot open log file {:?}: {}", path, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .compact()
        .init();

    Ok(())
}

/// Main application loop
async fn run(state: Arc<AppState>) -> Result<()> {
    let settings = &state.settings;
    info!(
        source = %settings.source,
        refresh = ?settings.refresh,
        lat = settings.viewport.initial.center.lat,
        lng = settings.viewport.initial.center.lng,
        zoom = settings.viewport.initial.zoom,
        focus = ?settings.initial_focus,
        "Starting session"
    );

    let service = IssueService::new(&settings.source)?;

    // Set up channels for task communication
    let channels = Channels::new();
    let (cmd_tx, cmd_rx, event_tx, mut event_rx) = channels.split();

    // Start fetcher task
    let fetcher = Fetcher::new(
        FetcherConfig {
            refresh: settings.refresh,
        },
        service,
        Arc::clone(&state),
        cmd_rx,
        event_tx,
    );
    tokio::spawn(async move {
        fetcher.run().await;
    });

    // Initialize TUI
    let mut tui = TuiApp::new(Arc::clone(&state), cmd_tx)?;

    info!("TUI started - press 'q' to quit");

    // Main event loop
    'main: loop {
        // Handle TUI input
        let should_quit = tui.handle_input().await?;
        if should_quit || state.is_quitting() {
            break;
        }

        // Process fetcher events
        while let Ok(event) = event_rx.try_recv() {
            match event {
                FetcherEvent::Fetching => tui.set_fetching(),
                FetcherEvent::Loaded { issues, fetched_at } => {
                    tui.set_issues(issues, fetched_at);
                }
                FetcherEvent::Unchanged { fetched_at } => tui.mark_fetched(fetched_at),
                FetcherEvent::Error(msg) => tui.set_error(msg),
                FetcherEvent::Shutdown => {
                    info!("Fetcher shutdown");
                    break 'main;
                }
            }
        }

        // Evaluate the map core, then draw
        tui.update();
        tui.draw()?;

        // Small delay to prevent busy loop
        tokio::time::sleep(tokio::time::Duration::from_millis(16)).await; // ~60 FPS
    }

    // Clean shutdown
    tui.cleanup();

    Ok(())
}
