use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, info, instrument, warn};

use crate::app::AppState;
use crate::issues::IssueService;

use super::channels::{FetcherCommand, FetcherEvent};

/// Fetcher task configuration
#[derive(Clone)]
pub struct FetcherConfig {
    /// Poll period, `None` to fetch only on demand
    pub refresh: Option<Duration>,
}

/// Background task that keeps the issue list current
pub struct Fetcher {
    config: FetcherConfig,
    service: IssueService,
    state: Arc<AppState>,
    cmd_rx: mpsc::Receiver<FetcherCommand>,
    event_tx: mpsc::Sender<FetcherEvent>,
}

impl Fetcher {
    pub fn new(
        config: FetcherConfig,
        service: IssueService,
        state: Arc<AppState>,
        cmd_rx: mpsc::Receiver<FetcherCommand>,
        event_tx: mpsc::Sender<FetcherEvent>,
    ) -> Self {
        Self {
            config,
            service,
            state,
            cmd_rx,
            event_tx,
        }
    }

    /// Run the fetcher task
    #[instrument(skip(self), name = "fetcher")]
    pub async fn run(mut self) {
        info!(location = ?self.service.location(), "Fetcher starting");

        // Timer is never polled when refresh is disabled
        let period = self.config.refresh.unwrap_or(Duration::from_secs(24 * 60 * 60));
        let mut refresh_timer = interval(period);
        refresh_timer.tick().await; // Skip first immediate tick

        self.fetch().await;

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(FetcherCommand::Refresh) => {
                            debug!("Received Refresh command");
                            refresh_timer.reset();
                            self.fetch().await;
                        }
                        Some(FetcherCommand::Quit) | None => {
                            info!("Received Quit command");
                            break;
                        }
                    }
                }

                _ = refresh_timer.tick(), if self.config.refresh.is_some() => {
                    if !self.state.is_quitting() {
                        debug!("Refresh timer fired");
                        self.fetch().await;
                    }
                }

                // Check for shutdown
                _ = tokio::time::sleep(Duration::from_millis(100)) => {
                    if self.state.is_quitting() {
                        break;
                    }
                }
            }
        }

        info!("Fetcher shutting down");
        let _ = self.event_tx.send(FetcherEvent::Shutdown).await;
    }

    /// Fetch the list and report the outcome
    async fn fetch(&mut self) {
        let _ = self.event_tx.send(FetcherEvent::Fetching).await;

        let event = match self.service.refresh().await {
            Ok(refresh) if refresh.changed => {
                info!(count = refresh.issues.len(), "Issues loaded");
                FetcherEvent::Loaded {
                    issues: refresh.issues,
                    fetched_at: refresh.fetched_at,
                }
            }
            Ok(refresh) => {
                debug!("Issues unchanged");
                FetcherEvent::Unchanged {
                    fetched_at: refresh.fetched_at,
                }
            }
            Err(e) => {
                let kept = self.service.last_good().map_or(0, |issues| issues.len());
                warn!(
                    error = %e,
                    recoverable = e.is_recoverable(),
                    kept,
                    "Failed to fetch issues"
                );
                FetcherEvent::Error(format!("Fetch failed: {}", e))
            }
        };

        let _ = self.event_tx.send(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Settings;
    use crate::cli::Args;
    use crate::tasks::Channels;
    use clap::Parser;

    fn state() -> Arc<AppState> {
        let args = Args::parse_from(["issuemap", "--source", "unused.json"]);
        AppState::new(Settings::from_args(&args).unwrap())
    }

    fn drain(event_rx: &mut mpsc::Receiver<FetcherEvent>) -> Vec<FetcherEvent> {
        let mut events = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_fetcher_loads_then_quits() {
        let path = std::env::temp_dir().join(format!("issuemap-fetcher-{}.json", std::process::id()));
        std::fs::write(&path, br#"[{"id": 1, "lat": 12.97, "lng": 77.59}]"#).unwrap();

        let service = IssueService::new(path.to_str().unwrap()).unwrap();
        let (cmd_tx, cmd_rx, event_tx, mut event_rx) = Channels::new().split();
        let fetcher = Fetcher::new(FetcherConfig { refresh: None }, service, state(), cmd_rx, event_tx);

        tokio_test::block_on(async move {
            cmd_tx.send(FetcherCommand::Quit).await.unwrap();
            fetcher.run().await;
        });

        let events = drain(&mut event_rx);
        assert!(matches!(events[0], FetcherEvent::Fetching));
        match &events[1] {
            FetcherEvent::Loaded { issues, .. } => assert_eq!(issues.len(), 1),
            other => panic!("expected Loaded, got {:?}", other),
        }
        assert!(matches!(events.last(), Some(FetcherEvent::Shutdown)));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_fetcher_reports_errors() {
        let service = IssueService::new("/nonexistent/issuemap/issues.json").unwrap();
        let (cmd_tx, cmd_rx, event_tx, mut event_rx) = Channels::new().split();
        let fetcher = Fetcher::new(FetcherConfig { refresh: None }, service, state(), cmd_rx, event_tx);

        tokio_test::block_on(async move {
            cmd_tx.send(FetcherCommand::Refresh).await.unwrap();
            cmd_tx.send(FetcherCommand::Quit).await.unwrap();
            fetcher.run().await;
        });

        let errors = drain(&mut event_rx)
            .into_iter()
            .filter(|event| matches!(event, FetcherEvent::Error(_)))
            .count();
        assert_eq!(errors, 2);
    }
}
