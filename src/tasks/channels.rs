use std::time::SystemTime;

use tokio::sync::mpsc;

use crate::issues::Issue;

/// Commands from TUI/input to the fetcher task
#[derive(Debug)]
pub enum FetcherCommand {
    /// Fetch the issue list now
    Refresh,
    /// Shutdown the fetcher
    Quit,
}

/// Messages from the fetcher to the main loop
#[derive(Debug)]
pub enum FetcherEvent {
    /// A fetch started
    Fetching,
    /// A new or changed issue list
    Loaded {
        issues: Vec<Issue>,
        fetched_at: SystemTime,
    },
    /// Fetch succeeded but nothing changed
    Unchanged { fetched_at: SystemTime },
    /// Fetch failed; the last good list stays in place
    Error(String),
    /// Fetcher is shutting down
    Shutdown,
}

/// Channel bundle for communication
pub struct Channels {
    /// Commands to the fetcher
    pub cmd_tx: mpsc::Sender<FetcherCommand>,
    pub cmd_rx: mpsc::Receiver<FetcherCommand>,

    /// Events from the fetcher
    pub event_tx: mpsc::Sender<FetcherEvent>,
    pub event_rx: mpsc::Receiver<FetcherEvent>,
}

impl Channels {
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::channel(8);

        Self {
            cmd_tx,
            cmd_rx,
            event_tx,
            event_rx,
        }
    }

    /// Split into sender/receiver pairs
    pub fn split(
        self,
    ) -> (
        mpsc::Sender<FetcherCommand>,
        mpsc::Receiver<FetcherCommand>,
        mpsc::Sender<FetcherEvent>,
        mpsc::Receiver<FetcherEvent>,
    ) {
        (self.cmd_tx, self.cmd_rx, self.event_tx, self.event_rx)
    }
}

impl Default for Channels {
    fn default() -> Self {
        Self::new()
    }
}
