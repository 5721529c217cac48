mod cache;
mod client;
mod types;
mod validate;

pub use cache::IssueCache;
pub use client::{IssueClient, IssueLocation};
pub use types::{Issue, IssueId};
pub use validate::{is_mappable, mappable};

#[cfg(test)]
pub use types::test_issue;

use std::time::SystemTime;

use tracing::{debug, instrument};

use crate::error::SourceError;

/// Result of one refresh
#[derive(Debug)]
pub struct Refresh {
    pub issues: Vec<Issue>,
    pub changed: bool,
    pub fetched_at: SystemTime,
}

/// Issue client with a last-good cache
pub struct IssueService {
    client: IssueClient,
    cache: IssueCache,
}

impl IssueService {
    pub fn new(source: &str) -> Result<Self, SourceError> {
        Ok(Self {
            client: IssueClient::new(IssueLocation::parse(source))?,
            cache: IssueCache::new(),
        })
    }

    pub fn location(&self) -> &IssueLocation {
        self.client.location()
    }

    /// Fetch the list and record it as the last good one
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Refresh, SourceError> {
        let issues = self.client.fetch().await?;
        let changed = self.cache.store(issues.clone());
        let fetched_at = self.cache.fetched_at().unwrap_or_else(SystemTime::now);
        debug!(count = issues.len(), changed, "Refreshed issues");

        Ok(Refresh {
            issues,
            changed,
            fetched_at,
        })
    }

    /// Last good list, used when a refresh fails
    pub fn last_good(&self) -> Option<Vec<Issue>> {
        self.cache.get()
    }
}
