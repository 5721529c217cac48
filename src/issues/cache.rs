use std::time::SystemTime;

use parking_lot::RwLock;
use tracing::debug;

use super::types::Issue;

/// Last successfully fetched list with its timestamp
struct CachedIssues {
    issues: Vec<Issue>,
    fetched_at: SystemTime,
}

/// Keeps the last good issue list
pub struct IssueCache {
    latest: RwLock<Option<CachedIssues>>,
}

impl IssueCache {
    pub fn new() -> Self {
        Self {
            latest: RwLock::new(None),
        }
    }

    /// Last good list, if any fetch has succeeded
    pub fn get(&self) -> Option<Vec<Issue>> {
        self.latest.read().as_ref().map(|cached| cached.issues.clone())
    }

    /// When the cached list was fetched
    pub fn fetched_at(&self) -> Option<SystemTime> {
        self.latest.read().as_ref().map(|cached| cached.fetched_at)
    }

    /// Store a freshly fetched list. Returns true if it differs from the cached one.
    pub fn store(&self, issues: Vec<Issue>) -> bool {
        let mut latest = self.latest.write();
        let changed = latest
            .as_ref()
            .map_or(true, |cached| cached.issues != issues);

        debug!(count = issues.len(), changed, "Caching issues");
        *latest = Some(CachedIssues {
            issues,
            fetched_at: SystemTime::now(),
        });
        changed
    }
}

impl Default for IssueCache {
    fn default() -> Self {
        Self::new()
    }
}
