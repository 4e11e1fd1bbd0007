//! In-memory status cache for registry probes.

use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe map from lookup URL to the last observed HTTP status.
///
/// Built once per scan run and shared by every worker. Entries never expire
/// within a run. Reads and inserts are separate operations, so two workers
/// racing on the same uncached URL may both probe it.
#[derive(Debug, Clone, Default)]
pub struct RegistryCache {
    statuses: Arc<DashMap<String, u16>>,
}

impl RegistryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached status for a lookup URL.
    pub fn get(&self, lookup_url: &str) -> Option<u16> {
        self.statuses.get(lookup_url).map(|entry| *entry)
    }

    /// Store a probe status.
    pub fn set(&self, lookup_url: &str, status: u16) {
        self.statuses.insert(lookup_url.to_string(), status);
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}
