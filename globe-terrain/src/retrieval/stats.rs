//! Retrieval counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Lock-free counters describing retrieval activity.
#[derive(Debug, Default)]
pub struct RetrievalStats {
    issued: AtomicU64,
    deduplicated: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl RetrievalStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_issued(&self) {
        self.issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_deduplicated(&self) {
        self.deduplicated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the current counter values.
    pub fn snapshot(&self) -> RetrievalStatsSnapshot {
        RetrievalStatsSnapshot {
            issued: self.issued.load(Ordering::Relaxed),
            deduplicated: self.deduplicated.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`RetrievalStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RetrievalStatsSnapshot {
    /// Provider requests started.
    pub issued: u64,
    /// Requests that joined a retrieval already in flight.
    pub deduplicated: u64,
    /// Retrievals that produced a cached tile.
    pub completed: u64,
    /// Retrievals that failed to fetch or decode.
    pub failed: u64,
}

impl RetrievalStatsSnapshot {
    /// Retrievals issued but not yet finished.
    pub fn pending(&self) -> u64 {
        self.issued.saturating_sub(self.completed + self.failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = RetrievalStats::new();
        stats.record_issued();
        stats.record_issued();
        stats.record_issued();
        stats.record_deduplicated();
        stats.record_completed();
        stats.record_failed();

        let snapshot = stats.snapshot();
        assert_eq!(
            snapshot,
            RetrievalStatsSnapshot {
                issued: 3,
                deduplicated: 1,
                completed: 1,
                failed: 1,
            }
        );
        assert_eq!(snapshot.pending(), 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_string(&RetrievalStatsSnapshot::default()).unwrap();
        assert_eq!(json, r#"{"issued":0,"deduplicated":0,"completed":0,"failed":0}"#);
    }
}
