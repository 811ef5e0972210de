//! Write coordinator for the storage facade
//!
//! - Single monotonic version counter for the whole store
//! - Incremented once per committed write that changed something
//! - Read and write counters for metrics

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Version allocation and lifecycle counters
///
/// # Memory Ordering
///
/// The counters use Relaxed ordering. They are observational only and do not
/// synchronize other memory. The version is only advanced while the writer
/// lock is held; readers learn the committed version from the snapshot they
/// hold, not from this counter.
pub struct WriteCoordinator {
    version: AtomicU64,
    consistent_reads: AtomicU64,
    weak_reads: AtomicU64,
    writes_started: AtomicU64,
    writes_committed: AtomicU64,
    writes_rolled_back: AtomicU64,
    empty_writes: AtomicU64,
}

impl WriteCoordinator {
    /// Create a coordinator starting at `initial_version`
    pub fn new(initial_version: u64) -> Self {
        Self {
            version: AtomicU64::new(initial_version),
            consistent_reads: AtomicU64::new(0),
            weak_reads: AtomicU64::new(0),
            writes_started: AtomicU64::new(0),
            writes_committed: AtomicU64::new(0),
            writes_rolled_back: AtomicU64::new(0),
            empty_writes: AtomicU64::new(0),
        }
    }

    /// Allocate the version of the next commit
    pub fn allocate_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Latest allocated version
    pub fn current_version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Count a consistent read
    pub fn record_consistent_read(&self) {
        self.consistent_reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a weakly consistent read
    pub fn record_weak_read(&self) {
        self.weak_reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a write entering the writer lock
    pub fn record_write_start(&self) {
        self.writes_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a write that published a new version
    pub fn record_commit(&self, version: u64) {
        self.writes_committed.fetch_add(1, Ordering::Relaxed);
        debug!(target: "schedstore::write", version, "Write committed");
    }

    /// Count a write that succeeded without touching any store
    pub fn record_empty_write(&self) {
        self.empty_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a write whose changes were discarded
    pub fn record_rollback(&self) {
        self.writes_rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of the counters
    pub fn metrics(&self) -> StorageMetrics {
        StorageMetrics {
            version: self.current_version(),
            consistent_reads: self.consistent_reads.load(Ordering::Relaxed),
            weak_reads: self.weak_reads.load(Ordering::Relaxed),
            writes_started: self.writes_started.load(Ordering::Relaxed),
            writes_committed: self.writes_committed.load(Ordering::Relaxed),
            writes_rolled_back: self.writes_rolled_back.load(Ordering::Relaxed),
            empty_writes: self.empty_writes.load(Ordering::Relaxed),
        }
    }
}

/// Storage activity counters
#[derive(Debug, Clone, PartialEq)]
pub struct StorageMetrics {
    /// Latest committed version
    pub version: u64,
    /// Consistent reads run
    pub consistent_reads: u64,
    /// Weakly consistent reads run
    pub weak_reads: u64,
    /// Writes that entered the writer lock
    pub writes_started: u64,
    /// Writes that published a new version
    pub writes_committed: u64,
    /// Writes discarded by an error or a panic
    pub writes_rolled_back: u64,
    /// Successful writes that touched no store
    pub empty_writes: u64,
}

impl StorageMetrics {
    /// Writes that finished, one way or another
    pub fn writes_completed(&self) -> u64 {
        self.writes_committed + self.writes_rolled_back + self.empty_writes
    }

    /// Rolled back writes over started writes
    pub fn rollback_rate(&self) -> f64 {
        if self.writes_started > 0 {
            self.writes_rolled_back as f64 / self.writes_started as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinator_new() {
        let coordinator = WriteCoordinator::new(0);
        assert_eq!(coordinator.current_version(), 0);

        let metrics = coordinator.metrics();
        assert_eq!(metrics.writes_started, 0);
        assert_eq!(metrics.writes_committed, 0);
        assert_eq!(metrics.writes_rolled_back, 0);
        assert_eq!(metrics.rollback_rate(), 0.0);
    }

    #[test]
    fn test_version_monotonic() {
        let coordinator = WriteCoordinator::new(100);

        let v1 = coordinator.allocate_version();
        let v2 = coordinator.allocate_version();
        let v3 = coordinator.allocate_version();

        assert_eq!((v1, v2, v3), (101, 102, 103));
        assert_eq!(coordinator.current_version(), 103);
    }

    #[test]
    fn test_metrics_helpers() {
        let coordinator = WriteCoordinator::new(0);

        for _ in 0..4 {
            coordinator.record_write_start();
        }
        coordinator.record_commit(coordinator.allocate_version());
        coordinator.record_commit(coordinator.allocate_version());
        coordinator.record_empty_write();
        coordinator.record_rollback();
        coordinator.record_consistent_read();
        coordinator.record_weak_read();
        coordinator.record_weak_read();

        let metrics = coordinator.metrics();
        assert_eq!(metrics.version, 2);
        assert_eq!(metrics.writes_completed(), 4);
        assert_eq!(metrics.rollback_rate(), 0.25);
        assert_eq!(metrics.consistent_reads, 1);
        assert_eq!(metrics.weak_reads, 2);
    }

    #[test]
    fn test_concurrent_version_allocation() {
        use std::collections::BTreeSet;
        use std::sync::Arc;
        use std::thread;

        let coordinator = Arc::new(WriteCoordinator::new(0));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = Arc::clone(&coordinator);
                thread::spawn(move || (0..100).map(|_| c.allocate_version()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = BTreeSet::new();
        for handle in handles {
            for v in handle.join().unwrap() {
                assert!(seen.insert(v), "version {} allocated twice", v);
            }
        }
        assert_eq!(seen.len(), 400);
        assert_eq!(coordinator.current_version(), 400);
    }
}
