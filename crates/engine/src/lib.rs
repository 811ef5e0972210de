//! Storage engine for schedstore
//!
//! This crate turns the in-memory domain stores into the transactional
//! storage facade:
//! - TransactionalStorage: production `Storage` with snapshot reads,
//!   serialized all-or-nothing writes and a weak-read replica
//! - WriteCoordinator: version allocation and activity counters
//! - StorageConfig: `schedstore.toml` settings
//! - StorageBackup: point-in-time export and restore
//! - FakeStorage (feature `testing`): in-place test double with an operation log

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coordinator;
pub mod storage;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use coordinator::{StorageMetrics, WriteCoordinator};
pub use storage::{
    StorageBackup, StorageConfig, TransactionalStorage, BACKUP_FORMAT_VERSION, CONFIG_FILE_NAME,
};
#[cfg(any(test, feature = "testing"))]
pub use testing::{FakeStorage, FakeStores, Operation, StubTaskStore};
