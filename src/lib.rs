//! schedstore - transactional storage for a cluster scheduler
//!
//! One facade, [`Storage`], fronts six domain stores (tasks, quotas, host
//! attributes, jobs, job updates, scheduler metadata). Callers submit units
//! of work as closures:
//!
//! ```text
//! use schedstore::{Storage, TaskQuery, TransactionalStorage};
//!
//! let storage = TransactionalStorage::new();
//!
//! storage.write(|stores| {
//!     stores.task_store().save_tasks(tasks);
//!     stores.quota_store().save_quota("www", quota);
//!     Ok::<_, MyError>(())
//! })?;
//!
//! let running = storage.consistent_read(|stores| {
//!     Ok::<_, MyError>(stores.task_store().fetch_tasks(&TaskQuery::active()))
//! })?;
//! ```
//!
//! # Architecture
//!
//! - `schedstore-core`: records, `TaskQuery`, the store and facade traits
//! - `schedstore-storage`: in-memory stores and the copy-on-write `StoreState`
//! - `schedstore-engine`: `TransactionalStorage`, config, backups, and the
//!   `FakeStorage` test double (feature `testing`)

pub use schedstore_core::{
    Attribute, AttributeStore, HostAttributes, JobConfiguration, JobKey, JobStore,
    JobUpdateConfiguration, MaintenanceMode, MutableAttributeStore, MutableJobStore,
    MutableQuotaStore, MutableSchedulerStore, MutableStoreProvider, MutableTaskStore,
    MutableUpdateStore, QuotaStore, ResourceAggregate, ScheduleStatus, ScheduledTask,
    SchedulerStore, Storage, StorageError, StorageResult, StoreProvider, TaskConfig, TaskEvent,
    TaskQuery, TaskStore, TaskUpdateConfiguration, UpdateStore,
};
pub use schedstore_engine::{
    StorageBackup, StorageConfig, StorageMetrics, TransactionalStorage, BACKUP_FORMAT_VERSION,
    CONFIG_FILE_NAME,
};
#[cfg(feature = "testing")]
pub use schedstore_engine::{FakeStorage, FakeStores, Operation, StubTaskStore};

/// In-memory store implementations, for callers assembling their own facade
pub mod stores {
    pub use schedstore_storage::{
        Domain, DomainSet, MemAttributeStore, MemJobStore, MemQuotaStore, MemSchedulerStore,
        MemTaskStore, MemUpdateStore, StateWriter, StoreImage, StoreState,
    };
}
