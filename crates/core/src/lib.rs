//! Core types and traits for schedstore
//!
//! This crate defines the foundational types used throughout the system:
//! - Records: ScheduledTask, HostAttributes, JobConfiguration, JobUpdateConfiguration
//! - Value types: JobKey, ScheduleStatus, ResourceAggregate, MaintenanceMode
//! - TaskQuery: filter descriptor for task fetches
//! - Traits: the Storage facade, StoreProvider / MutableStoreProvider and the
//!   read / mutable capability traits of every domain store
//! - StorageError: facade infrastructure errors

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod host;
pub mod job;
pub mod query;
pub mod task;
pub mod traits;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use host::{Attribute, HostAttributes};
pub use job::{JobConfiguration, JobUpdateConfiguration, TaskUpdateConfiguration};
pub use query::TaskQuery;
pub use task::{ScheduledTask, TaskConfig, TaskEvent};
pub use traits::{
    AttributeStore, JobStore, MutableAttributeStore, MutableJobStore, MutableQuotaStore,
    MutableSchedulerStore, MutableStoreProvider, MutableTaskStore, MutableUpdateStore, QuotaStore,
    SchedulerStore, Storage, StoreProvider, TaskStore, UpdateStore,
};
pub use types::{JobKey, MaintenanceMode, ResourceAggregate, ScheduleStatus};
