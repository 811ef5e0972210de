//! In-memory domain stores for schedstore
//!
//! This crate implements the six domain stores and the snapshot unit built
//! from them:
//! - MemTaskStore: tasks keyed by id, indexed by job key and host
//! - MemQuotaStore, MemAttributeStore, MemJobStore, MemUpdateStore,
//!   MemSchedulerStore: ordered-map stores for the other domains
//! - StoreState: copy-on-write bundle of every store at one version
//! - StateWriter: mutable provider over a pending StoreState
//! - StoreImage: serializable form of a StoreState

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attribute;
pub mod image;
pub mod job;
pub mod quota;
pub mod scheduler;
pub mod state;
pub mod task;
pub mod update;

pub use attribute::MemAttributeStore;
pub use image::StoreImage;
pub use job::MemJobStore;
pub use quota::MemQuotaStore;
pub use scheduler::MemSchedulerStore;
pub use state::{Domain, DomainSet, StateWriter, StoreState};
pub use task::MemTaskStore;
pub use update::MemUpdateStore;
