//! Core traits for the storage facade and its domain stores
//!
//! Every domain store is split into two traits: a read capability
//! (`TaskStore`) and a mutable capability (`MutableTaskStore`) that extends
//! it. Read providers only ever hand out the read traits, so a unit of work
//! submitted for reading cannot name a mutating method.
//!
//! Implementations can be swapped freely: the facade and the providers only
//! depend on the traits in this module.

use crate::host::HostAttributes;
use crate::job::{JobConfiguration, JobUpdateConfiguration};
use crate::query::TaskQuery;
use crate::task::{ScheduledTask, TaskConfig};
use crate::types::{JobKey, MaintenanceMode, ResourceAggregate};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// Task Store
// ============================================================================

/// Read access to scheduled tasks
pub trait TaskStore {
    /// Fetch every task matching `query`
    ///
    /// A query that matches nothing yields an empty set, never an error.
    fn fetch_tasks(&self, query: &TaskQuery) -> BTreeSet<ScheduledTask>;

    /// Fetch tasks for a query produced on demand
    ///
    /// `supplier` is evaluated exactly once, at call time.
    fn fetch_tasks_deferred(&self, supplier: &dyn Fn() -> TaskQuery) -> BTreeSet<ScheduledTask> {
        self.fetch_tasks(&supplier())
    }

    /// Ids of every task matching `query`
    fn fetch_task_ids(&self, query: &TaskQuery) -> BTreeSet<String> {
        self.fetch_tasks(query)
            .into_iter()
            .map(|t| t.task_id)
            .collect()
    }
}

/// Write access to scheduled tasks
pub trait MutableTaskStore: TaskStore {
    /// Insert or replace tasks, keyed by task id
    fn save_tasks(&mut self, tasks: Vec<ScheduledTask>);

    /// Remove every task
    fn delete_all_tasks(&mut self);

    /// Remove the tasks with the given ids; unknown ids are ignored
    fn delete_tasks(&mut self, task_ids: &BTreeSet<String>);

    /// Apply `mutator` to every task matching `query` and store the results
    ///
    /// Returns the mutated tasks. A mutator cannot re-key a task: the stored
    /// record keeps its original id.
    fn mutate_tasks(
        &mut self,
        query: &TaskQuery,
        mutator: &mut dyn FnMut(&mut ScheduledTask),
    ) -> BTreeSet<ScheduledTask>;

    /// Replace the config of one task without touching anything else
    ///
    /// Returns false if no task has that id.
    fn unsafe_modify_in_place(&mut self, task_id: &str, config: TaskConfig) -> bool;
}

// ============================================================================
// Quota Store
// ============================================================================

/// Read access to per-role quotas
pub trait QuotaStore {
    /// Quota of `role`, if one is set
    fn fetch_quota(&self, role: &str) -> Option<ResourceAggregate>;

    /// Every quota, keyed by role
    fn fetch_quotas(&self) -> BTreeMap<String, ResourceAggregate>;
}

/// Write access to per-role quotas
pub trait MutableQuotaStore: QuotaStore {
    /// Set the quota of `role`
    fn save_quota(&mut self, role: &str, quota: ResourceAggregate);

    /// Clear the quota of `role`
    fn remove_quota(&mut self, role: &str);

    /// Clear every quota
    fn delete_quotas(&mut self);
}

// ============================================================================
// Attribute Store
// ============================================================================

/// Read access to host attributes
pub trait AttributeStore {
    /// Attributes of `host`, if known
    fn host_attributes(&self, host: &str) -> Option<HostAttributes>;

    /// Attributes of every known host
    fn all_host_attributes(&self) -> BTreeSet<HostAttributes>;
}

/// Write access to host attributes
pub trait MutableAttributeStore: AttributeStore {
    /// Insert or replace the attributes of a host
    ///
    /// Hosts re-register without maintenance state, so an incoming record
    /// with `MaintenanceMode::None` keeps the mode already stored for that
    /// host.
    fn save_host_attributes(&mut self, attributes: HostAttributes);

    /// Set the maintenance mode of a known host
    ///
    /// Returns false if the host is unknown.
    fn set_maintenance_mode(&mut self, host: &str, mode: MaintenanceMode) -> bool;

    /// Remove every host
    fn delete_host_attributes(&mut self);
}

// ============================================================================
// Job Store
// ============================================================================

/// Read access to accepted jobs, grouped by the manager that owns them
pub trait JobStore {
    /// Jobs owned by `manager_id`
    fn fetch_jobs(&self, manager_id: &str) -> BTreeSet<JobConfiguration>;

    /// One job owned by `manager_id`
    fn fetch_job(&self, manager_id: &str, key: &JobKey) -> Option<JobConfiguration>;

    /// Managers owning at least one job
    fn manager_ids(&self) -> BTreeSet<String>;
}

/// Write access to accepted jobs
pub trait MutableJobStore: JobStore {
    /// Store `job` under `manager_id`
    ///
    /// A job key belongs to at most one manager; saving it under a new
    /// manager moves it.
    fn save_accepted_job(&mut self, manager_id: &str, job: JobConfiguration);

    /// Remove a job from whichever manager owns it
    fn remove_job(&mut self, key: &JobKey);

    /// Remove every job
    fn delete_jobs(&mut self);
}

// ============================================================================
// Update Store
// ============================================================================

/// Read access to in-progress job updates
pub trait UpdateStore {
    /// Update in progress for `key`, if any
    fn fetch_job_update_config(&self, key: &JobKey) -> Option<JobUpdateConfiguration>;

    /// Updates in progress for jobs of `role`
    fn fetch_update_configs(&self, role: &str) -> BTreeSet<JobUpdateConfiguration>;

    /// Roles with at least one update in progress
    fn fetch_updating_roles(&self) -> BTreeSet<String>;
}

/// Write access to in-progress job updates
pub trait MutableUpdateStore: UpdateStore {
    /// Insert or replace the update for its job
    fn save_job_update_config(&mut self, config: JobUpdateConfiguration);

    /// Remove the update for `key`
    fn remove_shard_update_configs(&mut self, key: &JobKey);

    /// Remove every update
    fn delete_shard_update_configs(&mut self);
}

// ============================================================================
// Scheduler Store
// ============================================================================

/// Read access to scheduler-wide metadata
pub trait SchedulerStore {
    /// Framework id registered with the cluster manager
    fn fetch_framework_id(&self) -> Option<String>;
}

/// Write access to scheduler-wide metadata
pub trait MutableSchedulerStore: SchedulerStore {
    /// Record the framework id
    fn save_framework_id(&mut self, framework_id: String);
}

// ============================================================================
// Providers
// ============================================================================

/// Read-only view over every domain store
///
/// Handed to read units of work. Accessors are plain lookups: they may be
/// called any number of times and always return the same store.
pub trait StoreProvider {
    /// Task store
    fn task_store(&self) -> &dyn TaskStore;
    /// Quota store
    fn quota_store(&self) -> &dyn QuotaStore;
    /// Attribute store
    fn attribute_store(&self) -> &dyn AttributeStore;
    /// Job store
    fn job_store(&self) -> &dyn JobStore;
    /// Update store
    fn update_store(&self) -> &dyn UpdateStore;
    /// Scheduler store
    fn scheduler_store(&self) -> &dyn SchedulerStore;
}

/// Read-write view over every domain store
///
/// Only obtainable inside [`Storage::write`].
pub trait MutableStoreProvider {
    /// Task store
    fn task_store(&mut self) -> &mut dyn MutableTaskStore;

    /// Task store, bypassing the facade's normal task path
    ///
    /// Returns the same store as [`MutableStoreProvider::task_store`]. Callers
    /// take responsibility for any cross-store invariants themselves and
    /// should say so at the call site.
    fn unsafe_task_store(&mut self) -> &mut dyn MutableTaskStore;

    /// Quota store
    fn quota_store(&mut self) -> &mut dyn MutableQuotaStore;
    /// Attribute store
    fn attribute_store(&mut self) -> &mut dyn MutableAttributeStore;
    /// Job store
    fn job_store(&mut self) -> &mut dyn MutableJobStore;
    /// Update store
    fn update_store(&mut self) -> &mut dyn MutableUpdateStore;
    /// Scheduler store
    fn scheduler_store(&mut self) -> &mut dyn MutableSchedulerStore;
}

// ============================================================================
// Storage Facade
// ============================================================================

/// Single entry point to scheduler storage
///
/// Callers submit units of work: closures that receive a provider, run once,
/// and return `Result<T, E>` with a caller-chosen error type. The facade never
/// inspects or wraps `E`.
///
/// Thread safety: implementations must be safe to share between threads.
/// Writes are serialized; reads never wait for other reads.
pub trait Storage: Send + Sync {
    /// Run `work` against one consistent snapshot of every store
    ///
    /// The snapshot reflects every write committed before the call and none
    /// committed after it started.
    fn consistent_read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreProvider) -> Result<T, E>;

    /// Run `work` against a possibly stale snapshot
    ///
    /// Never waits for an in-flight write.
    fn weakly_consistent_read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreProvider) -> Result<T, E>;

    /// Run `work` as one atomic transaction across every store
    ///
    /// If `work` returns `Err`, none of its mutations become visible and the
    /// error is returned unchanged.
    fn write<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn MutableStoreProvider) -> Result<T, E>;
}
