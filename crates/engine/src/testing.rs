//! Test double for code that depends on [`Storage`]
//!
//! `FakeStorage` runs every unit of work immediately against one shared set
//! of in-memory stores. There are no snapshots and no rollback: a failed
//! write keeps whatever it changed. Each call is recorded as an
//! [`Operation`] so tests can assert which facade entry points the code
//! under test used, and task fetches can be canned per query.
//!
//! ```text
//! let storage = FakeStorage::new();
//! storage.expect_task_fetch(TaskQuery::by_role("www"), tasks.clone());
//!
//! let seen = scheduler.tasks_for_role(&storage, "www")?;
//!
//! assert_eq!(seen, tasks);
//! assert_eq!(storage.operations(), vec![Operation::ConsistentRead]);
//! ```

use parking_lot::{Mutex, ReentrantMutex};
use schedstore_core::{
    AttributeStore, JobStore, MutableAttributeStore, MutableJobStore, MutableQuotaStore,
    MutableSchedulerStore, MutableStoreProvider, MutableTaskStore, MutableUpdateStore,
    QuotaStore, ScheduledTask, SchedulerStore, Storage, StoreProvider, TaskConfig, TaskQuery,
    TaskStore, UpdateStore,
};
use schedstore_storage::{
    MemAttributeStore, MemJobStore, MemQuotaStore, MemSchedulerStore, MemTaskStore,
    MemUpdateStore,
};
use std::cell::RefCell;
use std::collections::BTreeSet;

/// Facade entry point invoked on a [`FakeStorage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `consistent_read`
    ConsistentRead,
    /// `weakly_consistent_read`
    WeaklyConsistentRead,
    /// `write`
    Write,
}

/// Task store that answers canned queries before consulting its contents
#[derive(Debug, Default)]
pub struct StubTaskStore {
    tasks: MemTaskStore,
    canned: Vec<(TaskQuery, BTreeSet<ScheduledTask>)>,
}

impl StubTaskStore {
    /// Make fetches for `query` return exactly `tasks`
    ///
    /// A later expectation for an equal query replaces the earlier one.
    pub fn expect_fetch(&mut self, query: TaskQuery, tasks: BTreeSet<ScheduledTask>) {
        self.canned.retain(|(q, _)| *q != query);
        self.canned.push((query, tasks));
    }

    /// Drop every canned fetch
    pub fn clear_expectations(&mut self) {
        self.canned.clear();
    }
}

impl TaskStore for StubTaskStore {
    fn fetch_tasks(&self, query: &TaskQuery) -> BTreeSet<ScheduledTask> {
        match self.canned.iter().find(|(q, _)| q == query) {
            Some((_, tasks)) => tasks.clone(),
            None => self.tasks.fetch_tasks(query),
        }
    }
}

impl MutableTaskStore for StubTaskStore {
    fn save_tasks(&mut self, tasks: Vec<ScheduledTask>) {
        self.tasks.save_tasks(tasks);
    }

    fn delete_all_tasks(&mut self) {
        self.tasks.delete_all_tasks();
    }

    fn delete_tasks(&mut self, task_ids: &BTreeSet<String>) {
        self.tasks.delete_tasks(task_ids);
    }

    fn mutate_tasks(
        &mut self,
        query: &TaskQuery,
        mutator: &mut dyn FnMut(&mut ScheduledTask),
    ) -> BTreeSet<ScheduledTask> {
        self.tasks.mutate_tasks(query, mutator)
    }

    fn unsafe_modify_in_place(&mut self, task_id: &str, config: TaskConfig) -> bool {
        self.tasks.unsafe_modify_in_place(task_id, config)
    }
}

/// The stores behind a [`FakeStorage`]
#[derive(Debug, Default)]
pub struct FakeStores {
    /// Task store with canned fetches
    pub tasks: StubTaskStore,
    /// Quota store
    pub quotas: MemQuotaStore,
    /// Attribute store
    pub attributes: MemAttributeStore,
    /// Job store
    pub jobs: MemJobStore,
    /// Update store
    pub updates: MemUpdateStore,
    /// Scheduler store
    pub scheduler: MemSchedulerStore,
}

impl StoreProvider for FakeStores {
    fn task_store(&self) -> &dyn TaskStore {
        &self.tasks
    }

    fn quota_store(&self) -> &dyn QuotaStore {
        &self.quotas
    }

    fn attribute_store(&self) -> &dyn AttributeStore {
        &self.attributes
    }

    fn job_store(&self) -> &dyn JobStore {
        &self.jobs
    }

    fn update_store(&self) -> &dyn UpdateStore {
        &self.updates
    }

    fn scheduler_store(&self) -> &dyn SchedulerStore {
        &self.scheduler
    }
}

impl MutableStoreProvider for FakeStores {
    fn task_store(&mut self) -> &mut dyn MutableTaskStore {
        &mut self.tasks
    }

    fn unsafe_task_store(&mut self) -> &mut dyn MutableTaskStore {
        &mut self.tasks
    }

    fn quota_store(&mut self) -> &mut dyn MutableQuotaStore {
        &mut self.quotas
    }

    fn attribute_store(&mut self) -> &mut dyn MutableAttributeStore {
        &mut self.attributes
    }

    fn job_store(&mut self) -> &mut dyn MutableJobStore {
        &mut self.jobs
    }

    fn update_store(&mut self) -> &mut dyn MutableUpdateStore {
        &mut self.updates
    }

    fn scheduler_store(&mut self) -> &mut dyn MutableSchedulerStore {
        &mut self.scheduler
    }
}

/// [`Storage`] that runs work in place and records every call
///
/// Reads may nest inside reads. A write nested inside any other unit of work
/// on the same fake panics.
#[derive(Debug, Default)]
pub struct FakeStorage {
    stores: ReentrantMutex<RefCell<FakeStores>>,
    operations: Mutex<Vec<Operation>>,
}

impl FakeStorage {
    /// Empty fake
    pub fn new() -> Self {
        Self::default()
    }

    /// Make task fetches for `query` return exactly `tasks`
    ///
    /// Applies to `fetch_tasks`, `fetch_task_ids` and deferred fetches whose
    /// supplier produces an equal query, through every entry point.
    pub fn expect_task_fetch(
        &self,
        query: TaskQuery,
        tasks: impl IntoIterator<Item = ScheduledTask>,
    ) {
        let guard = self.stores.lock();
        guard
            .borrow_mut()
            .tasks
            .expect_fetch(query, tasks.into_iter().collect());
    }

    /// Direct access to the stores, bypassing the operation log
    pub fn with_stores<R>(&self, f: impl FnOnce(&mut FakeStores) -> R) -> R {
        let guard = self.stores.lock();
        let mut stores = guard.borrow_mut();
        f(&mut stores)
    }

    /// Every call made so far, in order
    pub fn operations(&self) -> Vec<Operation> {
        self.operations.lock().clone()
    }

    /// Number of calls to one entry point
    pub fn count(&self, operation: Operation) -> usize {
        self.operations
            .lock()
            .iter()
            .filter(|op| **op == operation)
            .count()
    }

    /// Forget recorded calls
    pub fn reset_operations(&self) {
        self.operations.lock().clear();
    }

    fn record(&self, operation: Operation) {
        self.operations.lock().push(operation);
    }

    fn read<T, E, F>(&self, operation: Operation, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreProvider) -> Result<T, E>,
    {
        self.record(operation);
        let guard = self.stores.lock();
        let stores = guard.borrow();
        let provider: &dyn StoreProvider = &*stores;
        work(provider)
    }
}

impl Storage for FakeStorage {
    fn consistent_read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreProvider) -> Result<T, E>,
    {
        self.read(Operation::ConsistentRead, work)
    }

    fn weakly_consistent_read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreProvider) -> Result<T, E>,
    {
        self.read(Operation::WeaklyConsistentRead, work)
    }

    fn write<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn MutableStoreProvider) -> Result<T, E>,
    {
        self.record(Operation::Write);
        let guard = self.stores.lock();
        let mut stores = guard.borrow_mut();
        let provider: &mut dyn MutableStoreProvider = &mut *stores;
        work(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schedstore_core::{JobKey, ResourceAggregate};

    fn task(id: &str, role: &str) -> ScheduledTask {
        ScheduledTask::new(
            id,
            0,
            TaskConfig::new(
                JobKey::new(role, "prod", "web"),
                ResourceAggregate::new(500, 256, 256),
            ),
        )
    }

    #[test]
    fn test_records_operations_in_order() {
        let storage = FakeStorage::new();
        storage.consistent_read(|_| Ok::<_, ()>(())).unwrap();
        storage.write(|_| Ok::<_, ()>(())).unwrap();
        storage.weakly_consistent_read(|_| Ok::<_, ()>(())).unwrap();

        assert_eq!(
            storage.operations(),
            vec![
                Operation::ConsistentRead,
                Operation::Write,
                Operation::WeaklyConsistentRead
            ]
        );
        assert_eq!(storage.count(Operation::Write), 1);

        storage.reset_operations();
        assert!(storage.operations().is_empty());
    }

    #[test]
    fn test_canned_fetch_overrides_contents() {
        let storage = FakeStorage::new();
        storage
            .write(|p| {
                p.task_store().save_tasks(vec![task("stored", "www")]);
                Ok::<_, ()>(())
            })
            .unwrap();

        let canned = task("canned", "www");
        storage.expect_task_fetch(TaskQuery::by_role("www"), vec![canned.clone()]);

        let (by_role, deferred, unscoped) = storage
            .consistent_read(|p| {
                Ok::<_, ()>((
                    p.task_store().fetch_tasks(&TaskQuery::by_role("www")),
                    p.task_store()
                        .fetch_tasks_deferred(&|| TaskQuery::by_role("www")),
                    p.task_store().fetch_tasks(&TaskQuery::unscoped()),
                ))
            })
            .unwrap();

        assert_eq!(by_role, BTreeSet::from([canned.clone()]));
        assert_eq!(deferred, BTreeSet::from([canned]));
        assert_eq!(unscoped.len(), 1);
        assert!(unscoped.iter().all(|t| t.task_id == "stored"));
    }

    #[test]
    fn test_failed_write_is_not_rolled_back() {
        let storage = FakeStorage::new();
        let result = storage.write(|p| {
            p.scheduler_store().save_framework_id("fw".into());
            Err::<(), _>("nope")
        });

        assert_eq!(result, Err("nope"));
        let id = storage.with_stores(|s| s.scheduler.fetch_framework_id());
        assert_eq!(id.as_deref(), Some("fw"));
    }

    #[test]
    fn test_reads_may_nest() {
        let storage = FakeStorage::new();
        let depth = storage
            .consistent_read(|_| storage.weakly_consistent_read(|_| Ok::<_, ()>(2)))
            .unwrap();
        assert_eq!(depth, 2);
    }
}
