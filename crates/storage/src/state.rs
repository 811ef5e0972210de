//! Copy-on-write bundle of every domain store
//!
//! `StoreState` holds one `Arc` per domain plus the version it was committed
//! at. Cloning it is O(1), so an `Arc<StoreState>` doubles as an immutable
//! snapshot for readers.
//!
//! A write works on a private clone through a [`StateWriter`]. The first
//! mutable access to a domain clones that domain only (`Arc::make_mut`);
//! domains the write never touches stay shared with the committed state.
//!
//! # Known Limitations
//!
//! - **Memory**: O(domain_size) per touched domain per write
//! - **Time**: the first mutable access to a domain copies it
//!
//! Scheduler state is small and writes are serialized, so one copy per
//! touched domain per write is acceptable.

use crate::attribute::MemAttributeStore;
use crate::image::StoreImage;
use crate::job::MemJobStore;
use crate::quota::MemQuotaStore;
use crate::scheduler::MemSchedulerStore;
use crate::task::MemTaskStore;
use crate::update::MemUpdateStore;
use schedstore_core::{
    AttributeStore, JobConfiguration, JobStore, JobUpdateConfiguration, MutableAttributeStore,
    MutableJobStore, MutableQuotaStore, MutableSchedulerStore, MutableStoreProvider,
    MutableTaskStore, MutableUpdateStore, QuotaStore, SchedulerStore, StoreProvider, TaskQuery,
    TaskStore, UpdateStore,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Domains
// ============================================================================

/// The six data domains
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Domain {
    /// Scheduled tasks
    Tasks,
    /// Per-role quotas
    Quotas,
    /// Host attributes
    Attributes,
    /// Accepted jobs
    Jobs,
    /// In-progress job updates
    Updates,
    /// Scheduler metadata
    Scheduler,
}

impl Domain {
    /// Every domain, in declaration order
    pub const ALL: [Domain; 6] = [
        Domain::Tasks,
        Domain::Quotas,
        Domain::Attributes,
        Domain::Jobs,
        Domain::Updates,
        Domain::Scheduler,
    ];

    /// Lowercase name used in logs
    pub fn name(self) -> &'static str {
        match self {
            Domain::Tasks => "tasks",
            Domain::Quotas => "quotas",
            Domain::Attributes => "attributes",
            Domain::Jobs => "jobs",
            Domain::Updates => "updates",
            Domain::Scheduler => "scheduler",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Small set of domains
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DomainSet(u8);

impl DomainSet {
    /// Empty set
    pub const fn empty() -> Self {
        DomainSet(0)
    }

    /// Add a domain
    pub fn insert(&mut self, domain: Domain) {
        self.0 |= domain.bit();
    }

    /// Membership test
    pub fn contains(&self, domain: Domain) -> bool {
        self.0 & domain.bit() != 0
    }

    /// True if no domain is present
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of domains present
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Domains present, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = Domain> {
        let set = *self;
        Domain::ALL.into_iter().filter(move |d| set.contains(*d))
    }
}

impl FromIterator<Domain> for DomainSet {
    fn from_iter<I: IntoIterator<Item = Domain>>(iter: I) -> Self {
        let mut set = DomainSet::empty();
        for domain in iter {
            set.insert(domain);
        }
        set
    }
}

impl fmt::Display for DomainSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Domain::name).collect();
        write!(f, "[{}]", names.join(","))
    }
}

// ============================================================================
// StoreState
// ============================================================================

/// Every domain store at one committed version
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    version: u64,
    tasks: Arc<MemTaskStore>,
    quotas: Arc<MemQuotaStore>,
    attributes: Arc<MemAttributeStore>,
    jobs: Arc<MemJobStore>,
    updates: Arc<MemUpdateStore>,
    scheduler: Arc<MemSchedulerStore>,
}

impl StoreState {
    /// Empty state at version 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Version this state was committed at
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Stamp the version a pending state will be committed at
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Start a write against this state
    pub fn writer(&mut self) -> StateWriter<'_> {
        StateWriter::new(self)
    }

    /// Number of stored tasks
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// True if `other` shares the given domain's storage with `self`
    ///
    /// Used to check that untouched domains are not copied by a write.
    pub fn shares_domain(&self, other: &StoreState, domain: Domain) -> bool {
        match domain {
            Domain::Tasks => Arc::ptr_eq(&self.tasks, &other.tasks),
            Domain::Quotas => Arc::ptr_eq(&self.quotas, &other.quotas),
            Domain::Attributes => Arc::ptr_eq(&self.attributes, &other.attributes),
            Domain::Jobs => Arc::ptr_eq(&self.jobs, &other.jobs),
            Domain::Updates => Arc::ptr_eq(&self.updates, &other.updates),
            Domain::Scheduler => Arc::ptr_eq(&self.scheduler, &other.scheduler),
        }
    }

    /// Serializable copy of every record
    pub fn to_image(&self) -> StoreImage {
        let jobs: BTreeMap<String, Vec<JobConfiguration>> = self
            .jobs
            .manager_ids()
            .into_iter()
            .map(|manager| {
                let jobs: Vec<JobConfiguration> =
                    self.jobs.fetch_jobs(&manager).into_iter().collect();
                (manager, jobs)
            })
            .collect();

        let updates: Vec<JobUpdateConfiguration> = self
            .updates
            .fetch_updating_roles()
            .into_iter()
            .flat_map(|role| self.updates.fetch_update_configs(&role))
            .collect();

        StoreImage {
            tasks: self
                .tasks
                .fetch_tasks(&TaskQuery::unscoped())
                .into_iter()
                .collect(),
            quotas: self.quotas.fetch_quotas(),
            host_attributes: self.attributes.all_host_attributes().into_iter().collect(),
            jobs,
            updates,
            framework_id: self.scheduler.fetch_framework_id(),
        }
    }

    /// Rebuild a state from an image, at version 0
    pub fn from_image(image: StoreImage) -> Self {
        let mut state = StoreState::new();
        {
            let mut writer = state.writer();
            writer.task_store().save_tasks(image.tasks);
            for (role, quota) in &image.quotas {
                writer.quota_store().save_quota(role, *quota);
            }
            for host in image.host_attributes {
                writer.attribute_store().save_host_attributes(host);
            }
            for (manager, jobs) in image.jobs {
                for job in jobs {
                    writer.job_store().save_accepted_job(&manager, job);
                }
            }
            for update in image.updates {
                writer.update_store().save_job_update_config(update);
            }
            if let Some(id) = image.framework_id {
                writer.scheduler_store().save_framework_id(id);
            }
        }
        state
    }
}

impl StoreProvider for StoreState {
    fn task_store(&self) -> &dyn TaskStore {
        &*self.tasks
    }

    fn quota_store(&self) -> &dyn QuotaStore {
        &*self.quotas
    }

    fn attribute_store(&self) -> &dyn AttributeStore {
        &*self.attributes
    }

    fn job_store(&self) -> &dyn JobStore {
        &*self.jobs
    }

    fn update_store(&self) -> &dyn UpdateStore {
        &*self.updates
    }

    fn scheduler_store(&self) -> &dyn SchedulerStore {
        &*self.scheduler
    }
}

// ============================================================================
// StateWriter
// ============================================================================

/// Mutable provider over a pending state
///
/// Records which domains were handed out mutably so the committer knows what
/// the write touched.
pub struct StateWriter<'a> {
    state: &'a mut StoreState,
    touched: DomainSet,
    unsafe_task_accesses: u32,
}

impl<'a> StateWriter<'a> {
    /// Wrap a pending state
    pub fn new(state: &'a mut StoreState) -> Self {
        Self {
            state,
            touched: DomainSet::empty(),
            unsafe_task_accesses: 0,
        }
    }

    /// Domains handed out mutably so far
    pub fn touched(&self) -> DomainSet {
        self.touched
    }

    /// Number of `unsafe_task_store` calls so far
    pub fn unsafe_task_accesses(&self) -> u32 {
        self.unsafe_task_accesses
    }
}

impl MutableStoreProvider for StateWriter<'_> {
    fn task_store(&mut self) -> &mut dyn MutableTaskStore {
        self.touched.insert(Domain::Tasks);
        let store: &mut MemTaskStore = Arc::make_mut(&mut self.state.tasks);
        store
    }

    fn unsafe_task_store(&mut self) -> &mut dyn MutableTaskStore {
        self.unsafe_task_accesses += 1;
        debug!(target: "schedstore::storage", "Unsafe task store access");
        self.task_store()
    }

    fn quota_store(&mut self) -> &mut dyn MutableQuotaStore {
        self.touched.insert(Domain::Quotas);
        let store: &mut MemQuotaStore = Arc::make_mut(&mut self.state.quotas);
        store
    }

    fn attribute_store(&mut self) -> &mut dyn MutableAttributeStore {
        self.touched.insert(Domain::Attributes);
        let store: &mut MemAttributeStore = Arc::make_mut(&mut self.state.attributes);
        store
    }

    fn job_store(&mut self) -> &mut dyn MutableJobStore {
        self.touched.insert(Domain::Jobs);
        let store: &mut MemJobStore = Arc::make_mut(&mut self.state.jobs);
        store
    }

    fn update_store(&mut self) -> &mut dyn MutableUpdateStore {
        self.touched.insert(Domain::Updates);
        let store: &mut MemUpdateStore = Arc::make_mut(&mut self.state.updates);
        store
    }

    fn scheduler_store(&mut self) -> &mut dyn MutableSchedulerStore {
        self.touched.insert(Domain::Scheduler);
        let store: &mut MemSchedulerStore = Arc::make_mut(&mut self.state.scheduler);
        store
    }
}
