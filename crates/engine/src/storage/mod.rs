//! Transactional storage facade
//!
//! `TransactionalStorage` is the production [`Storage`]:
//!
//! - Consistent reads clone the committed snapshot pointer and run against it
//! - Weak reads run against a replica pointer refreshed after commits
//! - Writes are serialized by one writer lock held for the whole unit of work,
//!   run against a private copy-on-write state, and publish it on `Ok`
//!
//! A unit of work that returns `Err` or panics publishes nothing. Locks are
//! `parking_lot`, so a panic never poisons the facade.

mod backup;
mod config;

pub use backup::{StorageBackup, BACKUP_FORMAT_VERSION};
pub use config::{StorageConfig, CONFIG_FILE_NAME};

use crate::coordinator::{StorageMetrics, WriteCoordinator};
use parking_lot::{Mutex, RwLock};
use schedstore_core::{MutableStoreProvider, Storage, StoreProvider, StorageResult};
use schedstore_storage::StoreState;
use std::cell::RefCell;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Instances this thread is currently writing to
    static ACTIVE_WRITES: RefCell<Vec<u64>> = RefCell::new(Vec::new());
}

/// Whole milliseconds in `elapsed`, clamped to `u64::MAX`
fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// State guarded by the writer lock
#[derive(Debug, Default)]
struct WriterState {
    commits_since_refresh: u64,
}

/// Production storage facade over the in-memory domain stores
pub struct TransactionalStorage {
    id: u64,
    config: StorageConfig,
    /// Latest committed state
    committed: RwLock<Arc<StoreState>>,
    /// State served to weak reads; lags `committed` by up to
    /// `replica_refresh_commits` commits
    replica: RwLock<Arc<StoreState>>,
    /// Set when a due replica refresh was skipped; the next weak read catches up
    replica_behind: AtomicBool,
    writer: Mutex<WriterState>,
    coordinator: WriteCoordinator,
}

impl TransactionalStorage {
    /// Empty storage with the default configuration
    pub fn new() -> Self {
        Self::build(StorageConfig::default())
    }

    /// Empty storage with an explicit configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_config(config: StorageConfig) -> StorageResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Empty storage configured from a TOML file
    ///
    /// A default file is written first if none exists at `config_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, read, or parsed.
    pub fn open(config_path: impl AsRef<Path>) -> StorageResult<Self> {
        let config_path = config_path.as_ref();
        StorageConfig::write_default_if_missing(config_path)?;
        let config = StorageConfig::from_file(config_path)?;
        info!(
            target: "schedstore::storage",
            path = %config_path.display(),
            "Loaded storage config"
        );
        Self::with_config(config)
    }

    /// Empty storage configured from `schedstore.toml` inside `dir`
    pub fn open_dir(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Self::open(dir.join(CONFIG_FILE_NAME))
    }

    fn build(config: StorageConfig) -> Self {
        let initial = Arc::new(StoreState::new());
        info!(
            target: "schedstore::storage",
            replica_refresh_commits = config.replica_refresh_commits,
            slow_write_threshold_ms = config.slow_write_threshold_ms,
            "Storage opened"
        );
        Self {
            id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            config,
            committed: RwLock::new(Arc::clone(&initial)),
            replica: RwLock::new(initial),
            replica_behind: AtomicBool::new(false),
            writer: Mutex::new(WriterState::default()),
            coordinator: WriteCoordinator::new(0),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Version of the latest committed state
    pub fn current_version(&self) -> u64 {
        self.committed.read().version()
    }

    /// Activity counters
    pub fn metrics(&self) -> StorageMetrics {
        self.coordinator.metrics()
    }

    /// Point the weak-read replica at the latest committed state
    pub fn refresh_replica(&self) {
        let mut writer = self.writer.lock();
        let latest = self.snapshot();
        *self.replica.write() = latest;
        self.replica_behind.store(false, Ordering::Release);
        writer.commits_since_refresh = 0;
        debug!(target: "schedstore::storage", "Replica refreshed on request");
    }

    /// Latest committed state
    fn snapshot(&self) -> Arc<StoreState> {
        Arc::clone(&self.committed.read())
    }

    /// Publish `state` as the latest committed state
    ///
    /// Must be called with the writer lock held.
    fn publish(&self, writer: &mut WriterState, state: StoreState) {
        let state = Arc::new(state);
        *self.committed.write() = Arc::clone(&state);

        writer.commits_since_refresh += 1;
        if writer.commits_since_refresh < self.config.replica_refresh_commits {
            return;
        }
        // Readers only hold the replica lock long enough to clone the pointer,
        // so contention here is rare. When it happens the next weak read or
        // commit performs the refresh.
        match self.replica.try_write() {
            Some(mut replica) => {
                *replica = state;
                self.replica_behind.store(false, Ordering::Release);
                writer.commits_since_refresh = 0;
            }
            None => {
                self.replica_behind.store(true, Ordering::Release);
                debug!(target: "schedstore::storage", "Replica refresh skipped, readers busy");
            }
        }
    }

    /// Finish a refresh that `publish` had to skip
    ///
    /// The flag is cleared under the replica lock before `committed` is read,
    /// so a refresh skipped concurrently either lands in this swap or leaves
    /// the flag set for the next reader.
    fn catch_up_replica(&self) {
        if !self.replica_behind.load(Ordering::Acquire) {
            return;
        }
        let Some(mut replica) = self.replica.try_write() else {
            return;
        };
        if !self.replica_behind.swap(false, Ordering::AcqRel) {
            return;
        }
        let latest = self.snapshot();
        if latest.version() > replica.version() {
            *replica = latest;
            debug!(target: "schedstore::storage", version = replica.version(), "Replica caught up");
        }
    }

    /// Replace every store with `state`, as one commit
    fn replace_state(&self, mut state: StoreState) -> u64 {
        let _scope = WriteScope::enter(self.id);
        let mut writer = self.writer.lock();
        self.coordinator.record_write_start();

        let version = self.coordinator.allocate_version();
        state.set_version(version);
        self.publish(&mut writer, state);
        self.coordinator.record_commit(version);
        version
    }
}

impl Default for TransactionalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TransactionalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionalStorage")
            .field("version", &self.current_version())
            .field("config", &self.config)
            .finish()
    }
}

impl Storage for TransactionalStorage {
    fn consistent_read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreProvider) -> Result<T, E>,
    {
        self.coordinator.record_consistent_read();
        let snapshot = self.snapshot();
        debug!(target: "schedstore::storage", version = snapshot.version(), "Consistent read");
        let provider: &dyn StoreProvider = &*snapshot;
        work(provider)
    }

    fn weakly_consistent_read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreProvider) -> Result<T, E>,
    {
        self.coordinator.record_weak_read();
        self.catch_up_replica();
        let replica = Arc::clone(&self.replica.read());
        debug!(target: "schedstore::storage", version = replica.version(), "Weakly consistent read");
        let provider: &dyn StoreProvider = &*replica;
        work(provider)
    }

    fn write<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn MutableStoreProvider) -> Result<T, E>,
    {
        let _scope = WriteScope::enter(self.id);
        let mut writer = self.writer.lock();
        self.coordinator.record_write_start();

        let started = Instant::now();
        let mut pending = StoreState::clone(&self.committed.read());
        let mut unwind = RollbackOnUnwind::new(&self.coordinator);

        let (result, touched, unsafe_accesses) = {
            let mut state_writer = pending.writer();
            let provider: &mut dyn MutableStoreProvider = &mut state_writer;
            let result = work(provider);
            (
                result,
                state_writer.touched(),
                state_writer.unsafe_task_accesses(),
            )
        };
        unwind.disarm();

        let elapsed = started.elapsed();
        if elapsed > self.config.slow_write_threshold() {
            warn!(
                target: "schedstore::write",
                elapsed_ms = saturating_millis(elapsed),
                threshold_ms = self.config.slow_write_threshold_ms,
                "Slow write"
            );
        }
        if unsafe_accesses > 0 {
            debug!(target: "schedstore::write", unsafe_accesses, "Write used unsafe task store");
        }

        match result {
            Ok(value) if touched.is_empty() => {
                self.coordinator.record_empty_write();
                debug!(target: "schedstore::write", "Write touched no store, nothing to commit");
                Ok(value)
            }
            Ok(value) => {
                let version = self.coordinator.allocate_version();
                pending.set_version(version);
                self.publish(&mut writer, pending);
                self.coordinator.record_commit(version);
                debug!(target: "schedstore::write", version, domains = %touched, "Write published");
                Ok(value)
            }
            Err(e) => {
                self.coordinator.record_rollback();
                debug!(target: "schedstore::write", domains = %touched, "Write failed, changes discarded");
                Err(e)
            }
        }
    }
}

/// Marks this thread as writing to one instance
///
/// Entering a second write on the same instance from the same thread would
/// wait forever on the writer lock, so it panics instead.
struct WriteScope {
    id: u64,
}

impl WriteScope {
    fn enter(id: u64) -> Self {
        let nested = ACTIVE_WRITES.with(|active| {
            let mut active = active.borrow_mut();
            if active.contains(&id) {
                true
            } else {
                active.push(id);
                false
            }
        });
        if nested {
            panic!(
                "nested write on the same storage from within a unit of work; \
                 the writer lock is already held by this thread"
            );
        }
        WriteScope { id }
    }
}

impl Drop for WriteScope {
    fn drop(&mut self) {
        ACTIVE_WRITES.with(|active| active.borrow_mut().retain(|id| *id != self.id));
    }
}

/// Counts a rollback if the unit of work unwinds
struct RollbackOnUnwind<'a> {
    coordinator: &'a WriteCoordinator,
    armed: bool,
}

impl<'a> RollbackOnUnwind<'a> {
    fn new(coordinator: &'a WriteCoordinator) -> Self {
        Self {
            coordinator,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for RollbackOnUnwind<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.coordinator.record_rollback();
            warn!(target: "schedstore::write", "Unit of work panicked, changes discarded");
        }
    }
}
