//! In-memory job store
//!
//! Jobs are grouped by manager id. A job key lives under at most one manager.

use schedstore_core::{JobConfiguration, JobKey, JobStore, MutableJobStore};
use std::collections::{BTreeMap, BTreeSet};

/// Job store keyed by manager id, then job key
#[derive(Debug, Clone, Default)]
pub struct MemJobStore {
    jobs: BTreeMap<String, BTreeMap<JobKey, JobConfiguration>>,
}

impl MemJobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for MemJobStore {
    fn fetch_jobs(&self, manager_id: &str) -> BTreeSet<JobConfiguration> {
        self.jobs
            .get(manager_id)
            .map(|jobs| jobs.values().cloned().collect())
            .unwrap_or_default()
    }

    fn fetch_job(&self, manager_id: &str, key: &JobKey) -> Option<JobConfiguration> {
        self.jobs.get(manager_id)?.get(key).cloned()
    }

    fn manager_ids(&self) -> BTreeSet<String> {
        self.jobs.keys().cloned().collect()
    }
}

impl MutableJobStore for MemJobStore {
    fn save_accepted_job(&mut self, manager_id: &str, job: JobConfiguration) {
        self.remove_job(&job.key);
        self.jobs
            .entry(manager_id.to_string())
            .or_default()
            .insert(job.key.clone(), job);
    }

    fn remove_job(&mut self, key: &JobKey) {
        self.jobs.retain(|_, jobs| {
            jobs.remove(key);
            !jobs.is_empty()
        });
    }

    fn delete_jobs(&mut self) {
        self.jobs.clear();
    }
}
