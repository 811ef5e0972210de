//! In-memory job update store

use schedstore_core::{JobKey, JobUpdateConfiguration, MutableUpdateStore, UpdateStore};
use std::collections::{BTreeMap, BTreeSet};

/// Update store keyed by job key
#[derive(Debug, Clone, Default)]
pub struct MemUpdateStore {
    updates: BTreeMap<JobKey, JobUpdateConfiguration>,
}

impl MemUpdateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl UpdateStore for MemUpdateStore {
    fn fetch_job_update_config(&self, key: &JobKey) -> Option<JobUpdateConfiguration> {
        self.updates.get(key).cloned()
    }

    fn fetch_update_configs(&self, role: &str) -> BTreeSet<JobUpdateConfiguration> {
        self.updates
            .iter()
            .filter(|(key, _)| key.role == role)
            .map(|(_, config)| config.clone())
            .collect()
    }

    fn fetch_updating_roles(&self) -> BTreeSet<String> {
        self.updates.keys().map(|key| key.role.clone()).collect()
    }
}

impl MutableUpdateStore for MemUpdateStore {
    fn save_job_update_config(&mut self, config: JobUpdateConfiguration) {
        self.updates.insert(config.job_key.clone(), config);
    }

    fn remove_shard_update_configs(&mut self, key: &JobKey) {
        self.updates.remove(key);
    }

    fn delete_shard_update_configs(&mut self) {
        self.updates.clear();
    }
}
