//! In-memory host attribute store

use schedstore_core::{AttributeStore, HostAttributes, MaintenanceMode, MutableAttributeStore};
use std::collections::{BTreeMap, BTreeSet};

/// Host attribute store keyed by host name
#[derive(Debug, Clone, Default)]
pub struct MemAttributeStore {
    hosts: BTreeMap<String, HostAttributes>,
}

impl MemAttributeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttributeStore for MemAttributeStore {
    fn host_attributes(&self, host: &str) -> Option<HostAttributes> {
        self.hosts.get(host).cloned()
    }

    fn all_host_attributes(&self) -> BTreeSet<HostAttributes> {
        self.hosts.values().cloned().collect()
    }
}

impl MutableAttributeStore for MemAttributeStore {
    fn save_host_attributes(&mut self, mut attributes: HostAttributes) {
        if attributes.mode == MaintenanceMode::None {
            if let Some(existing) = self.hosts.get(&attributes.host) {
                attributes.mode = existing.mode;
            }
        }
        self.hosts.insert(attributes.host.clone(), attributes);
    }

    fn set_maintenance_mode(&mut self, host: &str, mode: MaintenanceMode) -> bool {
        match self.hosts.get_mut(host) {
            Some(attributes) => {
                attributes.mode = mode;
                true
            }
            None => false,
        }
    }

    fn delete_host_attributes(&mut self) {
        self.hosts.clear();
    }
}
