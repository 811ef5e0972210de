//! In-memory quota store

use schedstore_core::{MutableQuotaStore, QuotaStore, ResourceAggregate};
use std::collections::BTreeMap;

/// Quota store keyed by role
#[derive(Debug, Clone, Default)]
pub struct MemQuotaStore {
    quotas: BTreeMap<String, ResourceAggregate>,
}

impl MemQuotaStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl QuotaStore for MemQuotaStore {
    fn fetch_quota(&self, role: &str) -> Option<ResourceAggregate> {
        self.quotas.get(role).copied()
    }

    fn fetch_quotas(&self) -> BTreeMap<String, ResourceAggregate> {
        self.quotas.clone()
    }
}

impl MutableQuotaStore for MemQuotaStore {
    fn save_quota(&mut self, role: &str, quota: ResourceAggregate) {
        self.quotas.insert(role.to_string(), quota);
    }

    fn remove_quota(&mut self, role: &str) {
        self.quotas.remove(role);
    }

    fn delete_quotas(&mut self) {
        self.quotas.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_fetch_remove() {
        let mut store = MemQuotaStore::new();
        assert!(store.fetch_quota("www").is_none());

        store.save_quota("www", ResourceAggregate::new(4000, 8192, 16384));
        store.save_quota("batch", ResourceAggregate::new(1000, 1024, 1024));
        assert_eq!(
            store.fetch_quota("www"),
            Some(ResourceAggregate::new(4000, 8192, 16384))
        );
        assert_eq!(store.fetch_quotas().len(), 2);

        store.remove_quota("www");
        assert!(store.fetch_quota("www").is_none());

        store.delete_quotas();
        assert!(store.fetch_quotas().is_empty());
    }

    #[test]
    fn test_save_overwrites() {
        let mut store = MemQuotaStore::new();
        store.save_quota("www", ResourceAggregate::new(1, 1, 1));
        store.save_quota("www", ResourceAggregate::new(2, 2, 2));
        assert_eq!(store.fetch_quota("www"), Some(ResourceAggregate::new(2, 2, 2)));
    }
}
