//! In-memory scheduler metadata store

use schedstore_core::{MutableSchedulerStore, SchedulerStore};

/// Holds the scheduler's framework id
#[derive(Debug, Clone, Default)]
pub struct MemSchedulerStore {
    framework_id: Option<String>,
}

impl MemSchedulerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchedulerStore for MemSchedulerStore {
    fn fetch_framework_id(&self) -> Option<String> {
        self.framework_id.clone()
    }
}

impl MutableSchedulerStore for MemSchedulerStore {
    fn save_framework_id(&mut self, framework_id: String) {
        self.framework_id = Some(framework_id);
    }
}
