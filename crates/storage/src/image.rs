//! Serializable image of the whole store
//!
//! An image holds plain records only; secondary indexes are rebuilt when an
//! image is loaded back into a `StoreState`.

use schedstore_core::{
    HostAttributes, JobConfiguration, JobUpdateConfiguration, ResourceAggregate, ScheduledTask,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every record of every domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreImage {
    /// Scheduled tasks, ordered by id
    pub tasks: Vec<ScheduledTask>,
    /// Quotas keyed by role
    pub quotas: BTreeMap<String, ResourceAggregate>,
    /// Host attributes, ordered by host
    pub host_attributes: Vec<HostAttributes>,
    /// Accepted jobs keyed by manager id
    pub jobs: BTreeMap<String, Vec<JobConfiguration>>,
    /// In-progress job updates
    pub updates: Vec<JobUpdateConfiguration>,
    /// Scheduler framework id
    pub framework_id: Option<String>,
}

impl StoreImage {
    /// Total number of records across all domains
    pub fn record_count(&self) -> usize {
        self.tasks.len()
            + self.quotas.len()
            + self.host_attributes.len()
            + self.jobs.values().map(Vec::len).sum::<usize>()
            + self.updates.len()
            + usize::from(self.framework_id.is_some())
    }
}
