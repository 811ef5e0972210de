//! Job and job-update records held by the job and update stores

use crate::task::TaskConfig;
use crate::types::JobKey;
use serde::{Deserialize, Serialize};

/// An accepted job definition
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobConfiguration {
    /// Job identity (store key)
    pub key: JobKey,
    /// User that submitted the job
    pub owner: String,
    /// Cron expression for cron jobs, `None` for regular jobs
    pub cron_schedule: Option<String>,
    /// Number of instances
    pub instance_count: u32,
    /// Template for every instance
    pub task: TaskConfig,
}

impl JobConfiguration {
    /// Regular (non-cron) job
    pub fn new(owner: impl Into<String>, instance_count: u32, task: TaskConfig) -> Self {
        Self {
            key: task.job.clone(),
            owner: owner.into(),
            cron_schedule: None,
            instance_count,
            task,
        }
    }

    /// Builder-style cron schedule
    pub fn with_cron(mut self, schedule: impl Into<String>) -> Self {
        self.cron_schedule = Some(schedule.into());
        self
    }
}

/// Old and new config of one shard during an update
///
/// `old_config: None` means the shard is being added; `new_config: None`
/// means it is being removed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskUpdateConfiguration {
    /// Config before the update
    pub old_config: Option<TaskConfig>,
    /// Config after the update
    pub new_config: Option<TaskConfig>,
}

/// An in-progress job update
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobUpdateConfiguration {
    /// Job being updated (store key)
    pub job_key: JobKey,
    /// Token the updater must present to advance the update
    pub update_token: String,
    /// Per-shard configs, indexed by instance id
    pub configs: Vec<TaskUpdateConfiguration>,
}

impl JobUpdateConfiguration {
    /// Create an update record
    pub fn new(
        job_key: JobKey,
        update_token: impl Into<String>,
        configs: Vec<TaskUpdateConfiguration>,
    ) -> Self {
        Self {
            job_key,
            update_token: update_token.into(),
            configs,
        }
    }
}
