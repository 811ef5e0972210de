//! Task records held by the task store

use crate::types::{JobKey, ResourceAggregate, ScheduleStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Static description of what a task runs and what it needs
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Job the task belongs to
    pub job: JobKey,
    /// Resources reserved per instance
    pub resources: ResourceAggregate,
    /// Long-running service (restarted on exit) vs batch
    pub is_service: bool,
    /// Scheduling priority within the role
    pub priority: i32,
    /// Counts against production quota
    pub production: bool,
    /// Failures tolerated before the task is no longer rescheduled (0 = unlimited)
    pub max_task_failures: u32,
    /// Free-form labels
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl TaskConfig {
    /// Config for `job` with the given resources and defaults elsewhere
    pub fn new(job: JobKey, resources: ResourceAggregate) -> Self {
        Self {
            job,
            resources,
            is_service: false,
            priority: 0,
            production: false,
            max_task_failures: 1,
            metadata: BTreeMap::new(),
        }
    }

    /// Mark as a long-running service
    pub fn service(mut self) -> Self {
        self.is_service = true;
        self
    }

    /// Mark as production
    pub fn production(mut self) -> Self {
        self.production = true;
        self
    }
}

/// One state transition in a task's history
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskEvent {
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    /// Status entered
    pub status: ScheduleStatus,
    /// Optional human-readable reason
    pub message: Option<String>,
}

/// A task instance as tracked by the scheduler
///
/// `task_id` is the store key: a task store never holds two records with the
/// same id. Ordering compares `task_id` first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// Unique task id
    pub task_id: String,
    /// Current status
    pub status: ScheduleStatus,
    /// Instance (shard) number within the job
    pub instance_id: u32,
    /// Host the task is assigned to, if any
    pub slave_host: Option<String>,
    /// Number of failed runs so far
    pub failure_count: u32,
    /// Task this one was rescheduled from
    pub ancestor_id: Option<String>,
    /// What the task runs
    pub config: TaskConfig,
    /// Status history, oldest first
    #[serde(default)]
    pub events: Vec<TaskEvent>,
}

impl ScheduledTask {
    /// New task in `Pending` with an empty history
    pub fn new(task_id: impl Into<String>, instance_id: u32, config: TaskConfig) -> Self {
        Self {
            task_id: task_id.into(),
            status: ScheduleStatus::Pending,
            instance_id,
            slave_host: None,
            failure_count: 0,
            ancestor_id: None,
            config,
            events: Vec::new(),
        }
    }

    /// Job key of this task
    pub fn job_key(&self) -> &JobKey {
        &self.config.job
    }

    /// Builder-style status override
    pub fn with_status(mut self, status: ScheduleStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder-style host assignment
    pub fn on_host(mut self, host: impl Into<String>) -> Self {
        self.slave_host = Some(host.into());
        self
    }

    /// Move to `status`, appending an event stamped `timestamp_ms`
    pub fn transition(
        &mut self,
        status: ScheduleStatus,
        timestamp_ms: i64,
        message: Option<String>,
    ) {
        self.status = status;
        self.events.push(TaskEvent {
            timestamp_ms,
            status,
            message,
        });
    }
}
