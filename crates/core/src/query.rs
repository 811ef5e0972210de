//! Task query descriptor
//!
//! A `TaskQuery` is a conjunction of optional filters. Unset filters match
//! every task, so `TaskQuery::unscoped()` matches the whole store.

use crate::task::ScheduledTask;
use crate::types::{JobKey, ScheduleStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Filter over scheduled tasks
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Job role
    pub role: Option<String>,
    /// Job environment
    pub environment: Option<String>,
    /// Job name
    pub job_name: Option<String>,
    /// Exact task ids
    pub task_ids: Option<BTreeSet<String>>,
    /// Allowed statuses
    pub statuses: Option<BTreeSet<ScheduleStatus>>,
    /// Allowed instance ids
    pub instance_ids: Option<BTreeSet<u32>>,
    /// Assigned host
    pub slave_host: Option<String>,
}

impl TaskQuery {
    /// Query matching every task
    pub fn unscoped() -> Self {
        Self::default()
    }

    /// Query for a single task id
    pub fn by_id(task_id: impl Into<String>) -> Self {
        Self::by_ids([task_id])
    }

    /// Query for a set of task ids
    pub fn by_ids<I, S>(task_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            task_ids: Some(task_ids.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Query for every task of a job
    pub fn by_job(key: &JobKey) -> Self {
        Self {
            role: Some(key.role.clone()),
            environment: Some(key.environment.clone()),
            job_name: Some(key.name.clone()),
            ..Self::default()
        }
    }

    /// Query for every task owned by a role
    pub fn by_role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            ..Self::default()
        }
    }

    /// Query for every task assigned to a host
    pub fn by_host(host: impl Into<String>) -> Self {
        Self {
            slave_host: Some(host.into()),
            ..Self::default()
        }
    }

    /// Query for every task in an active status
    pub fn active() -> Self {
        Self::unscoped().with_statuses(
            ScheduleStatus::ALL
                .iter()
                .copied()
                .filter(|s| s.is_active()),
        )
    }

    /// Restrict to the given statuses
    pub fn with_statuses<I>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = ScheduleStatus>,
    {
        self.statuses = Some(statuses.into_iter().collect());
        self
    }

    /// Restrict to the given instance ids
    pub fn with_instances<I>(mut self, instance_ids: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        self.instance_ids = Some(instance_ids.into_iter().collect());
        self
    }

    /// The job key, when role, environment and name are all set
    pub fn job_key(&self) -> Option<JobKey> {
        match (&self.role, &self.environment, &self.job_name) {
            (Some(role), Some(env), Some(name)) => {
                Some(JobKey::new(role.clone(), env.clone(), name.clone()))
            }
            _ => None,
        }
    }

    /// True if no filter is set
    pub fn is_unscoped(&self) -> bool {
        *self == Self::default()
    }

    /// Check every set filter against `task`
    pub fn matches(&self, task: &ScheduledTask) -> bool {
        let job = task.job_key();

        fn field_matches(filter: &Option<String>, value: &str) -> bool {
            filter.as_deref().map_or(true, |f| f == value)
        }

        field_matches(&self.role, &job.role)
            && field_matches(&self.environment, &job.environment)
            && field_matches(&self.job_name, &job.name)
            && self
                .task_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&task.task_id))
            && self
                .statuses
                .as_ref()
                .map_or(true, |s| s.contains(&task.status))
            && self
                .instance_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&task.instance_id))
            && self
                .slave_host
                .as_ref()
                .map_or(true, |h| task.slave_host.as_ref() == Some(h))
    }
}
