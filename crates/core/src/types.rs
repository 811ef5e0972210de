//! Shared scheduler value types
//!
//! - JobKey: role/environment/name triple identifying a job
//! - ScheduleStatus: lifecycle states of a scheduled task
//! - ResourceAggregate: cpu/ram/disk bundle used by tasks and quotas
//! - MaintenanceMode: host maintenance state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a job by role, environment and name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobKey {
    /// Owning role (the quota accounting unit)
    pub role: String,
    /// Deployment environment, e.g. `prod` or `devel`
    pub environment: String,
    /// Job name, unique within role and environment
    pub name: String,
}

impl JobKey {
    /// Create a new job key
    pub fn new(
        role: impl Into<String>,
        environment: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            environment: environment.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.role, self.environment, self.name)
    }
}

/// Lifecycle state of a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScheduleStatus {
    /// Created but not yet handed to the scheduler
    Init,
    /// Waiting for a matching offer
    Pending,
    /// Assigned to a host, launch in progress
    Assigned,
    /// Executor reported the task is starting
    Starting,
    /// Running on a host
    Running,
    /// Exited successfully
    Finished,
    /// Being preempted in favor of a higher priority task
    Preempting,
    /// Being restarted (e.g. during an update)
    Restarting,
    /// Exited with failure
    Failed,
    /// Killed on request
    Killed,
    /// Kill requested, not yet confirmed
    Killing,
    /// Lost track of (host disappeared)
    Lost,
    /// State not known to the scheduler
    Unknown,
}

impl ScheduleStatus {
    /// All statuses, in declaration order
    pub const ALL: [ScheduleStatus; 13] = [
        ScheduleStatus::Init,
        ScheduleStatus::Pending,
        ScheduleStatus::Assigned,
        ScheduleStatus::Starting,
        ScheduleStatus::Running,
        ScheduleStatus::Finished,
        ScheduleStatus::Preempting,
        ScheduleStatus::Restarting,
        ScheduleStatus::Failed,
        ScheduleStatus::Killed,
        ScheduleStatus::Killing,
        ScheduleStatus::Lost,
        ScheduleStatus::Unknown,
    ];

    /// Statuses of tasks that hold (or are about to hold) resources
    pub fn is_active(self) -> bool {
        matches!(
            self,
            ScheduleStatus::Init
                | ScheduleStatus::Pending
                | ScheduleStatus::Assigned
                | ScheduleStatus::Starting
                | ScheduleStatus::Running
                | ScheduleStatus::Preempting
                | ScheduleStatus::Restarting
                | ScheduleStatus::Killing
        )
    }

    /// Statuses a task never leaves
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ScheduleStatus::Finished
                | ScheduleStatus::Failed
                | ScheduleStatus::Killed
                | ScheduleStatus::Lost
        )
    }
}

/// Bundle of schedulable resources
///
/// CPU is tracked in thousandths of a core so the type stays `Eq + Ord`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ResourceAggregate {
    /// CPU in millicores
    pub cpu_millis: u64,
    /// Memory in MiB
    pub ram_mb: u64,
    /// Disk in MiB
    pub disk_mb: u64,
}

impl ResourceAggregate {
    /// Create a new aggregate
    pub const fn new(cpu_millis: u64, ram_mb: u64, disk_mb: u64) -> Self {
        Self {
            cpu_millis,
            ram_mb,
            disk_mb,
        }
    }

    /// Empty aggregate
    pub const fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// Component-wise sum
    pub fn add(&self, other: &ResourceAggregate) -> ResourceAggregate {
        ResourceAggregate {
            cpu_millis: self.cpu_millis.saturating_add(other.cpu_millis),
            ram_mb: self.ram_mb.saturating_add(other.ram_mb),
            disk_mb: self.disk_mb.saturating_add(other.disk_mb),
        }
    }

    /// Component-wise difference, floored at zero
    pub fn saturating_sub(&self, other: &ResourceAggregate) -> ResourceAggregate {
        ResourceAggregate {
            cpu_millis: self.cpu_millis.saturating_sub(other.cpu_millis),
            ram_mb: self.ram_mb.saturating_sub(other.ram_mb),
            disk_mb: self.disk_mb.saturating_sub(other.disk_mb),
        }
    }

    /// Scale every component by `factor`
    pub fn scale(&self, factor: u64) -> ResourceAggregate {
        ResourceAggregate {
            cpu_millis: self.cpu_millis.saturating_mul(factor),
            ram_mb: self.ram_mb.saturating_mul(factor),
            disk_mb: self.disk_mb.saturating_mul(factor),
        }
    }

    /// True if any component of `self` is larger than the same component of `limit`
    pub fn exceeds(&self, limit: &ResourceAggregate) -> bool {
        self.cpu_millis > limit.cpu_millis
            || self.ram_mb > limit.ram_mb
            || self.disk_mb > limit.disk_mb
    }
}

/// Maintenance state of a host
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum MaintenanceMode {
    /// Host is in normal service
    #[default]
    None,
    /// Maintenance planned; avoid new placements when possible
    Scheduled,
    /// Tasks are being moved off the host
    Draining,
    /// No tasks remain on the host
    Drained,
}
