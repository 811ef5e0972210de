//! Shared fixtures and a small scheduler-style consumer of `Storage`

#![allow(dead_code)]

use schedstore::{
    JobKey, ResourceAggregate, ScheduleStatus, ScheduledTask, Storage, TaskConfig, TaskQuery,
};
use std::collections::BTreeSet;
use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Route storage logs to the test harness output
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

pub fn job(role: &str) -> JobKey {
    JobKey::new(role, "prod", "web")
}

pub fn task(id: &str, role: &str, instance: u32) -> ScheduledTask {
    ScheduledTask::new(
        id,
        instance,
        TaskConfig::new(job(role), ResourceAggregate::new(1000, 1024, 1024)),
    )
}

/// Errors raised by the consumer below; the storage never sees inside them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    QuotaExceeded {
        role: String,
        requested: ResourceAggregate,
    },
    UnknownTask(String),
}

/// Resources used by the active tasks of `role`
pub fn role_usage<S: Storage>(storage: &S, role: &str) -> ResourceAggregate {
    let active = storage
        .consistent_read(|p| {
            Ok::<_, SchedulerError>(
                p.task_store()
                    .fetch_tasks(&TaskQuery::by_role(role).with_statuses(active_statuses())),
            )
        })
        .unwrap_or_default();
    active
        .iter()
        .fold(ResourceAggregate::zero(), |acc, t| acc.add(&t.config.resources))
}

/// Admit `tasks` if the role's quota covers them, all in one write
pub fn admit_tasks<S: Storage>(
    storage: &S,
    role: &str,
    tasks: Vec<ScheduledTask>,
) -> Result<usize, SchedulerError> {
    storage.write(|p| {
        let count = tasks.len();
        p.task_store().save_tasks(tasks);

        let used = p
            .task_store()
            .fetch_tasks(&TaskQuery::by_role(role).with_statuses(active_statuses()))
            .iter()
            .fold(ResourceAggregate::zero(), |acc, t| acc.add(&t.config.resources));
        let quota = p
            .quota_store()
            .fetch_quota(role)
            .unwrap_or_else(ResourceAggregate::zero);
        if used.exceeds(&quota) {
            return Err(SchedulerError::QuotaExceeded {
                role: role.to_string(),
                requested: used,
            });
        }
        Ok(count)
    })
}

/// Move one task to `status`
pub fn change_state<S: Storage>(
    storage: &S,
    task_id: &str,
    status: ScheduleStatus,
) -> Result<ScheduledTask, SchedulerError> {
    storage.write(|p| {
        let mut set_status = |t: &mut ScheduledTask| t.status = status;
        p.task_store()
            .mutate_tasks(&TaskQuery::by_id(task_id), &mut set_status)
            .into_iter()
            .next()
            .ok_or_else(|| SchedulerError::UnknownTask(task_id.to_string()))
    })
}

/// Ids of the tasks of `role`, tolerating staleness
pub fn task_ids_for_role<S: Storage>(storage: &S, role: &str) -> BTreeSet<String> {
    storage
        .weakly_consistent_read(|p| {
            Ok::<_, SchedulerError>(p.task_store().fetch_task_ids(&TaskQuery::by_role(role)))
        })
        .unwrap_or_default()
}

fn active_statuses() -> Vec<ScheduleStatus> {
    ScheduleStatus::ALL
        .iter()
        .copied()
        .filter(|s| s.is_active())
        .collect()
}
