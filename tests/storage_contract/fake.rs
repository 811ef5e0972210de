//! Testing consumer code against FakeStorage

use crate::common::*;
use schedstore::{ResourceAggregate, ScheduleStatus, Storage, TaskQuery};
use schedstore_engine::{FakeStorage, Operation};

#[test]
fn canned_fetch_drives_usage() {
    let storage = FakeStorage::new();
    let running = task("www-0", "www", 0).with_status(ScheduleStatus::Running);
    let active: Vec<ScheduleStatus> = ScheduleStatus::ALL
        .iter()
        .copied()
        .filter(|s| s.is_active())
        .collect();
    storage.expect_task_fetch(TaskQuery::by_role("www").with_statuses(active), vec![running]);

    assert_eq!(role_usage(&storage, "www"), ResourceAggregate::new(1000, 1024, 1024));
    assert_eq!(storage.operations(), vec![Operation::ConsistentRead]);
}

#[test]
fn consumer_uses_expected_entry_points() {
    let storage = FakeStorage::new();
    storage.with_stores(|s| {
        use schedstore::MutableTaskStore;
        s.tasks.save_tasks(vec![task("www-0", "www", 0)]);
    });

    change_state(&storage, "www-0", ScheduleStatus::Assigned).unwrap();
    let ids = task_ids_for_role(&storage, "www");

    assert_eq!(ids.len(), 1);
    assert_eq!(
        storage.operations(),
        vec![Operation::Write, Operation::WeaklyConsistentRead]
    );
    assert_eq!(storage.count(Operation::ConsistentRead), 0);
}

#[test]
fn fake_keeps_partial_writes() {
    let storage = FakeStorage::new();

    let result = admit_tasks(&storage, "www", vec![task("www-0", "www", 0)]);

    assert!(matches!(result, Err(SchedulerError::QuotaExceeded { .. })));
    let kept = storage
        .consistent_read(|p| Ok::<_, ()>(p.task_store().fetch_task_ids(&TaskQuery::unscoped())))
        .unwrap();
    assert_eq!(kept.len(), 1);
}
