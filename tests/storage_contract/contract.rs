//! Behaviour every `Storage` implementation shares

use crate::common::*;
use schedstore::{
    ResourceAggregate, ScheduleStatus, Storage, TaskQuery, TransactionalStorage,
};
use schedstore_engine::FakeStorage;

fn results_pass_through<S: Storage>(storage: &S) {
    assert_eq!(storage.consistent_read(|_| Ok::<_, String>(7)), Ok(7));
    assert_eq!(
        storage.weakly_consistent_read(|_| Err::<u8, _>("nope".to_string())),
        Err("nope".to_string())
    );
    assert_eq!(
        storage.write(|_| Err::<(), _>(SchedulerError::UnknownTask("t".into()))),
        Err(SchedulerError::UnknownTask("t".into()))
    );
}

fn empty_fetches_are_empty<S: Storage>(storage: &S) {
    let (tasks, quotas, hosts, managers, roles, framework) = storage
        .consistent_read(|p| {
            Ok::<_, ()>((
                p.task_store().fetch_tasks(&TaskQuery::by_role("nobody")),
                p.quota_store().fetch_quotas(),
                p.attribute_store().all_host_attributes(),
                p.job_store().manager_ids(),
                p.update_store().fetch_updating_roles(),
                p.scheduler_store().fetch_framework_id(),
            ))
        })
        .unwrap();

    assert!(tasks.is_empty());
    assert!(quotas.is_empty());
    assert!(hosts.is_empty());
    assert!(managers.is_empty());
    assert!(roles.is_empty());
    assert!(framework.is_none());
}

fn consumer_round_trip<S: Storage>(storage: &S) {
    storage
        .write(|p| {
            p.quota_store()
                .save_quota("www", ResourceAggregate::new(2000, 4096, 4096));
            Ok::<_, SchedulerError>(())
        })
        .unwrap();

    let admitted = admit_tasks(
        storage,
        "www",
        vec![task("www-0", "www", 0), task("www-1", "www", 1)],
    );
    assert_eq!(admitted, Ok(2));
    assert_eq!(role_usage(storage, "www"), ResourceAggregate::new(2000, 2048, 2048));

    let running = change_state(storage, "www-0", ScheduleStatus::Running).unwrap();
    assert_eq!(running.task_id, "www-0");
    assert_eq!(running.status, ScheduleStatus::Running);

    assert_eq!(
        change_state(storage, "missing", ScheduleStatus::Running),
        Err(SchedulerError::UnknownTask("missing".into()))
    );
    assert_eq!(task_ids_for_role(storage, "www").len(), 2);
}

#[test]
fn transactional_passes_results_through() {
    init_tracing();
    results_pass_through(&TransactionalStorage::new());
}

#[test]
fn fake_passes_results_through() {
    results_pass_through(&FakeStorage::new());
}

#[test]
fn transactional_empty_fetches() {
    init_tracing();
    empty_fetches_are_empty(&TransactionalStorage::new());
}

#[test]
fn fake_empty_fetches() {
    empty_fetches_are_empty(&FakeStorage::new());
}

#[test]
fn transactional_consumer_round_trip() {
    init_tracing();
    consumer_round_trip(&TransactionalStorage::new());
}

#[test]
fn fake_consumer_round_trip() {
    consumer_round_trip(&FakeStorage::new());
}
