//! Guarantees of the production facade that the fake does not give

use crate::common::*;
use schedstore::{ResourceAggregate, Storage, TaskQuery, TransactionalStorage};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn rejected_admission_leaves_no_tasks() {
    init_tracing();
    let storage = TransactionalStorage::new();
    storage
        .write(|p| {
            p.quota_store()
                .save_quota("www", ResourceAggregate::new(1000, 1024, 1024));
            Ok::<_, SchedulerError>(())
        })
        .unwrap();

    let result = admit_tasks(
        &storage,
        "www",
        vec![task("www-0", "www", 0), task("www-1", "www", 1)],
    );

    assert_eq!(
        result,
        Err(SchedulerError::QuotaExceeded {
            role: "www".into(),
            requested: ResourceAggregate::new(2000, 2048, 2048),
        })
    );
    assert!(task_ids_for_role(&storage, "www").is_empty());
    assert_eq!(storage.metrics().writes_rolled_back, 1);
}

#[test]
fn concurrent_admissions_respect_quota() {
    init_tracing();
    let storage = Arc::new(TransactionalStorage::new());
    storage
        .write(|p| {
            // Room for exactly four tasks
            p.quota_store()
                .save_quota("www", ResourceAggregate::new(4000, 4096, 4096));
            Ok::<_, SchedulerError>(())
        })
        .unwrap();

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8u32)
        .map(|i| {
            let storage = Arc::clone(&storage);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                admit_tasks(&*storage, "www", vec![task(&format!("www-{}", i), "www", i)])
            })
        })
        .collect();

    let admitted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(Result::is_ok)
        .count();

    assert_eq!(admitted, 4);
    let stored = storage
        .consistent_read(|p| Ok::<_, ()>(p.task_store().fetch_task_ids(&TaskQuery::by_role("www"))))
        .unwrap();
    assert_eq!(stored.len(), 4);
}
