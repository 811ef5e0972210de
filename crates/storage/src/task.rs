//! In-memory task store
//!
//! Tasks are keyed by id in a `BTreeMap`, with two secondary indexes
//! (job key and assigned host) kept in `FxHashMap`s. `fetch_tasks` uses the
//! narrowest index the query allows and then applies the full filter.

use rustc_hash::FxHashMap;
use schedstore_core::{
    JobKey, MutableTaskStore, ScheduledTask, TaskConfig, TaskQuery, TaskStore,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Task store backed by ordered maps
#[derive(Debug, Clone, Default)]
pub struct MemTaskStore {
    tasks: BTreeMap<String, ScheduledTask>,
    by_job: FxHashMap<JobKey, BTreeSet<String>>,
    by_host: FxHashMap<String, BTreeSet<String>>,
}

impl MemTaskStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True if no task is stored
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn insert(&mut self, task: ScheduledTask) {
        if let Some(old) = self.tasks.remove(&task.task_id) {
            self.unindex(&old);
        }
        self.by_job
            .entry(task.job_key().clone())
            .or_default()
            .insert(task.task_id.clone());
        if let Some(host) = &task.slave_host {
            self.by_host
                .entry(host.clone())
                .or_default()
                .insert(task.task_id.clone());
        }
        self.tasks.insert(task.task_id.clone(), task);
    }

    fn remove(&mut self, task_id: &str) -> Option<ScheduledTask> {
        let task = self.tasks.remove(task_id)?;
        self.unindex(&task);
        Some(task)
    }

    fn unindex(&mut self, task: &ScheduledTask) {
        if let Some(ids) = self.by_job.get_mut(task.job_key()) {
            ids.remove(&task.task_id);
            if ids.is_empty() {
                self.by_job.remove(task.job_key());
            }
        }
        if let Some(host) = &task.slave_host {
            if let Some(ids) = self.by_host.get_mut(host) {
                ids.remove(&task.task_id);
                if ids.is_empty() {
                    self.by_host.remove(host);
                }
            }
        }
    }

    fn lookup<'a>(&'a self, ids: &BTreeSet<String>) -> Vec<&'a ScheduledTask> {
        ids.iter().filter_map(|id| self.tasks.get(id)).collect()
    }

    fn matching(&self, query: &TaskQuery) -> Vec<&ScheduledTask> {
        let candidates = if let Some(ids) = &query.task_ids {
            self.lookup(ids)
        } else if let Some(key) = query.job_key() {
            self.by_job
                .get(&key)
                .map(|ids| self.lookup(ids))
                .unwrap_or_default()
        } else if let Some(host) = &query.slave_host {
            self.by_host
                .get(host)
                .map(|ids| self.lookup(ids))
                .unwrap_or_default()
        } else {
            self.tasks.values().collect()
        };

        candidates
            .into_iter()
            .filter(|task| query.matches(task))
            .collect()
    }
}

impl TaskStore for MemTaskStore {
    fn fetch_tasks(&self, query: &TaskQuery) -> BTreeSet<ScheduledTask> {
        self.matching(query).into_iter().cloned().collect()
    }

    fn fetch_task_ids(&self, query: &TaskQuery) -> BTreeSet<String> {
        self.matching(query)
            .into_iter()
            .map(|t| t.task_id.clone())
            .collect()
    }
}

impl MutableTaskStore for MemTaskStore {
    fn save_tasks(&mut self, tasks: Vec<ScheduledTask>) {
        for task in tasks {
            self.insert(task);
        }
    }

    fn delete_all_tasks(&mut self) {
        self.tasks.clear();
        self.by_job.clear();
        self.by_host.clear();
    }

    fn delete_tasks(&mut self, task_ids: &BTreeSet<String>) {
        for id in task_ids {
            self.remove(id);
        }
    }

    fn mutate_tasks(
        &mut self,
        query: &TaskQuery,
        mutator: &mut dyn FnMut(&mut ScheduledTask),
    ) -> BTreeSet<ScheduledTask> {
        let ids: Vec<String> = self
            .matching(query)
            .into_iter()
            .map(|t| t.task_id.clone())
            .collect();

        let mut mutated = BTreeSet::new();
        for id in ids {
            let Some(mut task) = self.tasks.get(&id).cloned() else {
                continue;
            };
            mutator(&mut task);
            if task.task_id != id {
                warn!(
                    target: "schedstore::storage",
                    task_id = %id,
                    attempted = %task.task_id,
                    "Task mutator changed the task id; keeping the original id"
                );
                task.task_id = id;
            }
            self.insert(task.clone());
            mutated.insert(task);
        }
        mutated
    }

    fn unsafe_modify_in_place(&mut self, task_id: &str, config: TaskConfig) -> bool {
        match self.tasks.get(task_id).cloned() {
            Some(mut task) => {
                task.config = config;
                self.insert(task);
                true
            }
            None => false,
        }
    }
}
