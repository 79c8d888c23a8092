//! Aggregated change history across a project's tasks.
//!
//! The backend only serves history per task. Two ways to combine them:
//! [`HistoryFeed`] merges per-task results as they arrive and re-sorts after
//! each one, so a view can render partial results; [`gather_history`] waits
//! for every fetch and sorts once.

use std::cmp::Ordering;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::api::TaskApi;
use crate::error::Result;
use crate::model::{TaskHistory, TaskId};

/// Newest first. Entries without a timestamp sort last; ties break on the
/// history id, newest first, so the order does not depend on arrival order.
pub fn sort_newest_first(entries: &mut [TaskHistory]) {
    entries.sort_by(compare_newest_first);
}

fn compare_newest_first(a: &TaskHistory, b: &TaskHistory) -> Ordering {
    match (a.changed_at, b.changed_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| b.id.cmp(&a.id))
}

/// Incrementally merged history for one view.
#[derive(Debug, Clone, Default)]
pub struct HistoryFeed {
    entries: Vec<TaskHistory>,
    received: usize,
    failed: Vec<TaskId>,
}

impl HistoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one task's result. A failure is logged and skipped.
    pub fn merge(&mut self, task_id: TaskId, result: Result<Vec<TaskHistory>>) {
        self.received += 1;
        match result {
            Ok(entries) => {
                self.entries.extend(entries);
                sort_newest_first(&mut self.entries);
            }
            Err(e) => {
                tracing::warn!(task_id, error = %e, "skipping task history");
                self.failed.push(task_id);
            }
        }
    }

    pub fn entries(&self) -> &[TaskHistory] {
        &self.entries
    }

    /// Number of per-task results folded in so far, failures included.
    pub fn received(&self) -> usize {
        self.received
    }

    pub fn failed(&self) -> &[TaskId] {
        &self.failed
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fetch every task's history concurrently and return the union sorted
/// newest first. Failed fetches are logged and left out.
pub async fn gather_history<T>(backend: Arc<T>, task_ids: &[TaskId]) -> Vec<TaskHistory>
where
    T: TaskApi + 'static,
{
    let mut set = JoinSet::new();
    for &id in task_ids {
        let backend = Arc::clone(&backend);
        set.spawn(async move { (id, backend.task_history(id).await) });
    }

    let mut entries = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((_, Ok(batch))) => entries.extend(batch),
            Ok((task_id, Err(e))) => {
                tracing::warn!(task_id, error = %e, "skipping task history");
            }
            Err(e) => tracing::warn!(error = %e, "history fetch task panicked"),
        }
    }
    sort_newest_first(&mut entries);
    entries
}

/// History of every task in a project, by project name.
pub async fn project_history<T>(backend: Arc<T>, project: &str) -> Result<Vec<TaskHistory>>
where
    T: TaskApi + 'static,
{
    let tasks = backend.tasks_for_project_name(project).await?;
    let ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
    tracing::debug!(project, tasks = ids.len(), "gathering history");
    Ok(gather_history(backend, &ids).await)
}
