//! services/app/src/views/task_list.rs
//!
//! The task list screen: the fetched tasks, the filter/sort/search controls
//! applied to them, and the completion checkbox on each row.

use super::Notification;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use taskdeck_core::domain::{Task, TaskChanges, TaskQuery, TaskStatus};
use taskdeck_core::listing::{arrange, ListControls, SortKey, StatusFilter};
use taskdeck_core::ports::{PortResult, TaskService};
use taskdeck_core::sequence::RequestSequencer;
use tracing::{debug, error, info};
use uuid::Uuid;

pub const LOAD_FAILED: &str = "Failed to load tasks";
pub const TOGGLE_FAILED: &str = "Failed to update task status";

/// A status change that has been sent but not yet answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingToggle {
    pub task_id: Uuid,
    pub target: TaskStatus,
    seq: u64,
}

pub struct TaskListView {
    tasks: Arc<dyn TaskService>,
    source: Vec<Task>,
    visible: Vec<Task>,
    controls: ListControls,
    loading: bool,
    error: Option<String>,
    notification: Option<Notification>,
    sequencer: RequestSequencer<Uuid>,
    /// Latest sequence number sent per task; present while that task is busy.
    in_flight: HashMap<Uuid, u64>,
}

impl TaskListView {
    pub fn new(tasks: Arc<dyn TaskService>) -> Self {
        Self {
            tasks,
            source: Vec::new(),
            visible: Vec::new(),
            controls: ListControls::default(),
            loading: false,
            error: None,
            notification: None,
            sequencer: RequestSequencer::new(),
            in_flight: HashMap::new(),
        }
    }

    pub async fn load(&mut self) {
        self.loading = true;
        self.error = None;
        match self.tasks.list_tasks(&TaskQuery::default()).await {
            Ok(tasks) => {
                debug!("Loaded {} tasks", tasks.len());
                self.source = tasks;
                self.recompute();
            }
            Err(e) => {
                error!("Failed to load tasks: {:?}", e);
                self.error = Some(LOAD_FAILED.to_string());
            }
        }
        self.loading = false;
    }

    fn recompute(&mut self) {
        self.visible = arrange(&self.source, &self.controls);
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.controls.filter = filter;
        self.recompute();
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.controls.sort = sort;
        self.recompute();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.controls.search = search.into();
        self.recompute();
    }

    pub fn controls(&self) -> &ListControls {
        &self.controls
    }

    /// The tasks to show, after filter, search and sort.
    pub fn visible(&self) -> &[Task] {
        &self.visible
    }

    pub fn all(&self) -> &[Task] {
        &self.source
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Hint for an empty list, `None` while there is something to show.
    pub fn empty_hint(&self) -> Option<&'static str> {
        self.visible
            .is_empty()
            .then(|| self.controls.empty_hint())
    }

    pub fn is_overdue(&self, task: &Task) -> bool {
        task.is_overdue(Utc::now())
    }

    /// True while a status change for this task is in flight.
    pub fn is_updating(&self, task_id: Uuid) -> bool {
        self.in_flight.contains_key(&task_id)
    }

    /// The current notification, if it has not expired yet.
    pub fn notification(&mut self) -> Option<&Notification> {
        if self.notification.as_ref().is_some_and(Notification::is_expired) {
            self.notification = None;
        }
        self.notification.as_ref()
    }

    /// Marks the task busy and works out its next status. `None` for a task
    /// that is not in the list.
    pub fn begin_toggle(&mut self, task_id: Uuid) -> Option<PendingToggle> {
        let current = self.source.iter().find(|t| t.id == task_id)?.status;
        let seq = self.sequencer.issue(task_id);
        self.in_flight.insert(task_id, seq);
        Some(PendingToggle {
            task_id,
            target: current.toggled_done(),
            seq,
        })
    }

    /// Applies the answer to a toggle. Answers older than one already applied
    /// for the same task are dropped. Returns whether the answer was applied.
    pub fn finish_toggle(&mut self, pending: PendingToggle, result: PortResult<Task>) -> bool {
        if self.in_flight.get(&pending.task_id) == Some(&pending.seq) {
            self.in_flight.remove(&pending.task_id);
        }
        if !self.sequencer.accept(pending.task_id, pending.seq) {
            debug!("Dropping stale status response for task {}", pending.task_id);
            return false;
        }

        match result {
            Ok(updated) => {
                info!("Task {} marked as {}", updated.id, updated.status);
                self.notification = Some(Notification::success(format!(
                    "Task marked as {}",
                    updated.status
                )));
                if let Some(slot) = self.source.iter_mut().find(|t| t.id == updated.id) {
                    *slot = updated;
                }
                self.recompute();
            }
            Err(e) => {
                error!("Failed to update status of task {}: {:?}", pending.task_id, e);
                self.notification = Some(Notification::error(TOGGLE_FAILED));
            }
        }
        true
    }

    /// Flips a task between `done` and `todo` with a partial update.
    pub async fn toggle_status(&mut self, task_id: Uuid) {
        let Some(pending) = self.begin_toggle(task_id) else {
            return;
        };
        let result = self
            .tasks
            .patch_task(task_id, &TaskChanges::status(pending.target))
            .await;
        self.finish_toggle(pending, result);
    }
}
