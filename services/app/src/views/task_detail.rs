//! services/app/src/views/task_detail.rs
//!
//! A single task: shown, edited in place, cycled through its statuses, or deleted
//! after a second confirmation.

use super::{describe_failure, Navigation, TaskForm};
use std::sync::Arc;
use taskdeck_core::domain::{Task, TaskChanges};
use taskdeck_core::ports::{PortError, TaskService};
use tracing::{error, info, warn};
use uuid::Uuid;

pub const NOT_FOUND: &str = "Task not found";
pub const LOAD_FAILED: &str = "Failed to load task";
pub const UPDATE_FALLBACK: &str = "Task update failed. Please try again.";
pub const DELETE_FALLBACK: &str = "Task deletion failed. Please try again.";
pub const STATUS_FAILED: &str = "Failed to update task status";

pub struct TaskDetailView {
    tasks: Arc<dyn TaskService>,
    task_id: Uuid,
    task: Option<Task>,
    form: Option<TaskForm>,
    error: Option<String>,
    delete_armed: bool,
    busy: bool,
}

impl TaskDetailView {
    pub fn new(tasks: Arc<dyn TaskService>, task_id: Uuid) -> Self {
        Self {
            tasks,
            task_id,
            task: None,
            form: None,
            error: None,
            delete_armed: false,
            busy: false,
        }
    }

    /// Fetches the task. A missing task sends the user back to the list.
    pub async fn load(&mut self) -> Option<Navigation> {
        self.error = None;
        match self.tasks.get_task(self.task_id).await {
            Ok(task) => {
                self.task = Some(task);
                None
            }
            Err(PortError::NotFound(reason)) => {
                warn!("Task {} not found: {}", self.task_id, reason);
                self.task = None;
                self.error = Some(NOT_FOUND.to_string());
                Some(Navigation::TaskList)
            }
            Err(e) => {
                error!("Failed to load task {}: {:?}", self.task_id, e);
                self.error = Some(LOAD_FAILED.to_string());
                None
            }
        }
    }

    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_editing(&self) -> bool {
        self.form.is_some()
    }

    pub fn form(&self) -> Option<&TaskForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut TaskForm> {
        self.form.as_mut()
    }

    /// Opens the edit form on the last fetched values.
    pub fn begin_edit(&mut self) {
        if let Some(task) = &self.task {
            self.form = Some(TaskForm::from_task(task));
        }
    }

    /// Discards the edits and any errors.
    pub fn cancel_edit(&mut self) {
        self.form = None;
        self.error = None;
    }

    /// Sends the edit form as a full update. Returns true when the task was saved.
    pub async fn save(&mut self) -> bool {
        let Some(form) = self.form.as_mut() else {
            return false;
        };
        let Some(changes) = form.to_changes() else {
            return false;
        };

        self.busy = true;
        let result = self.tasks.update_task(self.task_id, &changes).await;
        self.busy = false;

        match result {
            Ok(updated) => {
                info!("Saved task {}", updated.id);
                self.task = Some(updated);
                self.form = None;
                true
            }
            Err(e) => {
                error!("Failed to update task {}: {:?}", self.task_id, e);
                if let Some(form) = self.form.as_mut() {
                    form.set_general_error(describe_failure(&e, UPDATE_FALLBACK));
                }
                false
            }
        }
    }

    /// Moves the task one step along `todo -> in-progress -> done -> todo`.
    pub async fn cycle_status(&mut self) {
        let Some(current) = self.task.as_ref().map(|t| t.status) else {
            return;
        };
        let changes = TaskChanges::status(current.next_in_cycle());

        self.busy = true;
        self.error = None;
        let result = self.tasks.patch_task(self.task_id, &changes).await;
        self.busy = false;

        match result {
            Ok(updated) => {
                info!("Task {} moved to {}", updated.id, updated.status);
                self.task = Some(updated);
            }
            Err(e) => {
                error!("Failed to change status of task {}: {:?}", self.task_id, e);
                self.error = Some(STATUS_FAILED.to_string());
            }
        }
    }

    pub fn is_delete_armed(&self) -> bool {
        self.delete_armed
    }

    /// The first call asks for confirmation, the second one deletes.
    pub async fn request_delete(&mut self) -> Option<Navigation> {
        if !self.delete_armed {
            self.delete_armed = true;
            return None;
        }
        self.confirm_delete().await
    }

    pub fn cancel_delete(&mut self) {
        self.delete_armed = false;
    }

    /// Deletes the task. On success the user goes back to the list.
    pub async fn confirm_delete(&mut self) -> Option<Navigation> {
        self.busy = true;
        self.error = None;
        let result = self.tasks.delete_task(self.task_id).await;
        self.busy = false;
        self.delete_armed = false;

        match result {
            Ok(()) => {
                info!("Deleted task {}", self.task_id);
                self.task = None;
                Some(Navigation::TaskList)
            }
            Err(e) => {
                error!("Failed to delete task {}: {:?}", self.task_id, e);
                self.error = Some(describe_failure(&e, DELETE_FALLBACK));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::testing::{sample_task, FakeTasks};
    use crate::views::TIMEOUT_MESSAGE;
    use chrono::{TimeZone, Utc};
    use taskdeck_core::domain::TaskStatus;
    use taskdeck_core::validation::FieldError;

    async fn loaded(status: TaskStatus) -> (TaskDetailView, Arc<FakeTasks>, Uuid) {
        let task = sample_task("Buy milk", status, 5);
        let id = task.id;
        let service = Arc::new(FakeTasks::with(vec![task]));
        let mut view = TaskDetailView::new(service.clone(), id);
        assert_eq!(view.load().await, None);
        (view, service, id)
    }

    #[tokio::test]
    async fn missing_task_navigates_back_to_list() {
        let service = Arc::new(FakeTasks::default());
        let mut view = TaskDetailView::new(service, Uuid::new_v4());
        assert_eq!(view.load().await, Some(Navigation::TaskList));
        assert_eq!(view.error(), Some(NOT_FOUND));
    }

    #[tokio::test]
    async fn other_load_failures_stay_put() {
        let service = Arc::new(FakeTasks::default());
        service.fail_next(PortError::Unexpected("boom".into()));
        let mut view = TaskDetailView::new(service, Uuid::new_v4());
        assert_eq!(view.load().await, None);
        assert_eq!(view.error(), Some(LOAD_FAILED));
    }

    #[tokio::test]
    async fn cycle_goes_through_in_progress_and_done() {
        let (mut view, _, _) = loaded(TaskStatus::Todo).await;
        view.cycle_status().await;
        assert_eq!(view.task().unwrap().status, TaskStatus::InProgress);
        view.cycle_status().await;
        assert_eq!(view.task().unwrap().status, TaskStatus::Done);
        view.cycle_status().await;
        assert_eq!(view.task().unwrap().status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn cycle_failure_shows_fixed_message() {
        let (mut view, service, _) = loaded(TaskStatus::Todo).await;
        service.fail_next(PortError::Rejected {
            status: 400,
            messages: vec![FieldError::general("Status transition not allowed")],
        });

        view.cycle_status().await;

        assert_eq!(view.error(), Some(STATUS_FAILED));
        assert_eq!(view.task().unwrap().status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn title_edit_keeps_timed_due_date() {
        let mut task = sample_task("Call the bank", TaskStatus::Todo, 5);
        let due = Utc.with_ymd_and_hms(2025, 6, 30, 15, 30, 0).unwrap();
        task.due_date = Some(due);
        let id = task.id;
        let mut view = TaskDetailView::new(Arc::new(FakeTasks::with(vec![task])), id);
        view.load().await;

        view.begin_edit();
        view.form_mut().unwrap().title = "Call the bank before noon".into();
        assert!(view.save().await);

        assert_eq!(view.task().unwrap().due_date, Some(due));
    }

    #[tokio::test]
    async fn save_replaces_task_and_leaves_edit_mode() {
        let (mut view, service, id) = loaded(TaskStatus::Todo).await;
        view.begin_edit();
        view.form_mut().unwrap().title = "Buy oat milk".into();

        assert!(view.save().await);
        assert!(!view.is_editing());
        assert_eq!(view.task().unwrap().title, "Buy oat milk");
        assert!(service.calls.lock().unwrap().contains(&format!("put {}", id)));

        // A later edit starts from the saved values.
        view.begin_edit();
        assert_eq!(view.form().unwrap().title, "Buy oat milk");
    }

    #[tokio::test]
    async fn invalid_edit_is_not_sent() {
        let (mut view, service, _) = loaded(TaskStatus::Todo).await;
        view.begin_edit();
        view.form_mut().unwrap().title = "".into();

        assert!(!view.save().await);
        assert_eq!(view.form().unwrap().error_for("title"), Some("Title is required"));
        assert!(!service.calls.lock().unwrap().iter().any(|c| c.starts_with("put")));
    }

    #[tokio::test]
    async fn save_failure_shows_detail_fallback_or_timeout() {
        let (mut view, service, _) = loaded(TaskStatus::Todo).await;
        view.begin_edit();

        service.fail_next(PortError::Rejected {
            status: 400,
            messages: vec![FieldError::general("Due date is in the past")],
        });
        assert!(!view.save().await);
        assert_eq!(view.form().unwrap().general_error(), Some("Due date is in the past"));

        service.fail_next(PortError::Rejected { status: 500, messages: vec![] });
        view.save().await;
        assert_eq!(view.form().unwrap().general_error(), Some(UPDATE_FALLBACK));

        service.fail_next(PortError::Timeout);
        view.save().await;
        assert_eq!(view.form().unwrap().general_error(), Some(TIMEOUT_MESSAGE));
    }

    #[tokio::test]
    async fn cancel_edit_restores_and_clears_errors() {
        let (mut view, _, _) = loaded(TaskStatus::Todo).await;
        view.begin_edit();
        view.form_mut().unwrap().title = "".into();
        view.save().await;

        view.cancel_edit();
        assert!(!view.is_editing());
        view.begin_edit();
        assert_eq!(view.form().unwrap().title, "Buy milk");
        assert!(view.form().unwrap().errors.is_valid());
    }

    #[tokio::test]
    async fn delete_needs_two_requests() {
        let (mut view, service, id) = loaded(TaskStatus::Todo).await;

        assert_eq!(view.request_delete().await, None);
        assert!(view.is_delete_armed());
        assert!(service.tasks.lock().unwrap().iter().any(|t| t.id == id));

        assert_eq!(view.request_delete().await, Some(Navigation::TaskList));
        assert!(service.tasks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_delete_disarms() {
        let (mut view, _, _) = loaded(TaskStatus::Todo).await;
        view.request_delete().await;
        view.cancel_delete();
        assert!(!view.is_delete_armed());
        assert_eq!(view.request_delete().await, None);
    }

    #[tokio::test]
    async fn delete_failure_shows_message_and_disarms() {
        let (mut view, service, _) = loaded(TaskStatus::Todo).await;
        view.request_delete().await;
        service.fail_next(PortError::Unexpected("boom".into()));

        assert_eq!(view.request_delete().await, None);
        assert_eq!(view.error(), Some(DELETE_FALLBACK));
        assert!(!view.is_delete_armed());
        assert!(view.task().is_some());
    }
}
