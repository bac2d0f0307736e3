//! The task create/edit form, shared by the create and detail views.

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use taskdeck_core::domain::{NewTask, Task, TaskChanges, TaskPriority, TaskStatus};
use taskdeck_core::validation::{
    parse_due_date, validate_task_form, FieldError, ValidationResult, GENERAL_FIELD,
};

/// Raw form input. Text fields hold exactly what the user typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Calendar date (`YYYY-MM-DD`) or timestamp, blank for none.
    pub due_date: String,
    pub errors: ValidationResult,
}

/// Form text for a due date: the bare date at midnight, the full timestamp otherwise.
fn due_date_text(due: DateTime<Utc>) -> String {
    if due.num_seconds_from_midnight() == 0 && due.nanosecond() == 0 {
        due.format("%Y-%m-%d").to_string()
    } else {
        due.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl TaskForm {
    /// A form pre-filled with the task's current values.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status: task.status,
            priority: task.priority,
            due_date: task.due_date.map(due_date_text).unwrap_or_default(),
            errors: ValidationResult::default(),
        }
    }

    /// Runs the field checks and stores the result. Returns true when the form
    /// may be submitted.
    pub fn validate(&mut self) -> bool {
        self.errors = validate_task_form(&self.title, &self.due_date);
        self.errors.is_valid()
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors.message_for(field)
    }

    pub fn general_error(&self) -> Option<&str> {
        self.error_for(GENERAL_FIELD)
    }

    /// Replaces any previous server failure message.
    pub fn set_general_error(&mut self, message: impl Into<String>) {
        self.errors.errors.retain(|e| e.field != GENERAL_FIELD);
        self.errors.errors.push(FieldError::general(message));
    }

    fn trimmed_description(&self) -> Option<String> {
        let description = self.description.trim();
        (!description.is_empty()).then(|| description.to_string())
    }

    /// The create payload, or `None` if the form does not validate.
    pub fn to_new_task(&mut self) -> Option<NewTask> {
        if !self.validate() {
            return None;
        }
        Some(NewTask {
            title: self.title.trim().to_string(),
            description: self.trimmed_description(),
            status: self.status,
            priority: self.priority,
            due_date: parse_due_date(&self.due_date).ok().flatten(),
        })
    }

    /// The full-update payload, or `None` if the form does not validate.
    ///
    /// A cleared description is sent as an empty string so the update removes it.
    pub fn to_changes(&mut self) -> Option<TaskChanges> {
        if !self.validate() {
            return None;
        }
        Some(TaskChanges {
            title: Some(self.title.trim().to_string()),
            description: Some(self.trimmed_description().unwrap_or_default()),
            status: Some(self.status),
            priority: Some(self.priority),
            due_date: parse_due_date(&self.due_date).ok().flatten(),
        })
    }
}
