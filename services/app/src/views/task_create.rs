//! The new-task screen.

use super::{describe_failure, Navigation, TaskForm};
use std::sync::Arc;
use taskdeck_core::ports::TaskService;
use tracing::{error, info};

pub const CREATE_FALLBACK: &str = "Task creation failed. Please try again.";

pub struct TaskCreateView {
    tasks: Arc<dyn TaskService>,
    pub form: TaskForm,
    submitting: bool,
}

impl TaskCreateView {
    pub fn new(tasks: Arc<dyn TaskService>) -> Self {
        Self {
            tasks,
            form: TaskForm::default(),
            submitting: false,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Validates and sends the form. On success the user goes back to the list.
    pub async fn submit(&mut self) -> Option<Navigation> {
        let new_task = self.form.to_new_task()?;

        self.submitting = true;
        let result = self.tasks.create_task(&new_task).await;
        self.submitting = false;

        match result {
            Ok(task) => {
                info!("Created task {} '{}'", task.id, task.title);
                self.form = TaskForm::default();
                Some(Navigation::TaskList)
            }
            Err(e) => {
                error!("Task creation error: {:?}", e);
                self.form
                    .set_general_error(describe_failure(&e, CREATE_FALLBACK));
                None
            }
        }
    }
}
