//! crates/taskdeck_core/src/dashboard.rs
//!
//! Reduces a task list to the counts shown on the dashboard.

use crate::domain::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    /// Everything not exactly `done`, archived tasks included.
    pub pending: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks
            .iter()
            .filter(|task| task.status == TaskStatus::Done)
            .count();
        Self {
            total,
            completed,
            pending: total - completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskPriority;
    use chrono::Utc;
    use uuid::Uuid;

    fn with_statuses(statuses: &[TaskStatus]) -> Vec<Task> {
        let now = Utc::now();
        statuses
            .iter()
            .map(|&status| Task {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                title: "t".to_string(),
                description: None,
                status,
                priority: TaskPriority::Medium,
                due_date: None,
                created_at: now,
                updated_at: now,
            })
            .collect()
    }

    #[test]
    fn pending_is_total_minus_done() {
        let tasks = with_statuses(&[
            TaskStatus::Todo,
            TaskStatus::Done,
            TaskStatus::InProgress,
            TaskStatus::Done,
            TaskStatus::Archived,
        ]);
        assert_eq!(
            TaskStats::from_tasks(&tasks),
            TaskStats { total: 5, completed: 2, pending: 3 }
        );
    }

    #[test]
    fn archived_only_counts_as_pending() {
        let tasks = with_statuses(&[TaskStatus::Archived, TaskStatus::Archived]);
        let stats = TaskStats::from_tasks(&tasks);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.pending, 2);
    }

    #[test]
    fn empty_list_is_all_zero() {
        assert_eq!(TaskStats::from_tasks(&[]), TaskStats::default());
    }
}
