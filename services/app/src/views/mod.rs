//! services/app/src/views/mod.rs
//!
//! View models for each screen of the client. A view owns its data, calls the
//! service ports, and turns every failure into a message the user can read.
//! Rendering is left to the caller (the CLI binary).

pub mod dashboard;
pub mod gate;
pub mod login;
pub mod task_create;
pub mod task_detail;
pub mod task_form;
pub mod task_list;

pub use dashboard::DashboardView;
pub use gate::{AuthGate, GateDecision};
pub use login::{LoginView, RegisterView};
pub use task_create::TaskCreateView;
pub use task_detail::TaskDetailView;
pub use task_form::TaskForm;
pub use task_list::TaskListView;

use std::time::{Duration, Instant};
use taskdeck_core::ports::PortError;
use uuid::Uuid;

pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please check your connection and try again.";

/// Picks the message to show for a failed request.
///
/// Timeouts get their own message, otherwise the server's explanation is
/// preferred over `fallback`.
pub fn describe_failure(err: &PortError, fallback: &str) -> String {
    if err.is_timeout() {
        return TIMEOUT_MESSAGE.to_string();
    }
    err.server_message()
        .unwrap_or_else(|| fallback.to_string())
}

/// Where a view wants the user to go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Login,
    Dashboard,
    TaskList,
    TaskDetail(Uuid),
}

impl Navigation {
    pub fn route(&self) -> String {
        match self {
            Navigation::Login => "/auth/login".to_string(),
            Navigation::Dashboard => "/dashboard".to_string(),
            Navigation::TaskList => "/dashboard/tasks".to_string(),
            Navigation::TaskDetail(id) => format!("/dashboard/tasks/{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A transient message that disappears after `Notification::LIFETIME`.
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    raised_at: Instant,
}

impl Notification {
    pub const LIFETIME: Duration = Duration::from_secs(5);

    pub fn success(message: impl Into<String>) -> Self {
        Self::raised(NotificationKind::Success, message.into(), Instant::now())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::raised(NotificationKind::Error, message.into(), Instant::now())
    }

    fn raised(kind: NotificationKind, message: String, raised_at: Instant) -> Self {
        Self {
            kind,
            message,
            raised_at,
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= Self::LIFETIME
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_core::validation::FieldError;

    #[test]
    fn timeout_has_its_own_message() {
        assert_eq!(describe_failure(&PortError::Timeout, "fallback"), TIMEOUT_MESSAGE);
    }

    #[test]
    fn server_detail_beats_fallback() {
        let err = PortError::Rejected {
            status: 400,
            messages: vec![FieldError::general("Title already used")],
        };
        assert_eq!(describe_failure(&err, "fallback"), "Title already used");
        assert_eq!(
            describe_failure(&PortError::Unexpected("socket closed".into()), "fallback"),
            "fallback"
        );
    }

    #[test]
    fn notifications_expire_after_five_seconds() {
        let start = Instant::now();
        let note = Notification::raised(NotificationKind::Success, "Task marked as done".into(), start);
        assert!(!note.is_expired_at(start + Duration::from_secs(4)));
        assert!(note.is_expired_at(start + Duration::from_secs(5)));
    }

    #[test]
    fn routes() {
        assert_eq!(Navigation::TaskList.route(), "/dashboard/tasks");
        assert_eq!(Navigation::Login.route(), "/auth/login");
    }
}
