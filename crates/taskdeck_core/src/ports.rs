//! crates/taskdeck_core/src/ports.rs
//!
//! Defines the service contracts (traits) the views depend on.
//! These traits form the boundary of the hexagonal architecture, keeping the views
//! independent of the concrete HTTP client and storage backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AuthSession, Credentials, NewTask, Registration, Task, TaskChanges, TaskQuery, User};
use crate::validation::FieldError;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (network, storage).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The token is missing, expired or was refused. Carries the server's reason if it gave one.
    #[error("Unauthorized")]
    Unauthorized(Option<String>),
    #[error("Request timed out")]
    Timeout,
    /// The remote service refused the request and said why.
    #[error("Request rejected with status {status}")]
    Rejected { status: u16, messages: Vec<FieldError> },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// The message the remote service gave for this failure, if any.
    ///
    /// Field messages are joined with `"; "`.
    pub fn server_message(&self) -> Option<String> {
        match self {
            PortError::Rejected { messages, .. } if !messages.is_empty() => Some(
                messages
                    .iter()
                    .map(|m| m.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            PortError::Unauthorized(Some(message)) => Some(message.clone()),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, PortError::Timeout)
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, registration: &Registration) -> PortResult<AuthSession>;

    async fn login(&self, credentials: &Credentials) -> PortResult<AuthSession>;

    /// Best-effort server-side invalidation.
    async fn logout(&self) -> PortResult<()>;

    /// Confirms the current token and returns the profile it belongs to.
    async fn verify(&self) -> PortResult<User>;
}

#[async_trait]
pub trait TaskService: Send + Sync {
    async fn list_tasks(&self, query: &TaskQuery) -> PortResult<Vec<Task>>;

    async fn get_task(&self, task_id: Uuid) -> PortResult<Task>;

    async fn create_task(&self, task: &NewTask) -> PortResult<Task>;

    /// Full update (`PUT`).
    async fn update_task(&self, task_id: Uuid, changes: &TaskChanges) -> PortResult<Task>;

    /// Partial update (`PATCH`), only the fields present in `changes` are sent.
    async fn patch_task(&self, task_id: Uuid, changes: &TaskChanges) -> PortResult<Task>;

    async fn delete_task(&self, task_id: Uuid) -> PortResult<()>;
}

/// Durable client-side key/value storage for the session.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> PortResult<()>;

    async fn remove(&self, key: &str) -> PortResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_joins_field_messages() {
        let err = PortError::Rejected {
            status: 422,
            messages: vec![
                FieldError::new("title", "field required"),
                FieldError::new("priority", "bad value"),
            ],
        };
        assert_eq!(err.server_message().as_deref(), Some("field required; bad value"));
    }

    #[test]
    fn server_message_absent_for_transport_failures() {
        assert_eq!(PortError::Timeout.server_message(), None);
        assert_eq!(
            PortError::Rejected { status: 500, messages: vec![] }.server_message(),
            None
        );
        assert!(PortError::Timeout.is_timeout());
        assert_eq!(PortError::Unauthorized(None).server_message(), None);
        assert_eq!(
            PortError::Unauthorized(Some("Invalid email or password".to_string())).server_message(),
            Some("Invalid email or password".to_string())
        );
    }
}
