//! services/app/src/adapters/wire.rs
//!
//! JSON shapes exchanged with the remote task service, and their conversion to
//! and from the core domain types. Field names are snake_case as the service
//! emits them; camelCase spellings are accepted on input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskdeck_core::domain::{
    AuthSession, Credentials, NewTask, Registration, Task, TaskChanges, User, UnknownVariant,
};
use taskdeck_core::validation::{parse_timestamp, FieldError, GENERAL_FIELD};
use uuid::Uuid;

/// A response body that could not be turned into a domain value.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid timestamp '{0}'")]
    Timestamp(String),
    #[error(transparent)]
    Variant(#[from] UnknownVariant),
}

fn timestamp(raw: &str) -> Result<DateTime<Utc>, DecodeError> {
    parse_timestamp(raw).ok_or_else(|| DecodeError::Timestamp(raw.to_string()))
}

fn optional_timestamp(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, DecodeError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => timestamp(raw).map(Some),
    }
}

//=========================================================================================
// Records (Incoming)
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default, alias = "emailVerified")]
    pub email_verified: bool,
    #[serde(alias = "createdAt")]
    pub created_at: String,
    #[serde(alias = "updatedAt")]
    pub updated_at: String,
}

fn default_role() -> String {
    "user".to_string()
}

impl UserRecord {
    pub fn to_domain(self) -> Result<User, DecodeError> {
        Ok(User {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role.parse()?,
            email_verified: self.email_verified,
            created_at: timestamp(&self.created_at)?,
            updated_at: timestamp(&self.updated_at)?,
        })
    }

    pub fn from_domain(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role.as_str().to_string(),
            email_verified: user.email_verified,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskRecord {
    pub id: Uuid,
    #[serde(alias = "userId")]
    pub user_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    #[serde(default, alias = "dueDate")]
    pub due_date: Option<String>,
    #[serde(alias = "createdAt")]
    pub created_at: String,
    #[serde(alias = "updatedAt")]
    pub updated_at: String,
}

impl TaskRecord {
    pub fn to_domain(self) -> Result<Task, DecodeError> {
        Ok(Task {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            status: self.status.parse()?,
            priority: self.priority.parse()?,
            due_date: optional_timestamp(self.due_date.as_deref())?,
            created_at: timestamp(&self.created_at)?,
            updated_at: timestamp(&self.updated_at)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthRecord {
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: UserRecord,
}

impl AuthRecord {
    pub fn to_domain(self) -> Result<AuthSession, DecodeError> {
        Ok(AuthSession {
            token: self.token,
            user: self.user.to_domain()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyRecord {
    #[serde(default = "default_valid")]
    pub valid: bool,
    pub user: UserRecord,
}

fn default_valid() -> bool {
    true
}

//=========================================================================================
// Bodies (Outgoing)
//=========================================================================================

#[derive(Debug, Serialize)]
pub struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a Credentials> for LoginBody<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        Self {
            email: &credentials.email,
            password: &credentials.password,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<&'a str>,
}

impl<'a> From<&'a Registration> for RegisterBody<'a> {
    fn from(registration: &'a Registration) -> Self {
        Self {
            email: &registration.email,
            password: &registration.password,
            first_name: registration.first_name.as_deref(),
            last_name: registration.last_name.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NewTaskBody<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub status: &'static str,
    pub priority: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl<'a> From<&'a NewTask> for NewTaskBody<'a> {
    fn from(task: &'a NewTask) -> Self {
        Self {
            title: &task.title,
            description: task.description.as_deref(),
            status: task.status.as_str(),
            priority: task.priority.as_str(),
            due_date: task.due_date.map(|d| d.to_rfc3339()),
        }
    }
}

/// Only the fields that are set get serialized.
#[derive(Debug, Default, Serialize)]
pub struct TaskChangesBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl<'a> From<&'a TaskChanges> for TaskChangesBody<'a> {
    fn from(changes: &'a TaskChanges) -> Self {
        Self {
            title: changes.title.as_deref(),
            description: changes.description.as_deref(),
            status: changes.status.map(|s| s.as_str()),
            priority: changes.priority.map(|p| p.as_str()),
            due_date: changes.due_date.map(|d| d.to_rfc3339()),
        }
    }
}

//=========================================================================================
// Error Bodies
//=========================================================================================

/// Extracts field messages from an error body.
///
/// Understands `{"detail": "..."}`, a `detail` list of `{loc, msg}` entries,
/// and `{"errors": [{field, message}]}`.
pub fn error_messages(body: &Value) -> Vec<FieldError> {
    match body.get("detail") {
        Some(Value::String(detail)) => return vec![FieldError::general(detail.clone())],
        Some(Value::Array(items)) => return items.iter().filter_map(field_error).collect(),
        _ => {}
    }
    match body.get("errors") {
        Some(Value::Array(items)) => items.iter().filter_map(field_error).collect(),
        _ => Vec::new(),
    }
}

fn field_error(item: &Value) -> Option<FieldError> {
    let message = item
        .get("message")
        .or_else(|| item.get("msg"))
        .and_then(Value::as_str)?;
    let field = item
        .get("field")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            item.get("loc")
                .and_then(Value::as_array)
                .and_then(|loc| loc.last())
                .map(|last| match last {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
        })
        .unwrap_or_else(|| GENERAL_FIELD.to_string());
    Some(FieldError::new(field, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskdeck_core::domain::{TaskPriority, TaskStatus};

    #[test]
    fn task_record_accepts_snake_and_camel_case() {
        let snake = json!({
            "id": "6f1c1d1e-6e0b-4b8e-9b6a-0d6f4f1b2c3d",
            "user_id": "00000000-0000-0000-0000-000000000001",
            "title": "Buy milk",
            "status": "in-progress",
            "priority": "urgent",
            "due_date": "2025-03-01T00:00:00",
            "created_at": "2025-02-01T08:00:00.123456",
            "updated_at": "2025-02-01T08:00:00Z"
        });
        let task: Task = serde_json::from_value::<TaskRecord>(snake)
            .unwrap()
            .to_domain()
            .unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::Urgent);
        assert!(task.due_date.is_some());
        assert!(task.description.is_none());

        let camel = json!({
            "id": "6f1c1d1e-6e0b-4b8e-9b6a-0d6f4f1b2c3d",
            "userId": "00000000-0000-0000-0000-000000000001",
            "title": "Buy milk",
            "description": "2%",
            "status": "done",
            "priority": "low",
            "dueDate": null,
            "createdAt": "2025-02-01T08:00:00Z",
            "updatedAt": "2025-02-01T08:00:00Z"
        });
        let task = serde_json::from_value::<TaskRecord>(camel)
            .unwrap()
            .to_domain()
            .unwrap();
        assert_eq!(task.description.as_deref(), Some("2%"));
        assert!(task.due_date.is_none());
    }

    #[test]
    fn unknown_status_is_a_decode_error() {
        let record = TaskRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "x".to_string(),
            description: None,
            status: "blocked".to_string(),
            priority: "low".to_string(),
            due_date: None,
            created_at: "2025-02-01T08:00:00Z".to_string(),
            updated_at: "2025-02-01T08:00:00Z".to_string(),
        };
        assert!(matches!(record.to_domain(), Err(DecodeError::Variant(_))));
    }

    #[test]
    fn partial_update_body_only_carries_set_fields() {
        let changes = TaskChanges::status(TaskStatus::Done);
        let body = serde_json::to_value(TaskChangesBody::from(&changes)).unwrap();
        assert_eq!(body, json!({ "status": "done" }));
    }

    #[test]
    fn new_task_body_defaults() {
        let body = serde_json::to_value(NewTaskBody::from(&NewTask::titled("Buy milk"))).unwrap();
        assert_eq!(
            body,
            json!({ "title": "Buy milk", "status": "todo", "priority": "medium" })
        );
    }

    #[test]
    fn error_messages_understand_common_shapes() {
        assert_eq!(
            error_messages(&json!({ "detail": "Task not found or unauthorized" })),
            vec![FieldError::general("Task not found or unauthorized")]
        );
        assert_eq!(
            error_messages(&json!({ "detail": [
                { "loc": ["body", "title"], "msg": "field required", "type": "missing" }
            ]})),
            vec![FieldError::new("title", "field required")]
        );
        assert_eq!(
            error_messages(&json!({ "errors": [{ "field": "email", "message": "taken" }] })),
            vec![FieldError::new("email", "taken")]
        );
        assert!(error_messages(&json!({ "success": false })).is_empty());
    }

    #[test]
    fn cached_user_round_trips_through_json() {
        let record: UserRecord = serde_json::from_value(json!({
            "id": "00000000-0000-0000-0000-000000000001",
            "email": "ada@example.com",
            "first_name": "Ada",
            "role": "admin",
            "email_verified": true,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-02T00:00:00Z"
        }))
        .unwrap();
        let user = record.to_domain().unwrap();
        let stored = serde_json::to_string(&UserRecord::from_domain(&user)).unwrap();
        let restored = serde_json::from_str::<UserRecord>(&stored)
            .unwrap()
            .to_domain()
            .unwrap();
        assert_eq!(restored, user);
    }
}
