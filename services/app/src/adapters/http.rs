//! services/app/src/adapters/http.rs
//!
//! The HTTP adapter for the remote task service. It implements the `AuthService`
//! and `TaskService` ports from `taskdeck_core` and owns every cross-cutting rule
//! for outgoing requests: bearer token, `/api` path prefix, timeout, and clearing
//! the session when the service answers 401.

use crate::adapters::wire::{
    error_messages, AuthRecord, DecodeError, LoginBody, NewTaskBody, RegisterBody, TaskChangesBody,
    TaskRecord, VerifyRecord,
};
use crate::config::{Config, LOCAL_ORIGIN};
use crate::session::SessionStore;
use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use taskdeck_core::domain::{
    AuthSession, Credentials, NewTask, Registration, Task, TaskChanges, TaskQuery, User,
};
use taskdeck_core::ports::{AuthService, PortError, PortResult, TaskService};
use taskdeck_core::validation::FieldError;
use tracing::{debug, warn};
use uuid::Uuid;

const API_PREFIX: &str = "/api";

//=========================================================================================
// Errors
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,
    #[error("Transport error: {0}")]
    Transport(reqwest::Error),
    #[error("Unauthorized")]
    Unauthorized { messages: Vec<FieldError> },
    #[error("Not found: {path}")]
    NotFound { path: String, messages: Vec<FieldError> },
    #[error("Request failed with status {status}")]
    Api { status: u16, messages: Vec<FieldError> },
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e)
        }
    }
}

impl From<DecodeError> for ClientError {
    fn from(e: DecodeError) -> Self {
        ClientError::Decode(e.to_string())
    }
}

fn first_message(messages: &[FieldError]) -> Option<String> {
    messages.first().map(|m| m.message.clone())
}

impl From<ClientError> for PortError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Timeout => PortError::Timeout,
            ClientError::Unauthorized { messages } => {
                PortError::Unauthorized(first_message(&messages))
            }
            ClientError::NotFound { path, messages } => {
                PortError::NotFound(first_message(&messages).unwrap_or(path))
            }
            ClientError::Api { status, messages } => PortError::Rejected { status, messages },
            ClientError::Transport(e) => PortError::Unexpected(e.to_string()),
            ClientError::Decode(message) => PortError::Unexpected(message),
        }
    }
}

//=========================================================================================
// URL Rules
//=========================================================================================

/// Whether request paths get the `/api` prefix.
///
/// True for relative (same-origin) deployments and for local development:
/// no base URL, a base URL without a scheme, or one pointing at
/// `localhost`/`127.0.0.1`.
pub fn uses_api_prefix(base_url: Option<&str>) -> bool {
    match base_url {
        None => true,
        Some(base) => {
            !base.contains("://") || base.contains("localhost") || base.contains("127.0.0.1")
        }
    }
}

/// Applies the prefix rule to a request path.
pub fn resolve_path(base_url: Option<&str>, path: &str) -> String {
    if uses_api_prefix(base_url) && !path.starts_with(API_PREFIX) {
        format!("{}{}", API_PREFIX, path)
    } else {
        path.to_string()
    }
}

/// Builds the absolute URL for a request path.
///
/// Without a scheme in the base URL the request is same-origin, which for a
/// terminal client means the local development origin.
pub fn request_url(base_url: Option<&str>, path: &str) -> String {
    let path = resolve_path(base_url, path);
    match base_url.map(|base| base.trim_end_matches('/')) {
        Some(base) if base.contains("://") => format!("{}{}", base, path),
        Some(relative) if !relative.trim_start_matches('/').is_empty() => format!(
            "{}/{}{}",
            LOCAL_ORIGIN,
            relative.trim_start_matches('/'),
            path
        ),
        _ => format!("{}{}", LOCAL_ORIGIN, path),
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// The REST client. Cheap to clone; clones share the connection pool and session.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Option<String>,
    session: Arc<SessionStore>,
}

impl HttpClient {
    /// Creates a new `HttpClient` with the configured base URL and timeout.
    pub fn new(config: &Config, session: Arc<SessionStore>) -> Result<Self, ClientError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(ClientError::Transport)?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            session,
        })
    }

    /// Starts a request with the prefix rule and bearer token applied.
    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = request_url(self.base_url.as_deref(), path);
        debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        match self.session.token().await {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and turns error statuses into `ClientError`s.
    ///
    /// A 401 clears the session before the error is returned.
    async fn dispatch(&self, builder: RequestBuilder, path: &str) -> Result<Response, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let messages = serde_json::from_str::<serde_json::Value>(&body)
            .map(|value| error_messages(&value))
            .unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED => {
                warn!("{} answered 401, clearing the stored session", path);
                self.session.clear().await;
                Err(ClientError::Unauthorized { messages })
            }
            StatusCode::NOT_FOUND => Err(ClientError::NotFound {
                path: path.to_string(),
                messages,
            }),
            other => Err(ClientError::Api {
                status: other.as_u16(),
                messages,
            }),
        }
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        Ok(response.json::<T>().await?)
    }

    async fn fetch_task(&self, builder: RequestBuilder, path: &str) -> Result<Task, ClientError> {
        let response = self.dispatch(builder, path).await?;
        let record: TaskRecord = Self::json(response).await?;
        Ok(record.to_domain()?)
    }

    async fn authenticate(&self, builder: RequestBuilder, path: &str) -> Result<AuthSession, ClientError> {
        let response = self.dispatch(builder, path).await?;
        let record: AuthRecord = Self::json(response).await?;
        Ok(record.to_domain()?)
    }
}

fn task_path(task_id: Uuid) -> String {
    format!("/tasks/{}", task_id)
}

fn query_pairs(query: &TaskQuery) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(status) = query.status {
        pairs.push(("status", status.as_str().to_string()));
    }
    if let Some(priority) = query.priority {
        pairs.push(("priority", priority.as_str().to_string()));
    }
    if let Some(limit) = query.limit {
        pairs.push(("limit", limit.to_string()));
    }
    if let Some(offset) = query.offset {
        pairs.push(("offset", offset.to_string()));
    }
    pairs
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl AuthService for HttpClient {
    async fn register(&self, registration: &Registration) -> PortResult<AuthSession> {
        let path = "/auth/register";
        let builder = self
            .request(Method::POST, path)
            .await
            .json(&RegisterBody::from(registration));
        Ok(self.authenticate(builder, path).await?)
    }

    async fn login(&self, credentials: &Credentials) -> PortResult<AuthSession> {
        let path = "/auth/login";
        let builder = self
            .request(Method::POST, path)
            .await
            .json(&LoginBody::from(credentials));
        Ok(self.authenticate(builder, path).await?)
    }

    async fn logout(&self) -> PortResult<()> {
        let path = "/auth/logout";
        let builder = self.request(Method::POST, path).await;
        self.dispatch(builder, path).await?;
        Ok(())
    }

    async fn verify(&self) -> PortResult<User> {
        let path = "/auth/verify";
        let builder = self.request(Method::GET, path).await;
        let response = self.dispatch(builder, path).await?;
        let record: VerifyRecord = Self::json(response).await?;
        if !record.valid {
            self.session.clear().await;
            return Err(PortError::Unauthorized(None));
        }
        Ok(record.user.to_domain().map_err(ClientError::from)?)
    }
}

#[async_trait]
impl TaskService for HttpClient {
    async fn list_tasks(&self, query: &TaskQuery) -> PortResult<Vec<Task>> {
        let path = "/tasks";
        let builder = self
            .request(Method::GET, path)
            .await
            .query(&query_pairs(query));
        let response = self.dispatch(builder, path).await?;
        let records: Vec<TaskRecord> = Self::json(response).await?;
        let tasks = records
            .into_iter()
            .map(TaskRecord::to_domain)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ClientError::from)?;
        Ok(tasks)
    }

    async fn get_task(&self, task_id: Uuid) -> PortResult<Task> {
        let path = task_path(task_id);
        let builder = self.request(Method::GET, &path).await;
        Ok(self.fetch_task(builder, &path).await?)
    }

    async fn create_task(&self, task: &NewTask) -> PortResult<Task> {
        let path = "/tasks";
        let builder = self
            .request(Method::POST, path)
            .await
            .json(&NewTaskBody::from(task));
        Ok(self.fetch_task(builder, path).await?)
    }

    async fn update_task(&self, task_id: Uuid, changes: &TaskChanges) -> PortResult<Task> {
        let path = task_path(task_id);
        let builder = self
            .request(Method::PUT, &path)
            .await
            .json(&TaskChangesBody::from(changes));
        Ok(self.fetch_task(builder, &path).await?)
    }

    async fn patch_task(&self, task_id: Uuid, changes: &TaskChanges) -> PortResult<Task> {
        let path = task_path(task_id);
        let builder = self
            .request(Method::PATCH, &path)
            .await
            .json(&TaskChangesBody::from(changes));
        Ok(self.fetch_task(builder, &path).await?)
    }

    async fn delete_task(&self, task_id: Uuid) -> PortResult<()> {
        let path = task_path(task_id);
        let builder = self.request(Method::DELETE, &path).await;
        self.dispatch(builder, &path).await?;
        Ok(())
    }
}
