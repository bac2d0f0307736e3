//! services/app/src/session.rs
//!
//! The client session: the current bearer token and user profile, kept in memory
//! and mirrored to durable storage. One `SessionStore` is built at startup and
//! handed to the HTTP client and every view as an `Arc<SessionStore>`.

use crate::adapters::wire::UserRecord;
use crate::views::describe_failure;
use std::sync::Arc;
use taskdeck_core::domain::{AuthSession, Credentials, Registration, User};
use taskdeck_core::ports::{AuthService, PortError, SessionStorage};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "access_token";
/// Storage key for the serialized user profile.
pub const USER_KEY: &str = "user";

pub const LOGIN_FALLBACK: &str = "Login failed. Please try again.";
pub const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Loading,
    Authenticated,
    Unauthenticated,
}

/// A failed login or registration, with the message to show the user.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct AuthFailure {
    pub message: String,
    #[source]
    pub cause: PortError,
}

#[derive(Debug)]
struct SessionState {
    status: AuthStatus,
    token: Option<String>,
    user: Option<User>,
}

pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    state: RwLock<SessionState>,
}

impl SessionStore {
    /// Creates a store in the `Loading` state. Call `initialize` before use.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            state: RwLock::new(SessionState {
                status: AuthStatus::Loading,
                token: None,
                user: None,
            }),
        }
    }

    /// Creates a store and restores any persisted session.
    pub async fn load(storage: Arc<dyn SessionStorage>) -> Arc<Self> {
        let store = Arc::new(Self::new(storage));
        store.initialize().await;
        store
    }

    /// Restores the persisted token and user profile.
    ///
    /// A session counts only when both are present and the profile parses;
    /// anything less is cleared from storage.
    pub async fn initialize(&self) -> AuthStatus {
        let restored = match self.read_persisted().await {
            Ok(restored) => restored,
            Err(e) => {
                error!("Failed to read persisted session: {:?}", e);
                None
            }
        };

        match restored {
            Some((token, user)) => {
                info!("Restored session for {}", user.email);
                let mut state = self.state.write().await;
                state.token = Some(token);
                state.user = Some(user);
                state.status = AuthStatus::Authenticated;
                AuthStatus::Authenticated
            }
            None => {
                self.clear().await;
                AuthStatus::Unauthenticated
            }
        }
    }

    async fn read_persisted(&self) -> Result<Option<(String, User)>, PortError> {
        let token = self.storage.get(TOKEN_KEY).await?;
        let user = self.storage.get(USER_KEY).await?;
        let (Some(token), Some(user)) = (token, user) else {
            return Ok(None);
        };
        let user = serde_json::from_str::<UserRecord>(&user)
            .map_err(|e| e.to_string())
            .and_then(|record| record.to_domain().map_err(|e| e.to_string()));
        match user {
            Ok(user) => Ok(Some((token, user))),
            Err(e) => {
                warn!("Discarding unreadable cached user profile: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn status(&self) -> AuthStatus {
        self.state.read().await.status
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    /// Makes `session` the current session and persists it.
    pub async fn establish(&self, session: AuthSession) {
        let user_json = serde_json::to_string(&UserRecord::from_domain(&session.user));
        match user_json {
            Ok(user_json) => {
                if let Err(e) = self.storage.set(TOKEN_KEY, &session.token).await {
                    error!("Failed to persist token: {:?}", e);
                }
                if let Err(e) = self.storage.set(USER_KEY, &user_json).await {
                    error!("Failed to persist user profile: {:?}", e);
                }
            }
            Err(e) => error!("Failed to serialize user profile: {:?}", e),
        }

        let mut state = self.state.write().await;
        state.token = Some(session.token);
        state.user = Some(session.user);
        state.status = AuthStatus::Authenticated;
    }

    /// Forgets the session in memory and in storage.
    pub async fn clear(&self) {
        {
            let mut state = self.state.write().await;
            state.token = None;
            state.user = None;
            state.status = AuthStatus::Unauthenticated;
        }
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key).await {
                error!("Failed to remove '{}' from session storage: {:?}", key, e);
            }
        }
    }

    pub async fn login(
        &self,
        api: &dyn AuthService,
        credentials: &Credentials,
    ) -> Result<User, AuthFailure> {
        match api.login(credentials).await {
            Ok(session) => {
                let user = session.user.clone();
                self.establish(session).await;
                info!("Logged in as {}", user.email);
                Ok(user)
            }
            Err(cause) => {
                error!("Login error: {:?}", cause);
                Err(AuthFailure {
                    message: describe_failure(&cause, LOGIN_FALLBACK),
                    cause,
                })
            }
        }
    }

    pub async fn register(
        &self,
        api: &dyn AuthService,
        registration: &Registration,
    ) -> Result<User, AuthFailure> {
        match api.register(registration).await {
            Ok(session) => {
                let user = session.user.clone();
                self.establish(session).await;
                info!("Registered {}", user.email);
                Ok(user)
            }
            Err(cause) => {
                error!("Registration error: {:?}", cause);
                Err(AuthFailure {
                    message: describe_failure(&cause, REGISTER_FALLBACK),
                    cause,
                })
            }
        }
    }

    /// Logs out remotely (best-effort) and always clears the local session.
    pub async fn logout(&self, api: &dyn AuthService) {
        if let Err(e) = api.logout().await {
            warn!("Remote logout failed, clearing local session anyway: {:?}", e);
        }
        self.clear().await;
        info!("Logged out");
    }

    /// Checks the token with the remote service and refreshes the cached profile.
    pub async fn verify(&self, api: &dyn AuthService) -> Result<User, PortError> {
        let user = api.verify().await?;
        let token = self.token().await;
        if let Some(token) = token {
            self.establish(AuthSession {
                token,
                user: user.clone(),
            })
            .await;
        }
        Ok(user)
    }
}
