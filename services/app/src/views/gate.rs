//! Guards the protected screens behind an authenticated session.

use super::Navigation;
use crate::session::{AuthStatus, SessionStore};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Show the protected content.
    Render,
    /// The session is still being restored.
    Placeholder,
    Redirect(Navigation),
}

pub fn decide(status: AuthStatus) -> GateDecision {
    match status {
        AuthStatus::Authenticated => GateDecision::Render,
        AuthStatus::Loading => GateDecision::Placeholder,
        AuthStatus::Unauthenticated => GateDecision::Redirect(Navigation::Login),
    }
}

pub struct AuthGate {
    session: Arc<SessionStore>,
}

impl AuthGate {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    pub async fn check(&self) -> GateDecision {
        decide(self.session.status().await)
    }
}
