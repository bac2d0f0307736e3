//! Login and registration forms.

use super::Navigation;
use crate::session::SessionStore;
use std::sync::Arc;
use taskdeck_core::domain::{Credentials, Registration};
use taskdeck_core::ports::AuthService;
use taskdeck_core::validation::{
    validate_login_form, validate_registration_form, FieldError, ValidationResult, GENERAL_FIELD,
};

pub struct LoginView {
    session: Arc<SessionStore>,
    pub email: String,
    pub password: String,
    pub errors: ValidationResult,
    submitting: bool,
}

impl LoginView {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            email: String::new(),
            password: String::new(),
            errors: ValidationResult::default(),
            submitting: false,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn general_error(&self) -> Option<&str> {
        self.errors.message_for(GENERAL_FIELD)
    }

    /// Validates, then logs in. Success leads to the dashboard.
    pub async fn submit(&mut self, api: &dyn AuthService) -> Option<Navigation> {
        self.errors = validate_login_form(self.email.trim(), &self.password);
        if !self.errors.is_valid() {
            return None;
        }
        let credentials = Credentials {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        };

        self.submitting = true;
        let result = self.session.login(api, &credentials).await;
        self.submitting = false;

        match result {
            Ok(_) => Some(Navigation::Dashboard),
            Err(failure) => {
                self.errors.errors.push(FieldError::general(failure.message));
                None
            }
        }
    }
}

pub struct RegisterView {
    session: Arc<SessionStore>,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub errors: ValidationResult,
    submitting: bool,
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl RegisterView {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            email: String::new(),
            password: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            errors: ValidationResult::default(),
            submitting: false,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn general_error(&self) -> Option<&str> {
        self.errors.message_for(GENERAL_FIELD)
    }

    /// Validates, then creates the account and signs in with it.
    pub async fn submit(&mut self, api: &dyn AuthService) -> Option<Navigation> {
        self.errors = validate_registration_form(self.email.trim(), &self.password);
        if !self.errors.is_valid() {
            return None;
        }
        let registration = Registration {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            first_name: optional(&self.first_name),
            last_name: optional(&self.last_name),
        };

        self.submitting = true;
        let result = self.session.register(api, &registration).await;
        self.submitting = false;

        match result {
            Ok(_) => Some(Navigation::Dashboard),
            Err(failure) => {
                self.errors.errors.push(FieldError::general(failure.message));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStorage;
    use crate::session::{AuthStatus, REGISTER_FALLBACK};
    use crate::views::testing::FakeAuth;
    use crate::views::TIMEOUT_MESSAGE;
    use taskdeck_core::ports::PortError;

    async fn session() -> Arc<SessionStore> {
        SessionStore::load(Arc::new(MemoryStorage::new())).await
    }

    #[tokio::test]
    async fn login_validates_before_sending() {
        let mut view = LoginView::new(session().await);
        view.email = "not-an-email".into();

        assert_eq!(view.submit(&FakeAuth::accepting("tok")).await, None);
        assert_eq!(view.errors.message_for("email"), Some("Email is invalid"));
        assert_eq!(view.errors.message_for("password"), Some("Password is required"));
    }

    #[tokio::test]
    async fn login_success_goes_to_dashboard() {
        let session = session().await;
        let mut view = LoginView::new(session.clone());
        view.email = " ada@example.com ".into();
        view.password = "correct horse".into();

        assert_eq!(
            view.submit(&FakeAuth::accepting("tok")).await,
            Some(Navigation::Dashboard)
        );
        assert_eq!(session.status().await, AuthStatus::Authenticated);
    }

    #[tokio::test]
    async fn login_timeout_message() {
        let mut view = LoginView::new(session().await);
        view.email = "ada@example.com".into();
        view.password = "pw".into();

        view.submit(&FakeAuth::failing(PortError::Timeout)).await;
        assert_eq!(view.general_error(), Some(TIMEOUT_MESSAGE));
    }

    #[tokio::test]
    async fn registration_password_length() {
        let mut view = RegisterView::new(session().await);
        view.email = "ada@example.com".into();
        view.password = "short".into();

        assert_eq!(view.submit(&FakeAuth::accepting("tok")).await, None);
        assert_eq!(
            view.errors.message_for("password"),
            Some("Password must be between 8 and 72 characters")
        );
    }

    #[tokio::test]
    async fn registration_failure_falls_back() {
        let mut view = RegisterView::new(session().await);
        view.email = "ada@example.com".into();
        view.password = "long enough".into();

        view.submit(&FakeAuth::failing(PortError::Unexpected("boom".into())))
            .await;
        assert_eq!(view.general_error(), Some(REGISTER_FALLBACK));
    }
}
