//! The dashboard: a greeting and task counts.

use crate::session::SessionStore;
use std::sync::Arc;
use taskdeck_core::dashboard::TaskStats;
use taskdeck_core::domain::TaskQuery;
use taskdeck_core::ports::TaskService;
use tracing::{debug, error};

pub const LOGIN_REQUIRED: &str = "Please login to view dashboard";
pub const LOAD_FAILED: &str = "Failed to load dashboard stats. Please try again.";

pub struct DashboardView {
    tasks: Arc<dyn TaskService>,
    session: Arc<SessionStore>,
    stats: TaskStats,
    error: Option<String>,
    loading: bool,
    /// Token the current stats were fetched with.
    seen_token: Option<String>,
}

impl DashboardView {
    pub fn new(tasks: Arc<dyn TaskService>, session: Arc<SessionStore>) -> Self {
        Self {
            tasks,
            session,
            stats: TaskStats::default(),
            error: None,
            loading: false,
            seen_token: None,
        }
    }

    pub fn stats(&self) -> TaskStats {
        self.stats
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Fetches every task and recounts. Without a token nothing is fetched.
    pub async fn refresh(&mut self) {
        let token = self.session.token().await;
        self.seen_token = token.clone();
        self.error = None;

        if token.is_none() {
            self.stats = TaskStats::default();
            self.error = Some(LOGIN_REQUIRED.to_string());
            return;
        }

        self.loading = true;
        match self.tasks.list_tasks(&TaskQuery::default()).await {
            Ok(tasks) => {
                self.stats = TaskStats::from_tasks(&tasks);
                debug!("Dashboard stats: {:?}", self.stats);
            }
            Err(e) => {
                error!("Failed to load dashboard stats: {:?}", e);
                self.error = Some(LOAD_FAILED.to_string());
            }
        }
        self.loading = false;
    }

    /// Refreshes only when the session token differs from the last refresh.
    /// Returns whether a refresh happened.
    pub async fn refresh_if_token_changed(&mut self) -> bool {
        if self.session.token().await == self.seen_token {
            return false;
        }
        self.refresh().await;
        true
    }

    pub async fn greeting(&self) -> String {
        match self.session.user().await {
            Some(user) => format!("Welcome, {} to your todo dashboard.", user.display_name()),
            None => "Welcome to your todo dashboard.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStorage;
    use crate::views::testing::{sample_task, sample_user, FakeTasks};
    use taskdeck_core::domain::{AuthSession, TaskStatus};
    use taskdeck_core::ports::PortError;

    async fn signed_in() -> Arc<SessionStore> {
        let session = SessionStore::load(Arc::new(MemoryStorage::new())).await;
        session
            .establish(AuthSession { token: "tok".into(), user: sample_user() })
            .await;
        session
    }

    #[tokio::test]
    async fn without_token_asks_to_login_and_does_not_fetch() {
        let session = SessionStore::load(Arc::new(MemoryStorage::new())).await;
        let service = Arc::new(FakeTasks::default());
        let mut view = DashboardView::new(service.clone(), session);

        view.refresh().await;

        assert_eq!(view.error(), Some(LOGIN_REQUIRED));
        assert!(service.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn archived_counts_as_pending() {
        let service = Arc::new(FakeTasks::with(vec![
            sample_task("a", TaskStatus::Done, 1),
            sample_task("b", TaskStatus::Archived, 2),
            sample_task("c", TaskStatus::Todo, 3),
        ]));
        let mut view = DashboardView::new(service, signed_in().await);

        view.refresh().await;

        assert_eq!(view.stats(), TaskStats { total: 3, completed: 1, pending: 2 });
        assert_eq!(view.error(), None);
    }

    #[tokio::test]
    async fn fetch_failure_sets_message() {
        let service = Arc::new(FakeTasks::default());
        service.fail_next(PortError::Timeout);
        let mut view = DashboardView::new(service, signed_in().await);

        view.refresh().await;
        assert_eq!(view.error(), Some(LOAD_FAILED));
    }

    #[tokio::test]
    async fn refreshes_when_token_changes() {
        let session = signed_in().await;
        let service = Arc::new(FakeTasks::default());
        let mut view = DashboardView::new(service.clone(), session.clone());

        assert!(view.refresh_if_token_changed().await);
        assert!(!view.refresh_if_token_changed().await);

        session
            .establish(AuthSession { token: "tok-2".into(), user: sample_user() })
            .await;
        assert!(view.refresh_if_token_changed().await);
        assert_eq!(service.calls.lock().unwrap().len(), 2);

        session.clear().await;
        assert!(view.refresh_if_token_changed().await);
        assert_eq!(view.error(), Some(LOGIN_REQUIRED));
    }

    #[tokio::test]
    async fn greeting_uses_email_local_part() {
        let view = DashboardView::new(Arc::new(FakeTasks::default()), signed_in().await);
        assert_eq!(view.greeting().await, "Welcome, ada to your todo dashboard.");
    }
}
