//! Dashboards for signed-in browsers.
//!
//! Every browser that completes a sign-in gets its own [`Dashboard`], found
//! again through the id in its session cookie. Entries expire after the
//! configured session duration and are pruned periodically.

use crate::dashboard::Dashboard;
use chrono::{DateTime, Duration, Utc};
use openidconnect::CsrfToken;
use photo_admin_authz::AuthorizationCheck;
use photo_admin_gallery::ObjectStore;
use photo_admin_platform_access::{AuthProvider, SignInOptions};
use std::collections::HashMap;
use std::sync::{Arc, MutexGuard, PoisonError};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// What every dashboard is built from.
#[derive(Clone)]
pub struct DashboardParts {
    pub authorization: AuthorizationCheck,
    pub sign_in: SignInOptions,
    pub store: Arc<dyn ObjectStore>,
}

struct Entry {
    dashboard: Arc<Mutex<Dashboard>>,
    expires_at: DateTime<Utc>,
}

/// Registry of per-browser dashboards, keyed by session id.
pub struct DashboardSessions {
    parts: DashboardParts,
    sign_in_provider: Arc<dyn AuthProvider>,
    lifetime: Duration,
    entries: std::sync::Mutex<HashMap<String, Entry>>,
}

fn new_session_id() -> String {
    CsrfToken::new_random().secret().clone()
}

impl DashboardSessions {
    /// Creates an empty registry.
    ///
    /// `sign_in_provider` holds no session; it backs the dashboards shown to
    /// browsers that are not signed in.
    pub fn new(
        parts: DashboardParts,
        sign_in_provider: Arc<dyn AuthProvider>,
        lifetime: Duration,
    ) -> Self {
        Self {
            parts,
            sign_in_provider,
            lifetime,
            entries: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// How long a browser session lasts.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn mount(&self, provider: Arc<dyn AuthProvider>) -> Dashboard {
        Dashboard::mount(
            provider,
            self.parts.authorization.clone(),
            self.parts.sign_in.clone(),
            self.parts.store.clone(),
        )
        .await
    }

    /// Mounts a dashboard for a browser without a session.
    ///
    /// It is not registered; callers render it or start a sign-in from it
    /// and then drop it.
    pub async fn anonymous(&self) -> Dashboard {
        self.mount(self.sign_in_provider.clone()).await
    }

    /// Mounts a dashboard over `provider` and registers it under a new id.
    pub async fn open(&self, provider: Arc<dyn AuthProvider>) -> (String, Arc<Mutex<Dashboard>>) {
        let dashboard = Arc::new(Mutex::new(self.mount(provider).await));
        let id = new_session_id();
        self.entries().insert(
            id.clone(),
            Entry {
                dashboard: dashboard.clone(),
                expires_at: Utc::now() + self.lifetime,
            },
        );
        info!("browser session opened");
        (id, dashboard)
    }

    /// Returns the dashboard registered under `id`, unless it has expired.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<Mutex<Dashboard>>> {
        let mut entries = self.entries();
        let expired = entries.get(id)?.expires_at <= Utc::now();
        if expired {
            debug!("browser session expired");
            entries.remove(id);
            return None;
        }
        entries.get(id).map(|entry| entry.dashboard.clone())
    }

    /// Forgets the dashboard registered under `id`.
    pub fn remove(&self, id: &str) -> Option<Arc<Mutex<Dashboard>>> {
        let removed = self.entries().remove(id).map(|entry| entry.dashboard);
        if removed.is_some() {
            info!("browser session closed");
        }
        removed
    }

    /// Drops every expired entry and returns how many were dropped.
    pub fn prune(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewState;
    use photo_admin_authz::MemoryAllowList;
    use photo_admin_gallery::MemoryObjectStore;
    use photo_admin_platform_access::MemoryAuthProvider;

    fn sessions(lifetime: Duration) -> DashboardSessions {
        DashboardSessions::new(
            DashboardParts {
                authorization: AuthorizationCheck::new(Arc::new(MemoryAllowList::new([
                    "admin@example.com",
                ]))),
                sign_in: SignInOptions::new("google".to_string(), "/admin".to_string()),
                store: Arc::new(MemoryObjectStore::with_photos(["a.jpg"])),
            },
            Arc::new(MemoryAuthProvider::new()),
            lifetime,
        )
    }

    fn admin() -> Arc<MemoryAuthProvider> {
        Arc::new(MemoryAuthProvider::signed_in(Some("admin@example.com")))
    }

    #[tokio::test]
    async fn each_browser_gets_its_own_dashboard() {
        let sessions = sessions(Duration::hours(1));
        let (first, _) = sessions.open(admin()).await;
        let (second, _) = sessions.open(admin()).await;

        assert_ne!(first, second);
        assert_eq!(sessions.len(), 2);

        let dashboard = sessions.get(&first).expect("dashboard");
        dashboard.lock().await.toggle("a.jpg");
        let other = sessions.get(&second).expect("dashboard");
        assert!(other.lock().await.selection().is_empty());
    }

    #[tokio::test]
    async fn unknown_ids_have_no_dashboard() {
        let sessions = sessions(Duration::hours(1));
        assert!(sessions.get("nope").is_none());
    }

    #[tokio::test]
    async fn removed_sessions_are_gone() {
        let sessions = sessions(Duration::hours(1));
        let (id, _) = sessions.open(admin()).await;

        assert!(sessions.remove(&id).is_some());
        assert!(sessions.get(&id).is_none());
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn expired_sessions_are_dropped() {
        let sessions = sessions(Duration::seconds(-1));
        let (first, _) = sessions.open(admin()).await;
        sessions.open(admin()).await;

        assert!(sessions.get(&first).is_none());
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions.prune(), 1);
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn anonymous_dashboard_is_signed_out_and_unregistered() {
        let sessions = sessions(Duration::hours(1));
        let dashboard = sessions.anonymous().await;

        assert_eq!(dashboard.view(), ViewState::Unauthenticated);
        assert!(sessions.is_empty());
    }
}
