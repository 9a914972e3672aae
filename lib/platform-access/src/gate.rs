//! The admin gate.
//!
//! `AuthGate` owns the operator's session and the admin decision derived
//! from it. It resolves the session once when mounted, then follows the
//! provider's change notifications for as long as it lives. Every provider
//! or authorization failure resolves to "not an admin".

use crate::error::SubscriptionError;
use crate::provider::{AuthProvider, SessionEvent, SignInRedirect};
use crate::session::Session;
use crate::subscription::SessionSubscription;
use photo_admin_authz::AuthorizationCheck;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// How the gate starts a provider sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInOptions {
    provider_name: String,
    redirect_target: String,
}

impl SignInOptions {
    /// Creates sign-in options.
    #[must_use]
    pub fn new(provider_name: String, redirect_target: String) -> Self {
        Self {
            provider_name,
            redirect_target,
        }
    }

    /// Returns the provider name.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    /// Returns where the browser lands after sign-in.
    #[must_use]
    pub fn redirect_target(&self) -> &str {
        &self.redirect_target
    }
}

/// The gate's observable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateState {
    session: Option<Session>,
    is_admin: bool,
    loading: bool,
}

impl GateState {
    fn initial() -> Self {
        Self {
            session: None,
            is_admin: false,
            loading: true,
        }
    }

    /// Returns the current session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Returns true if the current user is allow-listed.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Returns true until the first session resolution completes.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

/// The admin flag before and after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateChange {
    /// Admin flag before the change.
    pub was_admin: bool,
    /// Admin flag after the change.
    pub is_admin: bool,
}

impl GateChange {
    /// Returns true only when the admin flag went from false to true.
    #[must_use]
    pub fn admin_granted(&self) -> bool {
        !self.was_admin && self.is_admin
    }

    /// Returns true only when the admin flag went from true to false.
    #[must_use]
    pub fn admin_revoked(&self) -> bool {
        self.was_admin && !self.is_admin
    }
}

/// Owns the session and admin flag for one dashboard.
pub struct AuthGate {
    provider: Arc<dyn AuthProvider>,
    authorization: AuthorizationCheck,
    sign_in: SignInOptions,
    subscription: Option<SessionSubscription>,
    state: GateState,
}

impl AuthGate {
    /// Creates a gate and subscribes to session changes.
    ///
    /// The gate stays loading until [`AuthGate::resolve_initial`] or the
    /// first sign-in/sign-out notification completes.
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        authorization: AuthorizationCheck,
        sign_in: SignInOptions,
    ) -> Self {
        let subscription = provider.subscribe();
        Self {
            provider,
            authorization,
            sign_in,
            subscription: Some(subscription),
            state: GateState::initial(),
        }
    }

    /// Creates a gate and resolves the current session.
    pub async fn mount(
        provider: Arc<dyn AuthProvider>,
        authorization: AuthorizationCheck,
        sign_in: SignInOptions,
    ) -> (Self, GateChange) {
        let mut gate = Self::new(provider, authorization, sign_in);
        let change = gate.resolve_initial().await;
        (gate, change)
    }

    /// Returns the gate's state.
    #[must_use]
    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Returns the current session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.state.session()
    }

    /// Returns true if the current user is allow-listed.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state.is_admin()
    }

    /// Returns true until the first session resolution completes.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Queries the provider for the current session and re-checks admin.
    ///
    /// Loading ends whatever the outcome. A provider error leaves the
    /// session as it was and clears the admin flag.
    pub async fn resolve_initial(&mut self) -> GateChange {
        let was_admin = self.state.is_admin;
        match self.provider.current_session().await {
            Ok(Some(session)) if !session.is_expired() => {
                let is_admin = self.authorization.is_admin(Some(session.user())).await;
                info!(email = ?session.email(), is_admin, "session resolved");
                self.state.session = Some(session);
                self.state.is_admin = is_admin;
            }
            Ok(_) => {
                debug!("no current session");
                self.state.session = None;
                self.state.is_admin = false;
            }
            Err(e) => {
                error!(error = %e, "failed to query current session");
                self.state.is_admin = false;
            }
        }
        self.state.loading = false;
        GateChange {
            was_admin,
            is_admin: self.state.is_admin,
        }
    }

    /// Applies a session-change notification.
    pub async fn apply(&mut self, event: SessionEvent) -> GateChange {
        let was_admin = self.state.is_admin;
        debug!(event = event.kind(), "applying session event");
        match event {
            SessionEvent::SignedIn(session) => {
                let is_admin = self.authorization.is_admin(Some(session.user())).await;
                info!(email = ?session.email(), is_admin, "signed in");
                self.state.session = Some(session);
                self.state.is_admin = is_admin;
                self.state.loading = false;
            }
            SessionEvent::TokenRefreshed(session) => {
                self.state.session = Some(session);
            }
            SessionEvent::SignedOut => {
                info!("signed out");
                self.state.session = None;
                self.state.is_admin = false;
                self.state.loading = false;
            }
        }
        GateChange {
            was_admin,
            is_admin: self.state.is_admin,
        }
    }

    /// Waits for the next notification and applies it.
    ///
    /// Returns `None` once the gate is torn down or the provider closed the
    /// channel.
    pub async fn next_change(&mut self) -> Option<GateChange> {
        let received = self.subscription.as_mut()?.recv().await;
        self.handle_received(received).await
    }

    /// Applies every notification already queued, without waiting.
    ///
    /// A session found expired afterwards is re-queried from the provider;
    /// unless the provider hands back a live session, the gate signs out.
    pub async fn pending_changes(&mut self) -> Vec<GateChange> {
        let mut changes = Vec::new();
        loop {
            let received = match self.subscription.as_mut() {
                Some(subscription) => subscription.try_recv(),
                None => break,
            };
            match received {
                Ok(None) => break,
                Ok(Some(event)) => changes.push(self.apply(event).await),
                Err(e) => match self.handle_received(Err(e)).await {
                    Some(change) => changes.push(change),
                    None => break,
                },
            }
        }
        if self.state.session.as_ref().is_some_and(Session::is_expired) {
            changes.push(self.resolve_expired().await);
        }
        changes
    }

    async fn resolve_expired(&mut self) -> GateChange {
        info!("session expired, re-querying provider");
        match self.provider.current_session().await {
            Ok(Some(session)) if !session.is_expired() => {
                self.apply(SessionEvent::SignedIn(session)).await
            }
            Ok(_) => self.apply(SessionEvent::SignedOut).await,
            Err(e) => {
                error!(error = %e, "failed to re-query expired session");
                self.apply(SessionEvent::SignedOut).await
            }
        }
    }

    async fn handle_received(
        &mut self,
        received: Result<SessionEvent, SubscriptionError>,
    ) -> Option<GateChange> {
        match received {
            Ok(event) => Some(self.apply(event).await),
            Err(SubscriptionError::Lagged { missed }) => {
                warn!(missed, "missed session notifications, re-querying session");
                Some(self.resolve_initial().await)
            }
            Err(SubscriptionError::Closed) => {
                warn!("session notifications closed");
                self.subscription = None;
                None
            }
        }
    }

    /// Asks the provider where to send the browser to sign in.
    ///
    /// Failures are logged and yield `None`.
    pub async fn sign_in(&self) -> Option<SignInRedirect> {
        match self
            .provider
            .sign_in_with_provider(self.sign_in.provider_name(), self.sign_in.redirect_target())
            .await
        {
            Ok(redirect) => Some(redirect),
            Err(e) => {
                error!(
                    provider = self.sign_in.provider_name(),
                    error = %e,
                    "failed to start sign-in"
                );
                None
            }
        }
    }

    /// Signs out and clears the session, even if the provider call fails.
    pub async fn sign_out(&mut self) -> GateChange {
        if let Err(e) = self.provider.sign_out().await {
            error!(error = %e, "provider sign-out failed");
        }
        self.apply(SessionEvent::SignedOut).await
    }

    /// Releases the session subscription.
    pub fn teardown(mut self) {
        self.subscription.take();
        debug!("auth gate torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthenticationError;
    use crate::session::SessionToken;
    use crate::subscription::SessionBroadcaster;
    use async_trait::async_trait;
    use photo_admin_authz::MemoryAllowList;
    use photo_admin_core::UserIdentity;
    use rootcause::prelude::Report;
    use std::sync::Mutex;

    /// Provider double driven by the test.
    struct FakeProvider {
        current: Mutex<Result<Option<Session>, AuthenticationError>>,
        broadcaster: SessionBroadcaster,
        sign_outs: Mutex<usize>,
        fail_sign_out: bool,
    }

    impl FakeProvider {
        fn with_session(session: Option<Session>) -> Arc<Self> {
            Arc::new(Self {
                current: Mutex::new(Ok(session)),
                broadcaster: SessionBroadcaster::new(),
                sign_outs: Mutex::new(0),
                fail_sign_out: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                current: Mutex::new(Err(AuthenticationError::ProviderError {
                    provider: "google".to_string(),
                    reason: "unreachable".to_string(),
                })),
                broadcaster: SessionBroadcaster::new(),
                sign_outs: Mutex::new(0),
                fail_sign_out: true,
            })
        }
    }

    #[async_trait]
    impl AuthProvider for FakeProvider {
        async fn current_session(&self) -> Result<Option<Session>, Report<AuthenticationError>> {
            self.current.lock().unwrap().clone().map_err(|e| e.into())
        }

        fn subscribe(&self) -> SessionSubscription {
            self.broadcaster.subscribe()
        }

        async fn sign_in_with_provider(
            &self,
            provider: &str,
            redirect_target: &str,
        ) -> Result<SignInRedirect, Report<AuthenticationError>> {
            if provider != "google" {
                return Err(AuthenticationError::UnsupportedProvider {
                    provider: provider.to_string(),
                }
                .into());
            }
            Ok(SignInRedirect {
                url: format!("https://accounts.example.com/auth?next={redirect_target}"),
                handoff: Some("state".to_string()),
            })
        }

        async fn sign_out(&self) -> Result<(), Report<AuthenticationError>> {
            *self.sign_outs.lock().unwrap() += 1;
            if self.fail_sign_out {
                return Err(AuthenticationError::ProviderError {
                    provider: "google".to_string(),
                    reason: "unreachable".to_string(),
                }
                .into());
            }
            Ok(())
        }
    }

    fn session_for(email: &str) -> Session {
        Session::new(SessionToken::from("tok"), UserIdentity::with_email(email))
    }

    fn expired_session_for(email: &str) -> Session {
        Session::with_expiry(
            SessionToken::from("tok_old"),
            UserIdentity::with_email(email),
            chrono::Duration::seconds(-1),
        )
    }

    fn check() -> AuthorizationCheck {
        AuthorizationCheck::new(Arc::new(MemoryAllowList::new(["admin@example.com"])))
    }

    fn options() -> SignInOptions {
        SignInOptions::new("google".to_string(), "/admin".to_string())
    }

    #[tokio::test]
    async fn loading_until_initial_resolution() {
        let provider = FakeProvider::with_session(None);
        let mut gate = AuthGate::new(provider, check(), options());
        assert!(gate.is_loading());

        gate.resolve_initial().await;
        assert!(!gate.is_loading());
        assert!(gate.session().is_none());
        assert!(!gate.is_admin());
    }

    #[tokio::test]
    async fn loading_ends_even_when_provider_fails() {
        let provider = FakeProvider::failing();
        let mut gate = AuthGate::new(provider, check(), options());
        assert!(gate.is_loading());

        let change = gate.resolve_initial().await;
        assert!(!gate.is_loading());
        assert!(!gate.is_admin());
        assert!(gate.session().is_none());
        assert!(!change.admin_granted());
    }

    #[tokio::test]
    async fn mount_with_admin_session_grants_admin() {
        let provider = FakeProvider::with_session(Some(session_for("Admin@Example.com")));
        let (gate, change) = AuthGate::mount(provider, check(), options()).await;

        assert!(gate.is_admin());
        assert!(change.admin_granted());
        assert_eq!(
            gate.session().and_then(Session::email),
            Some("Admin@Example.com")
        );
    }

    #[tokio::test]
    async fn mount_with_other_session_is_not_admin() {
        let provider = FakeProvider::with_session(Some(session_for("guest@example.com")));
        let (gate, change) = AuthGate::mount(provider, check(), options()).await;

        assert!(!gate.is_admin());
        assert!(gate.session().is_some());
        assert!(!change.admin_granted());
    }

    #[tokio::test]
    async fn sign_in_notification_ends_loading_and_grants_admin() {
        let provider = FakeProvider::with_session(None);
        let mut gate = AuthGate::new(provider.clone(), check(), options());

        provider
            .broadcaster
            .publish(SessionEvent::SignedIn(session_for("admin@example.com")));
        let change = gate.next_change().await.expect("change");

        assert!(!gate.is_loading());
        assert!(gate.is_admin());
        assert!(change.admin_granted());
    }

    #[tokio::test]
    async fn admin_granted_fires_only_on_transition() {
        let provider = FakeProvider::with_session(Some(session_for("admin@example.com")));
        let (mut gate, first) = AuthGate::mount(provider.clone(), check(), options()).await;
        assert!(first.admin_granted());

        provider
            .broadcaster
            .publish(SessionEvent::SignedIn(session_for("admin@example.com")));
        let changes = gate.pending_changes().await;

        assert_eq!(changes.len(), 1);
        assert!(!changes[0].admin_granted());
        assert!(gate.is_admin());
    }

    #[tokio::test]
    async fn sign_out_notification_clears_session() {
        let provider = FakeProvider::with_session(Some(session_for("admin@example.com")));
        let (mut gate, _) = AuthGate::mount(provider.clone(), check(), options()).await;

        provider.broadcaster.publish(SessionEvent::SignedOut);
        let changes = gate.pending_changes().await;

        assert_eq!(changes.len(), 1);
        assert!(changes[0].admin_revoked());
        assert!(gate.session().is_none());
        assert!(!gate.is_admin());
    }

    #[tokio::test]
    async fn token_refresh_keeps_admin_flag() {
        let provider = FakeProvider::with_session(Some(session_for("admin@example.com")));
        let (mut gate, _) = AuthGate::mount(provider.clone(), check(), options()).await;

        let refreshed = Session::new(
            SessionToken::from("tok_refreshed"),
            UserIdentity::with_email("admin@example.com"),
        );
        provider
            .broadcaster
            .publish(SessionEvent::TokenRefreshed(refreshed));
        let changes = gate.pending_changes().await;

        assert_eq!(changes.len(), 1);
        assert!(gate.is_admin());
        assert_eq!(
            gate.session().map(|s| s.token().as_str()),
            Some("tok_refreshed")
        );
    }

    #[tokio::test]
    async fn pending_changes_is_empty_without_notifications() {
        let provider = FakeProvider::with_session(None);
        let (mut gate, _) = AuthGate::mount(provider, check(), options()).await;
        assert!(gate.pending_changes().await.is_empty());
    }

    #[tokio::test]
    async fn sign_out_clears_state_even_if_provider_fails() {
        let provider = FakeProvider::failing();
        let mut gate = AuthGate::new(provider.clone(), check(), options());
        gate.apply(SessionEvent::SignedIn(session_for("admin@example.com")))
            .await;
        assert!(gate.is_admin());

        let change = gate.sign_out().await;

        assert!(change.admin_revoked());
        assert!(gate.session().is_none());
        assert_eq!(*provider.sign_outs.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn sign_in_uses_configured_provider_and_target() {
        let provider = FakeProvider::with_session(None);
        let gate = AuthGate::new(provider, check(), options());

        let redirect = gate.sign_in().await.expect("redirect");
        assert!(redirect.url.ends_with("next=/admin"));
    }

    #[tokio::test]
    async fn sign_in_failure_yields_none() {
        let provider = FakeProvider::with_session(None);
        let gate = AuthGate::new(
            provider,
            check(),
            SignInOptions::new("github".to_string(), "/admin".to_string()),
        );
        assert!(gate.sign_in().await.is_none());
    }

    #[tokio::test]
    async fn teardown_releases_subscription() {
        let provider = FakeProvider::with_session(None);
        let (gate, _) = AuthGate::mount(provider.clone(), check(), options()).await;
        assert_eq!(provider.broadcaster.subscriber_count(), 1);

        gate.teardown();
        assert_eq!(provider.broadcaster.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn dropping_gate_releases_subscription() {
        let provider = FakeProvider::with_session(None);
        {
            let _gate = AuthGate::new(provider.clone(), check(), options());
            assert_eq!(provider.broadcaster.subscriber_count(), 1);
        }
        assert_eq!(provider.broadcaster.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn lagged_subscription_requeries_session() {
        let provider = FakeProvider::with_session(Some(session_for("admin@example.com")));
        let mut gate = AuthGate::new(provider.clone(), check(), options());
        for _ in 0..20 {
            provider.broadcaster.publish(SessionEvent::SignedOut);
        }

        let changes = gate.pending_changes().await;

        // Re-query grants admin, then the surviving sign-outs revoke it.
        assert!(changes[0].admin_granted());
        assert!(!gate.is_admin());
        assert!(!gate.is_loading());
    }

    #[tokio::test]
    async fn expired_session_at_mount_is_no_session() {
        let provider = FakeProvider::with_session(Some(expired_session_for("admin@example.com")));
        let (gate, change) = AuthGate::mount(provider, check(), options()).await;

        assert!(!gate.is_loading());
        assert!(gate.session().is_none());
        assert!(!change.admin_granted());
    }

    #[tokio::test]
    async fn expired_session_signs_out_on_next_sync() {
        let provider = FakeProvider::with_session(None);
        let mut gate = AuthGate::new(provider.clone(), check(), options());
        gate.apply(SessionEvent::SignedIn(expired_session_for("admin@example.com")))
            .await;
        assert!(gate.is_admin());

        let changes = gate.pending_changes().await;

        assert_eq!(changes.len(), 1);
        assert!(changes[0].admin_revoked());
        assert!(gate.session().is_none());
    }

    #[tokio::test]
    async fn expired_session_is_replaced_by_a_live_one() {
        let provider = FakeProvider::with_session(Some(session_for("admin@example.com")));
        let mut gate = AuthGate::new(provider.clone(), check(), options());
        gate.apply(SessionEvent::SignedIn(expired_session_for("admin@example.com")))
            .await;

        let changes = gate.pending_changes().await;

        assert_eq!(changes.len(), 1);
        assert!(!changes[0].admin_revoked());
        assert!(gate.is_admin());
        assert_eq!(gate.session().map(|s| s.token().as_str()), Some("tok"));
    }

    #[tokio::test]
    async fn expired_session_signs_out_when_provider_fails() {
        let provider = FakeProvider::failing();
        let mut gate = AuthGate::new(provider.clone(), check(), options());
        gate.apply(SessionEvent::SignedIn(expired_session_for("admin@example.com")))
            .await;

        gate.pending_changes().await;

        assert!(gate.session().is_none());
        assert!(!gate.is_admin());
    }
}
