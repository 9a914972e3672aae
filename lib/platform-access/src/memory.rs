//! Identity provider held in memory.

use crate::error::AuthenticationError;
use crate::provider::{AuthProvider, SessionEvent, SignInRedirect};
use crate::session::{Session, SessionToken};
use crate::subscription::{SessionBroadcaster, SessionSubscription};
use async_trait::async_trait;
use chrono::Duration;
use photo_admin_core::UserIdentity;
use rootcause::prelude::Report;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MemoryState {
    current: Option<Session>,
    failing: bool,
    sign_in_requests: Vec<(String, String)>,
    issued: u64,
}

/// Provider whose sessions are set directly by the caller.
///
/// Signing in and out publishes the same notifications a real provider
/// would, so gates built on it behave as they do in production.
#[derive(Debug, Default)]
pub struct MemoryAuthProvider {
    broadcaster: SessionBroadcaster,
    state: Mutex<MemoryState>,
}

impl MemoryAuthProvider {
    /// Creates a provider with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider with a session already established.
    #[must_use]
    pub fn signed_in(email: Option<&str>) -> Self {
        let provider = Self::new();
        let session = provider.issue(email, None);
        provider.state().current = Some(session);
        provider
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue(&self, email: Option<&str>, lifetime: Option<Duration>) -> Session {
        let mut state = self.state();
        state.issued += 1;
        let user = match email {
            Some(email) => UserIdentity::with_email(email),
            None => UserIdentity::anonymous(),
        };
        let token = SessionToken::new(format!("mem_{}", state.issued));
        match lifetime {
            Some(lifetime) => Session::with_expiry(token, user, lifetime),
            None => Session::new(token, user),
        }
    }

    fn establish(&self, session: Session) -> Session {
        self.state().current = Some(session.clone());
        self.broadcaster
            .publish(SessionEvent::SignedIn(session.clone()));
        session
    }

    /// Signs a user in and announces it.
    pub fn sign_in_as(&self, email: Option<&str>) -> Session {
        let session = self.issue(email, None);
        self.establish(session)
    }

    /// Signs a user in with a session that ends after `lifetime`.
    pub fn sign_in_for(&self, email: Option<&str>, lifetime: Duration) -> Session {
        let session = self.issue(email, Some(lifetime));
        self.establish(session)
    }

    /// Ends the session without being asked, as an expiring provider would.
    pub fn expire(&self) {
        self.state().current = None;
        self.broadcaster.publish(SessionEvent::SignedOut);
    }

    /// Makes session queries fail until turned off again.
    pub fn fail_queries(&self, failing: bool) {
        self.state().failing = failing;
    }

    /// Returns every `(provider, redirect_target)` sign-in request received.
    #[must_use]
    pub fn sign_in_requests(&self) -> Vec<(String, String)> {
        self.state().sign_in_requests.clone()
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.broadcaster.subscriber_count()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn current_session(&self) -> Result<Option<Session>, Report<AuthenticationError>> {
        let state = self.state();
        if state.failing {
            return Err(AuthenticationError::ProviderError {
                provider: "memory".to_string(),
                reason: "session queries disabled".to_string(),
            }
            .into());
        }
        Ok(state.current.clone())
    }

    fn subscribe(&self) -> SessionSubscription {
        self.broadcaster.subscribe()
    }

    async fn sign_in_with_provider(
        &self,
        provider: &str,
        redirect_target: &str,
    ) -> Result<SignInRedirect, Report<AuthenticationError>> {
        self.state()
            .sign_in_requests
            .push((provider.to_string(), redirect_target.to_string()));
        Ok(SignInRedirect {
            url: redirect_target.to_string(),
            handoff: None,
        })
    }

    async fn sign_out(&self) -> Result<(), Report<AuthenticationError>> {
        self.expire();
        Ok(())
    }
}
