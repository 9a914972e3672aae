//! The identity provider abstraction.

use crate::error::AuthenticationError;
use crate::session::Session;
use crate::subscription::SessionSubscription;
use async_trait::async_trait;
use rootcause::prelude::Report;

/// A change in the provider's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A user signed in.
    SignedIn(Session),
    /// The provider refreshed the token of the current session.
    TokenRefreshed(Session),
    /// The user signed out or the provider invalidated the session.
    SignedOut,
}

impl SessionEvent {
    /// Returns a short name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SignedIn(_) => "signed_in",
            Self::TokenRefreshed(_) => "token_refreshed",
            Self::SignedOut => "signed_out",
        }
    }
}

/// Where to send the browser to start a provider sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRedirect {
    /// The provider URL to redirect to.
    pub url: String,
    /// Opaque sign-in state the browser must carry back to the callback,
    /// for providers that complete sign-in through one.
    pub handoff: Option<String>,
}

/// An external identity provider.
///
/// Implementations own the provider session and announce every change to it
/// through the subscriptions they hand out.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the current session, if any.
    async fn current_session(&self) -> Result<Option<Session>, Report<AuthenticationError>>;

    /// Subscribes to session changes.
    ///
    /// Dropping the returned subscription unsubscribes.
    fn subscribe(&self) -> SessionSubscription;

    /// Starts a sign-in with the named provider.
    ///
    /// `redirect_target` is where the browser lands once sign-in completes.
    async fn sign_in_with_provider(
        &self,
        provider: &str,
        redirect_target: &str,
    ) -> Result<SignInRedirect, Report<AuthenticationError>>;

    /// Ends the current session.
    async fn sign_out(&self) -> Result<(), Report<AuthenticationError>>;
}
