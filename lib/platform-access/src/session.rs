//! Sessions handed out by the identity provider.
//!
//! A session pairs an opaque provider token with the identity of the user
//! it was issued to. Provider adapters normalize whatever their SDK returns
//! into this one shape.

use chrono::{DateTime, Duration, Utc};
use photo_admin_core::UserIdentity;
use serde::{Deserialize, Serialize};

/// Opaque token identifying a provider session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Creates a new session token from a string.
    #[must_use]
    pub fn new(token: String) -> Self {
        Self(token)
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An authenticated provider session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Provider token for this session.
    token: SessionToken,
    /// The user the session was issued to.
    user: UserIdentity,
    /// When the session was created.
    created_at: DateTime<Utc>,
    /// When the provider says the session stops being valid, if it says.
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a session with no known expiry.
    #[must_use]
    pub fn new(token: SessionToken, user: UserIdentity) -> Self {
        Self {
            token,
            user,
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    /// Creates a session that expires after the given duration.
    #[must_use]
    pub fn with_expiry(token: SessionToken, user: UserIdentity, duration: Duration) -> Self {
        let mut session = Self::new(token, user);
        session.expires_at = Some(session.created_at + duration);
        session
    }

    /// Returns the provider token.
    #[must_use]
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Returns the user the session belongs to.
    #[must_use]
    pub fn user(&self) -> &UserIdentity {
        &self.user
    }

    /// Returns the user's email as reported by the provider.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.user.email()
    }

    /// Returns when the session was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the session expires, if known.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns true if the session has a known expiry in the past.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }

    /// Replaces the token after the provider refreshed it.
    pub fn refresh(&mut self, token: SessionToken, duration: Option<Duration>) {
        self.token = token;
        self.expires_at = duration.map(|d| Utc::now() + d);
    }
}
