//! User identity as reported by the identity provider.
//!
//! The identity is immutable for the lifetime of a session. Authorization
//! keys on the normalized form of the email address, so every lookup goes
//! through [`normalize_email`].

use serde::{Deserialize, Serialize};

/// Lower-cases and trims an email address.
///
/// Returns `None` when nothing is left after trimming.
#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// The identity of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Email address as the provider reported it.
    email: Option<String>,
}

impl UserIdentity {
    /// Creates an identity with the given email.
    #[must_use]
    pub fn new(email: Option<String>) -> Self {
        Self { email }
    }

    /// Creates an identity from an email address.
    #[must_use]
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
        }
    }

    /// Creates an identity with no email claim.
    #[must_use]
    pub fn anonymous() -> Self {
        Self { email: None }
    }

    /// Returns the email exactly as reported by the provider.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the email used for allow-list lookups.
    #[must_use]
    pub fn normalized_email(&self) -> Option<String> {
        self.email.as_deref().and_then(normalize_email)
    }
}
