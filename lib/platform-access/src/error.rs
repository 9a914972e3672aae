//! Error types for the platform-access crate.
//!
//! - `AuthenticationError`: identity provider failures
//! - `SubscriptionError`: failures receiving session-change notifications

use std::fmt;

/// Errors from authentication operations.
///
/// These errors represent failures in talking to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// The identity provider returned an error or could not be reached.
    ProviderError { provider: String, reason: String },
    /// Sign-in was requested for a provider this deployment does not use.
    UnsupportedProvider { provider: String },
    /// A sign-in callback arrived without a matching pending sign-in.
    NoPendingSignIn,
    /// The callback state did not match the pending sign-in.
    StateMismatch,
    /// The provider's token could not be validated.
    InvalidToken { reason: String },
    /// Missing required claim in token.
    MissingClaim { claim: String },
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderError { provider, reason } => {
                write!(f, "identity provider '{provider}' error: {reason}")
            }
            Self::UnsupportedProvider { provider } => {
                write!(f, "unsupported identity provider: {provider}")
            }
            Self::NoPendingSignIn => {
                write!(f, "no sign-in is pending")
            }
            Self::StateMismatch => {
                write!(f, "sign-in state does not match")
            }
            Self::InvalidToken { reason } => {
                write!(f, "invalid token: {reason}")
            }
            Self::MissingClaim { claim } => {
                write!(f, "missing required claim: {claim}")
            }
        }
    }
}

impl std::error::Error for AuthenticationError {}

/// Errors from a session-change subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The subscriber fell behind and missed notifications.
    Lagged { missed: u64 },
    /// The provider side of the channel is gone.
    Closed,
}

impl fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lagged { missed } => {
                write!(f, "missed {missed} session notifications")
            }
            Self::Closed => write!(f, "session notifications closed"),
        }
    }
}

impl std::error::Error for SubscriptionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display() {
        let err = AuthenticationError::ProviderError {
            provider: "google".to_string(),
            reason: "connection timeout".to_string(),
        };
        assert!(err.to_string().contains("google"));
        assert!(err.to_string().contains("connection timeout"));
    }

    #[test]
    fn unsupported_provider_display() {
        let err = AuthenticationError::UnsupportedProvider {
            provider: "github".to_string(),
        };
        assert!(err.to_string().contains("github"));
    }

    #[test]
    fn missing_claim_display() {
        let err = AuthenticationError::MissingClaim {
            claim: "email".to_string(),
        };
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn lagged_display() {
        let err = SubscriptionError::Lagged { missed: 3 };
        assert!(err.to_string().contains('3'));
    }
}
