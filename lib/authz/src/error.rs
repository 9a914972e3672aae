//! Authorization error types.

use std::fmt;

/// Authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// Failed to reach the allow-list store.
    ConnectionFailed {
        /// Error details.
        details: String,
    },
    /// The allow-list query failed.
    QueryFailed {
        /// The normalized email that was looked up.
        email: String,
        /// Error details.
        details: String,
    },
}

impl fmt::Display for AuthzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed { details } => {
                write!(f, "failed to connect to allow-list store: {}", details)
            }
            Self::QueryFailed { email, details } => {
                write!(f, "allow-list lookup for '{}' failed: {}", email, details)
            }
        }
    }
}

impl std::error::Error for AuthzError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_failed_display_names_email() {
        let err = AuthzError::QueryFailed {
            email: "alice@example.com".to_string(),
            details: "relation \"admins\" does not exist".to_string(),
        };
        assert!(err.to_string().contains("alice@example.com"));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn connection_failed_display() {
        let err = AuthzError::ConnectionFailed {
            details: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("connection refused"));
    }
}
