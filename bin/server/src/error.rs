//! Domain error types for server operations.

use std::fmt;

/// Errors that stop the server from starting or serving.
#[derive(Debug)]
pub enum ServerError {
    /// Configuration is missing or invalid.
    Configuration { details: String },
    /// The allow-list database could not be reached.
    Database { details: String },
    /// The identity provider could not be set up.
    IdentityProvider { details: String },
    /// The photo store could not be set up.
    Storage { details: String },
    /// The embedded templates failed to parse.
    Template { details: String },
    /// The listener could not bind.
    Bind { address: String, details: String },
    /// The HTTP server stopped with an error.
    Serve { details: String },
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { details } => write!(f, "configuration error: {details}"),
            Self::Database { details } => write!(f, "allow-list database error: {details}"),
            Self::IdentityProvider { details } => {
                write!(f, "identity provider error: {details}")
            }
            Self::Storage { details } => write!(f, "photo storage error: {details}"),
            Self::Template { details } => write!(f, "template error: {details}"),
            Self::Bind { address, details } => {
                write!(f, "failed to bind to {address}: {details}")
            }
            Self::Serve { details } => write!(f, "server error: {details}"),
        }
    }
}

impl std::error::Error for ServerError {}
