//! Error types for the gallery crate.

use std::fmt;

/// Errors from object storage and save targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Listing the photo prefix failed.
    ListFailed { prefix: String, details: String },
    /// A display URL could not be resolved.
    UrlFailed { name: String, details: String },
    /// The raw object content could not be fetched.
    FetchFailed { name: String, details: String },
    /// The object could not be deleted.
    DeleteFailed { name: String, details: String },
    /// Downloaded content could not be written out.
    SaveFailed { name: String, details: String },
    /// The object does not exist.
    NotFound { name: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListFailed { prefix, details } => {
                write!(f, "failed to list objects under '{prefix}': {details}")
            }
            Self::UrlFailed { name, details } => {
                write!(f, "failed to resolve display URL for '{name}': {details}")
            }
            Self::FetchFailed { name, details } => {
                write!(f, "failed to fetch '{name}': {details}")
            }
            Self::DeleteFailed { name, details } => {
                write!(f, "failed to delete '{name}': {details}")
            }
            Self::SaveFailed { name, details } => {
                write!(f, "failed to save '{name}': {details}")
            }
            Self::NotFound { name } => write!(f, "object not found: {name}"),
        }
    }
}

impl std::error::Error for StorageError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_object() {
        let err = StorageError::DeleteFailed {
            name: "a.jpg".to_string(),
            details: "403".to_string(),
        };
        assert_eq!(err.to_string(), "failed to delete 'a.jpg': 403");

        let err = StorageError::NotFound {
            name: "b.jpg".to_string(),
        };
        assert_eq!(err.to_string(), "object not found: b.jpg");
    }

    #[test]
    fn list_failure_names_the_prefix() {
        let err = StorageError::ListFailed {
            prefix: "photos/".to_string(),
            details: "timeout".to_string(),
        };
        assert!(err.to_string().contains("photos/"));
    }
}
