//! The photo record shown on the dashboard.

use serde::{Deserialize, Serialize};

/// A listed photo with its resolved display URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Storage key, unique within the catalog.
    pub name: String,
    /// URL the browser renders the photo from.
    pub url: String,
}

impl Photo {
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}
