//! Object references in the photo store.

use serde::{Deserialize, Serialize};

/// Prefix every photo object lives under.
pub const PHOTO_PREFIX: &str = "photos/";

/// Full path of an object in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef(String);

impl ObjectRef {
    /// References the photo with the given name.
    #[must_use]
    pub fn photo(name: &str) -> Self {
        Self(format!("{PHOTO_PREFIX}{name}"))
    }

    /// Returns the full object path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.0
    }

    /// Returns the object name without the photo prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.strip_prefix(PHOTO_PREFIX).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry from a store listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Object name relative to the listed prefix.
    pub name: String,
}

impl ObjectEntry {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
