//! Allow-list record types.

/// A row of the admin allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRecord {
    /// Row identifier.
    pub id: String,
    /// Normalized email the row grants admin access to.
    pub email: String,
}

impl AdminRecord {
    /// Creates a new record.
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}
