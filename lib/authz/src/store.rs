//! Allow-list store abstraction.

use crate::error::AuthzError;
use crate::types::AdminRecord;
use async_trait::async_trait;
use photo_admin_core::normalize_email;
use rootcause::prelude::Report;

/// Point lookup into the admin allow-list.
///
/// Callers pass an already-normalized email. Implementations return at most
/// one record; there is no write path.
#[async_trait]
pub trait AllowListStore: Send + Sync {
    /// Finds the allow-list row for an email, if any.
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>, Report<AuthzError>>;
}

/// Allow-list held in memory.
///
/// Emails are normalized on construction, so lookups with a normalized email
/// match regardless of how the list was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryAllowList {
    records: Vec<AdminRecord>,
}

impl MemoryAllowList {
    /// Creates an allow-list from a set of emails.
    ///
    /// Blank entries are skipped.
    #[must_use]
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records = emails
            .into_iter()
            .filter_map(|email| normalize_email(email.as_ref()))
            .enumerate()
            .map(|(index, email)| AdminRecord::new((index + 1).to_string(), email))
            .collect();
        Self { records }
    }

    /// Parses a comma-separated list of emails.
    #[must_use]
    pub fn from_csv(emails: &str) -> Self {
        Self::new(emails.split(','))
    }

    /// Returns the number of allow-listed emails.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nobody is allow-listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl AllowListStore for MemoryAllowList {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminRecord>, Report<AuthzError>> {
        Ok(self.records.iter().find(|r| r.email == email).cloned())
    }
}
