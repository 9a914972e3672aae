//! The admin authorization check.

use crate::store::AllowListStore;
use photo_admin_core::UserIdentity;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Decides whether an identity may use the admin dashboard.
///
/// The check never fails: a missing identity, a missing email, a store
/// error or an absent row all resolve to `false`.
#[derive(Clone)]
pub struct AuthorizationCheck {
    store: Arc<dyn AllowListStore>,
}

impl AuthorizationCheck {
    /// Creates a check backed by the given allow-list store.
    pub fn new(store: Arc<dyn AllowListStore>) -> Self {
        Self { store }
    }

    /// Returns true if the identity's normalized email is allow-listed.
    pub async fn is_admin(&self, identity: Option<&UserIdentity>) -> bool {
        let Some(identity) = identity else {
            warn!("authorization check without a user");
            return false;
        };
        let Some(email) = identity.normalized_email() else {
            warn!("authorization check for a user without email");
            return false;
        };

        debug!(email = %email, "looking up admin allow-list");
        match self.store.find_by_email(&email).await {
            Ok(record) => {
                let is_admin = record.is_some();
                debug!(email = %email, is_admin, "admin allow-list result");
                is_admin
            }
            Err(e) => {
                error!(email = %email, error = %e, "admin allow-list lookup failed");
                false
            }
        }
    }
}
