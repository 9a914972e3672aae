//! Authentication for the photo-admin server.
//!
//! This module provides:
//! - OIDC sign-in with an external identity provider (`OidcClient`, `OidcAuthProvider`)
//! - Session cookies and the per-browser dashboard extractor
//! - The login, callback and logout routes
//!
//! Whether a signed-in user may administer photos is decided separately by
//! the admin gate, against the allow-list.

pub mod middleware;
pub mod oidc;
pub mod routes;

pub use middleware::RequireDashboard;
pub use oidc::{OidcAuthProvider, OidcClient};
pub use routes::{callback, login, logout};
