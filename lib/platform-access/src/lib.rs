//! Identity provider access and the admin gate for photo-admin.
//!
//! This crate provides:
//! - Sessions handed out by the identity provider (`Session`, `SessionToken`)
//! - The provider abstraction (`AuthProvider`) and its change notifications
//!   (`SessionEvent`, `SessionBroadcaster`, `SessionSubscription`)
//! - The gate that turns a session into an admin decision (`AuthGate`)
//! - Provider configuration (`ProviderConfig`)
//! - An in-memory provider for local runs and tests (`MemoryAuthProvider`)
//!
//! # Example
//!
//! ```
//! use photo_admin_authz::{AuthorizationCheck, MemoryAllowList};
//! use photo_admin_core::UserIdentity;
//! use photo_admin_platform_access::{Session, SessionToken};
//! use std::sync::Arc;
//!
//! let check = AuthorizationCheck::new(Arc::new(MemoryAllowList::new(["admin@example.com"])));
//! let session = Session::new(
//!     SessionToken::new("tok_abc123".to_string()),
//!     UserIdentity::with_email("Admin@Example.com"),
//! );
//! assert_eq!(session.email(), Some("Admin@Example.com"));
//! # let _ = check;
//! ```

pub mod error;
pub mod gate;
pub mod memory;
pub mod oidc;
pub mod provider;
pub mod session;
pub mod subscription;

// Re-export main types at crate root
pub use error::{AuthenticationError, SubscriptionError};
pub use gate::{AuthGate, GateChange, GateState, SignInOptions};
pub use memory::MemoryAuthProvider;
pub use oidc::ProviderConfig;
pub use provider::{AuthProvider, SessionEvent, SignInRedirect};
pub use session::{Session, SessionToken};
pub use subscription::{SessionBroadcaster, SessionSubscription};
