//! Admin allow-list authorization for photo-admin.
//!
//! Authorization is a single point lookup: a user is an admin when the
//! `admins` table holds a row for their normalized email. Every failure
//! path resolves to "not an admin".

mod check;
mod error;
mod postgres;
mod store;
mod types;

pub use check::AuthorizationCheck;
pub use error::AuthzError;
pub use postgres::PgAllowList;
pub use store::{AllowListStore, MemoryAllowList};
pub use types::AdminRecord;
