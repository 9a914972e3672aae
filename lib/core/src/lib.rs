//! Core domain types and utilities for photo-admin.
//!
//! This crate provides the foundational types shared by the access,
//! authorization and gallery crates: the `Result` alias used for
//! error propagation and the user identity handed out by the identity
//! provider.

pub mod error;
pub mod identity;

pub use error::Result;
pub use identity::{UserIdentity, normalize_email};
