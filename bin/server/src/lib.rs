//! photo-admin web server.
//!
//! Serves the admin dashboard for a photo gallery: sign-in through an OIDC
//! provider, an allow-list admin check, and bulk management of the photos in
//! an object store. Each signed-in browser works on its own dashboard.

pub mod app;
pub mod attachment;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod pages;
pub mod sessions;
pub mod storage;
pub mod view;
