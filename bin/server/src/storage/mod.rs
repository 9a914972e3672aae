//! Object store backends.
//!
//! - `FirebaseStorage`: Firebase Storage over its REST API
//! - `LocalObjectStore`: a local directory, served under `/media`

pub mod firebase;
pub mod local;

pub use firebase::FirebaseStorage;
pub use local::LocalObjectStore;
