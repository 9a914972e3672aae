//! Photo catalog, selection and batch operations for photo-admin.
//!
//! Photos live in an object store under the `photos/` prefix. This crate
//! lists them into a [`PhotoCatalog`], tracks the operator's
//! [`SelectionSet`], and runs the sequential delete and download batches.
//! Storage and the download destination are reached only through the
//! [`ObjectStore`] and [`SaveTarget`] traits.

pub mod batch;
pub mod catalog;
pub mod error;
pub mod object;
pub mod photo;
pub mod save;
pub mod selection;
pub mod store;

pub use batch::{BatchReport, delete_many, delete_one, download_many, download_one};
pub use catalog::PhotoCatalog;
pub use error::StorageError;
pub use object::{ObjectEntry, ObjectRef, PHOTO_PREFIX};
pub use photo::Photo;
pub use save::{MemorySaveTarget, SaveTarget};
pub use selection::SelectionSet;
pub use store::{MemoryObjectStore, ObjectStore, StoreCall};
