//! Photos kept in a local directory.

use async_trait::async_trait;
use photo_admin_gallery::{ObjectEntry, ObjectRef, ObjectStore, StorageError};
use rootcause::prelude::Report;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// URL prefix the root directory is served under.
pub const MEDIA_ROUTE: &str = "/media";

/// Photo store rooted at a local directory.
///
/// Object paths map to files below the root, so `photos/a.jpg` is
/// `<root>/photos/a.jpg` and is displayed from `/media/photos/a.jpg`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves an object to its file, refusing names that leave its directory.
    fn file_path(&self, object: &ObjectRef) -> Option<PathBuf> {
        let name = object.name();
        let plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        plain.then(|| self.root.join(object.path()))
    }

    fn not_found(object: &ObjectRef) -> Report<StorageError> {
        StorageError::NotFound {
            name: object.name().to_string(),
        }
        .into()
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    #[instrument(skip(self))]
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectEntry>, Report<StorageError>> {
        let list_failed = |e: io::Error| StorageError::ListFailed {
            prefix: prefix.to_string(),
            details: e.to_string(),
        };

        let directory = self.root.join(prefix);
        let mut reader = match tokio::fs::read_dir(&directory).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(list_failed(e).into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = reader.next_entry().await.map_err(list_failed)? {
            let file_type = entry.file_type().await.map_err(list_failed)?;
            if !file_type.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        debug!(count = names.len(), "listed objects");
        Ok(names.into_iter().map(ObjectEntry::new).collect())
    }

    async fn display_url(&self, object: &ObjectRef) -> Result<String, Report<StorageError>> {
        let path = self.file_path(object).ok_or_else(|| Self::not_found(object))?;
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Ok(format!("{MEDIA_ROUTE}/{}", object.path())),
            Ok(false) => Err(Self::not_found(object)),
            Err(e) => Err(StorageError::UrlFailed {
                name: object.name().to_string(),
                details: e.to_string(),
            }
            .into()),
        }
    }

    #[instrument(skip(self, object), fields(object = %object))]
    async fn raw_blob(&self, object: &ObjectRef) -> Result<Vec<u8>, Report<StorageError>> {
        let path = self.file_path(object).ok_or_else(|| Self::not_found(object))?;
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Self::not_found(object)
            } else {
                StorageError::FetchFailed {
                    name: object.name().to_string(),
                    details: e.to_string(),
                }
                .into()
            }
        })
    }

    #[instrument(skip(self, object), fields(object = %object))]
    async fn delete_object(&self, object: &ObjectRef) -> Result<(), Report<StorageError>> {
        let path = self.file_path(object).ok_or_else(|| Self::not_found(object))?;
        tokio::fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Self::not_found(object)
            } else {
                StorageError::DeleteFailed {
                    name: object.name().to_string(),
                    details: e.to_string(),
                }
                .into()
            }
        })
    }
}
