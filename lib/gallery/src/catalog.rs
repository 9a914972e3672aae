//! The in-memory photo list.

use crate::error::StorageError;
use crate::object::{ObjectRef, PHOTO_PREFIX};
use crate::photo::Photo;
use crate::store::ObjectStore;
use futures::future::try_join_all;
use rootcause::prelude::Report;
use tracing::{error, info, instrument};

/// Photos listed from the store, most recently listed first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoCatalog {
    photos: Vec<Photo>,
}

impl PhotoCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the catalog with everything under the photo prefix.
    ///
    /// Display URLs are resolved concurrently and the catalog is only
    /// replaced once every one of them resolved. On any failure the catalog
    /// is left as it was and the error is returned after being logged.
    #[instrument(skip_all)]
    pub async fn load(&mut self, store: &dyn ObjectStore) -> Result<usize, Report<StorageError>> {
        match Self::fetch(store).await {
            Ok(photos) => {
                info!(count = photos.len(), "photo catalog loaded");
                self.photos = photos;
                Ok(self.photos.len())
            }
            Err(e) => {
                error!(error = %e, "failed to load photo catalog");
                Err(e)
            }
        }
    }

    async fn fetch(store: &dyn ObjectStore) -> Result<Vec<Photo>, Report<StorageError>> {
        let entries = store.list_objects(PHOTO_PREFIX).await?;
        let mut photos = try_join_all(entries.into_iter().map(|entry| async move {
            let url = store.display_url(&ObjectRef::photo(&entry.name)).await?;
            Ok::<_, Report<StorageError>>(Photo::new(entry.name, url))
        }))
        .await?;
        photos.reverse();
        Ok(photos)
    }

    /// Returns the photos in display order.
    #[must_use]
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// Returns the photo names in display order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.photos.iter().map(|p| p.name.clone()).collect()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Photo> {
        self.photos.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Drops a photo from the list.
    pub fn remove(&mut self, name: &str) -> Option<Photo> {
        let index = self.photos.iter().position(|p| p.name == name)?;
        Some(self.photos.remove(index))
    }

    /// Empties the list.
    pub fn clear(&mut self) {
        self.photos.clear();
    }
}
