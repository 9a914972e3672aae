//! Object store abstraction.

use crate::error::StorageError;
use crate::object::{ObjectEntry, ObjectRef, PHOTO_PREFIX};
use async_trait::async_trait;
use rootcause::prelude::Report;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The blob store photos are kept in.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists every object under a prefix, in the store's listing order.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectEntry>, Report<StorageError>>;

    /// Resolves a URL the browser can render the object from.
    async fn display_url(&self, object: &ObjectRef) -> Result<String, Report<StorageError>>;

    /// Fetches the raw object content.
    async fn raw_blob(&self, object: &ObjectRef) -> Result<Vec<u8>, Report<StorageError>>;

    /// Deletes the object.
    async fn delete_object(&self, object: &ObjectRef) -> Result<(), Report<StorageError>>;
}

/// A call observed by [`MemoryObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List(String),
    DisplayUrl(String),
    RawBlob(String),
    Delete(String),
}

#[derive(Debug, Default)]
struct MemoryState {
    objects: Vec<(String, Vec<u8>)>,
    calls: Vec<StoreCall>,
    failing_list: bool,
    failing_urls: HashSet<String>,
    failing_fetches: HashSet<String>,
    failing_deletes: HashSet<String>,
}

/// Object store held in memory.
///
/// Records every call and can be told to fail for chosen objects, so it
/// doubles as the store for local demos and for tests.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    state: Mutex<MemoryState>,
}

impl MemoryObjectStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given photos, in listing order.
    #[must_use]
    pub fn with_photos<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let store = Self::new();
        for name in names {
            let name = name.as_ref();
            store.insert(name, name.as_bytes().to_vec());
        }
        store
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds or replaces a photo.
    pub fn insert(&self, name: &str, content: Vec<u8>) {
        let path = ObjectRef::photo(name).path().to_string();
        let mut state = self.state();
        match state.objects.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = content,
            None => state.objects.push((path, content)),
        }
    }

    /// Makes every listing fail.
    pub fn fail_listing(&self) {
        self.state().failing_list = true;
    }

    /// Makes URL resolution fail for a photo.
    pub fn fail_url_for(&self, name: &str) {
        self.state().failing_urls.insert(name.to_string());
    }

    /// Makes fetching fail for a photo.
    pub fn fail_fetch_for(&self, name: &str) {
        self.state().failing_fetches.insert(name.to_string());
    }

    /// Makes deletion fail for a photo.
    pub fn fail_delete_for(&self, name: &str) {
        self.state().failing_deletes.insert(name.to_string());
    }

    /// Returns the names of the stored photos, in listing order.
    #[must_use]
    pub fn photo_names(&self) -> Vec<String> {
        self.state()
            .objects
            .iter()
            .map(|(path, _)| path.strip_prefix(PHOTO_PREFIX).unwrap_or(path).to_string())
            .collect()
    }

    /// Returns every call made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state().calls.clone()
    }

    /// Returns true if no call has been made.
    #[must_use]
    pub fn untouched(&self) -> bool {
        self.state().calls.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectEntry>, Report<StorageError>> {
        let mut state = self.state();
        state.calls.push(StoreCall::List(prefix.to_string()));
        if state.failing_list {
            return Err(StorageError::ListFailed {
                prefix: prefix.to_string(),
                details: "listing disabled".to_string(),
            }
            .into());
        }
        Ok(state
            .objects
            .iter()
            .filter_map(|(path, _)| path.strip_prefix(prefix))
            .map(ObjectEntry::new)
            .collect())
    }

    async fn display_url(&self, object: &ObjectRef) -> Result<String, Report<StorageError>> {
        let mut state = self.state();
        let name = object.name().to_string();
        state.calls.push(StoreCall::DisplayUrl(name.clone()));
        if state.failing_urls.contains(&name) {
            return Err(StorageError::UrlFailed {
                name,
                details: "url resolution disabled".to_string(),
            }
            .into());
        }
        if !state.objects.iter().any(|(p, _)| p == object.path()) {
            return Err(StorageError::NotFound { name }.into());
        }
        Ok(format!("memory://{}", object.path()))
    }

    async fn raw_blob(&self, object: &ObjectRef) -> Result<Vec<u8>, Report<StorageError>> {
        let mut state = self.state();
        let name = object.name().to_string();
        state.calls.push(StoreCall::RawBlob(name.clone()));
        if state.failing_fetches.contains(&name) {
            return Err(StorageError::FetchFailed {
                name,
                details: "fetch disabled".to_string(),
            }
            .into());
        }
        state
            .objects
            .iter()
            .find(|(p, _)| p == object.path())
            .map(|(_, content)| content.clone())
            .ok_or_else(|| StorageError::NotFound { name }.into())
    }

    async fn delete_object(&self, object: &ObjectRef) -> Result<(), Report<StorageError>> {
        let mut state = self.state();
        let name = object.name().to_string();
        state.calls.push(StoreCall::Delete(name.clone()));
        if state.failing_deletes.contains(&name) {
            return Err(StorageError::DeleteFailed {
                name,
                details: "delete disabled".to_string(),
            }
            .into());
        }
        let before = state.objects.len();
        state.objects.retain(|(p, _)| p != object.path());
        if state.objects.len() == before {
            return Err(StorageError::NotFound { name }.into());
        }
        Ok(())
    }
}
