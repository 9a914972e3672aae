//! Where downloaded photos are written.

use crate::error::StorageError;
use async_trait::async_trait;
use rootcause::prelude::Report;
use std::sync::{Mutex, PoisonError};

/// A destination for downloaded content.
#[async_trait]
pub trait SaveTarget: Send + Sync {
    /// Saves content under a suggested file name.
    async fn save_as(&self, suggested_name: &str, content: &[u8]) -> Result<(), Report<StorageError>>;
}

/// Save target that keeps every saved file in memory.
#[derive(Debug, Default)]
pub struct MemorySaveTarget {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySaveTarget {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the saved files as `(name, content)` pairs, in save order.
    #[must_use]
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the saved file names, in save order.
    #[must_use]
    pub fn saved_names(&self) -> Vec<String> {
        self.saved().into_iter().map(|(name, _)| name).collect()
    }
}

#[async_trait]
impl SaveTarget for MemorySaveTarget {
    async fn save_as(&self, suggested_name: &str, content: &[u8]) -> Result<(), Report<StorageError>> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((suggested_name.to_string(), content.to_vec()));
        Ok(())
    }
}
