//! Delete and download, one photo or a batch at a time.
//!
//! Batches run strictly in sequence: each item's storage call completes
//! before the next one starts. A failed item is logged and skipped; it never
//! stops the rest of the batch and never changes catalog or selection state
//! for that item.

use crate::catalog::PhotoCatalog;
use crate::error::StorageError;
use crate::object::ObjectRef;
use crate::save::SaveTarget;
use crate::selection::SelectionSet;
use crate::store::ObjectStore;
use serde::Serialize;
use tracing::{error, info, instrument};

/// Outcome of a batch, by photo name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

impl BatchReport {
    fn record(&mut self, name: String, ok: bool) {
        if ok {
            self.succeeded.push(name);
        } else {
            self.failed.push(name);
        }
    }

    /// Number of items attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Deletes one photo, then drops it from the catalog and the selection.
#[instrument(skip(store, catalog, selection))]
pub async fn delete_one(
    store: &dyn ObjectStore,
    catalog: &mut PhotoCatalog,
    selection: &mut SelectionSet,
    name: &str,
) -> photo_admin_core::Result<(), StorageError> {
    if let Err(e) = store.delete_object(&ObjectRef::photo(name)).await {
        error!(error = %e, "failed to delete photo");
        return Err(e);
    }
    catalog.remove(name);
    selection.remove(name);
    info!("photo deleted");
    Ok(())
}

/// Deletes each name in order, then clears the selection.
pub async fn delete_many(
    store: &dyn ObjectStore,
    catalog: &mut PhotoCatalog,
    selection: &mut SelectionSet,
    names: Vec<String>,
) -> BatchReport {
    let mut report = BatchReport::default();
    for name in names {
        let ok = delete_one(store, catalog, selection, &name).await.is_ok();
        report.record(name, ok);
    }
    selection.clear();
    info!(
        deleted = report.succeeded.len(),
        failed = report.failed.len(),
        "batch delete finished"
    );
    report
}

/// Fetches one photo and saves it under its own name.
#[instrument(skip(store, target))]
pub async fn download_one(
    store: &dyn ObjectStore,
    target: &dyn SaveTarget,
    name: &str,
) -> photo_admin_core::Result<(), StorageError> {
    let result = match store.raw_blob(&ObjectRef::photo(name)).await {
        Ok(content) => target.save_as(name, &content).await,
        Err(e) => Err(e),
    };
    match &result {
        Ok(()) => info!("photo downloaded"),
        Err(e) => error!(error = %e, "failed to download photo"),
    }
    result
}

/// Downloads each name in order, awaiting each before starting the next.
pub async fn download_many(
    store: &dyn ObjectStore,
    target: &dyn SaveTarget,
    names: &[String],
) -> BatchReport {
    let mut report = BatchReport::default();
    for name in names {
        let ok = download_one(store, target, name).await.is_ok();
        report.record(name.clone(), ok);
    }
    info!(
        downloaded = report.succeeded.len(),
        failed = report.failed.len(),
        "batch download finished"
    );
    report
}
