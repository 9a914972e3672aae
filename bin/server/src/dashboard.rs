//! The dashboard state container.
//!
//! A [`Dashboard`] owns everything the admin screen shows: the admin gate,
//! the photo catalog, the selection and the two overlays. Every user action
//! is one method on it. Actions other than signing in or out are ignored
//! unless the screen is [`ViewState::Ready`].

use crate::view::ViewState;
use photo_admin_authz::AuthorizationCheck;
use photo_admin_gallery::{
    BatchReport, ObjectStore, Photo, PhotoCatalog, SaveTarget, SelectionSet, batch,
};
use photo_admin_platform_access::{
    AuthGate, AuthProvider, GateChange, SignInOptions, SignInRedirect,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// What the delete confirmation is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingDelete {
    /// A single photo, from its card or the lightbox.
    Single(Photo),
    /// The selection as it was when the batch delete was requested.
    Batch(Vec<String>),
}

/// Everything the screen needs to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub view: ViewState,
    pub photos: Vec<PhotoCard>,
    pub selected_count: usize,
    pub all_selected: bool,
    pub lightbox: Option<Photo>,
    pub confirm: Option<ConfirmPrompt>,
    /// Photos the browser should fetch now, in order.
    pub downloads: Vec<String>,
}

/// One photo in the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoCard {
    pub name: String,
    pub url: String,
    pub selected: bool,
}

/// The open delete confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmPrompt {
    /// Number of photos to delete; `None` for a single-photo delete.
    pub count: Option<usize>,
}

/// The admin dashboard for one signed-in browser.
pub struct Dashboard {
    gate: AuthGate,
    store: Arc<dyn ObjectStore>,
    catalog: PhotoCatalog,
    selection: SelectionSet,
    lightbox: Option<Photo>,
    pending_delete: Option<PendingDelete>,
    download_queue: Vec<String>,
}

impl Dashboard {
    /// Mounts the admin gate and, for an admin, loads the catalog.
    pub async fn mount(
        provider: Arc<dyn AuthProvider>,
        authorization: AuthorizationCheck,
        sign_in: SignInOptions,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        let (gate, change) = AuthGate::mount(provider, authorization, sign_in).await;
        let mut dashboard = Self {
            gate,
            store,
            catalog: PhotoCatalog::new(),
            selection: SelectionSet::new(),
            lightbox: None,
            pending_delete: None,
            download_queue: Vec::new(),
        };
        dashboard.on_gate_change(change).await;
        dashboard
    }

    /// Returns the current screen.
    #[must_use]
    pub fn view(&self) -> ViewState {
        ViewState::derive(self.gate.state())
    }

    fn is_ready(&self) -> bool {
        self.view().is_ready()
    }

    async fn on_gate_change(&mut self, change: GateChange) {
        if change.admin_revoked() {
            debug!("admin revoked, dropping catalog");
            self.catalog.clear();
            self.selection.clear();
        }
        if !self.is_ready() {
            self.lightbox = None;
            self.pending_delete = None;
            self.download_queue.clear();
        }
        if change.admin_granted() && self.catalog.load(self.store.as_ref()).await.is_err() {
            debug!("catalog not loaded after admin grant");
        }
    }

    /// Applies any session notifications that arrived since the last call,
    /// and ends an expired session.
    pub async fn sync_session(&mut self) {
        for change in self.gate.pending_changes().await {
            self.on_gate_change(change).await;
        }
    }

    /// Starts a sign-in, returning where to send the browser.
    pub async fn sign_in(&self) -> Option<SignInRedirect> {
        self.gate.sign_in().await
    }

    /// Signs out, whatever the provider says.
    pub async fn sign_out(&mut self) {
        let change = self.gate.sign_out().await;
        self.on_gate_change(change).await;
    }

    /// Flips the selection of one photo.
    pub fn toggle(&mut self, name: &str) {
        if self.is_ready() && self.catalog.contains(name) {
            self.selection.toggle(name);
        }
    }

    /// Selects every loaded photo, or clears the selection.
    pub fn set_select_all(&mut self, checked: bool) {
        if self.is_ready() {
            self.selection.set_all(checked, self.catalog.names());
        }
    }

    /// Shows one photo full size.
    pub fn open_lightbox(&mut self, name: &str) {
        if self.is_ready() {
            self.lightbox = self.catalog.get(name).cloned();
        }
    }

    pub fn close_lightbox(&mut self) {
        self.lightbox = None;
    }

    /// Asks for confirmation before deleting one photo.
    pub fn request_delete(&mut self, name: &str) {
        if !self.is_ready() {
            return;
        }
        if let Some(photo) = self.catalog.get(name) {
            self.pending_delete = Some(PendingDelete::Single(photo.clone()));
        }
    }

    /// Asks for confirmation before deleting the selection.
    pub fn request_batch_delete(&mut self) {
        if self.is_ready() && !self.selection.is_empty() {
            self.pending_delete = Some(PendingDelete::Batch(self.selection.names().to_vec()));
        }
    }

    /// Runs the pending delete, if any.
    pub async fn confirm_delete(&mut self) -> Option<BatchReport> {
        if !self.is_ready() {
            return None;
        }
        let pending = self.pending_delete.take()?;
        let report = match pending {
            PendingDelete::Single(photo) => {
                let result = batch::delete_one(
                    self.store.as_ref(),
                    &mut self.catalog,
                    &mut self.selection,
                    &photo.name,
                )
                .await;
                let mut report = BatchReport::default();
                match result {
                    Ok(()) => report.succeeded.push(photo.name),
                    Err(_) => report.failed.push(photo.name),
                }
                report
            }
            PendingDelete::Batch(names) => {
                batch::delete_many(
                    self.store.as_ref(),
                    &mut self.catalog,
                    &mut self.selection,
                    names,
                )
                .await
            }
        };
        if self
            .lightbox
            .as_ref()
            .is_some_and(|photo| report.succeeded.contains(&photo.name))
        {
            self.lightbox = None;
        }
        info!(
            deleted = report.succeeded.len(),
            failed = report.failed.len(),
            "delete confirmed"
        );
        Some(report)
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Hands one loaded photo to `target`. Returns true if it was saved.
    pub async fn download(&self, name: &str, target: &dyn SaveTarget) -> bool {
        if !self.is_ready() || !self.catalog.contains(name) {
            return false;
        }
        batch::download_one(self.store.as_ref(), target, name)
            .await
            .is_ok()
    }

    /// Queues the selection for the browser to download, in selection
    /// order. Returns how many photos were queued.
    pub fn download_selected(&mut self) -> usize {
        if !self.is_ready() {
            return 0;
        }
        self.download_queue = self.selection.names().to_vec();
        self.download_queue.len()
    }

    /// Forgets the queued downloads once the browser has been told.
    pub fn clear_download_queue(&mut self) {
        self.download_queue.clear();
    }

    #[must_use]
    pub fn catalog(&self) -> &PhotoCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    #[must_use]
    pub fn lightbox(&self) -> Option<&Photo> {
        self.lightbox.as_ref()
    }

    #[must_use]
    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    /// Builds the render model for the current state.
    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        let view = self.view();
        if !view.is_ready() {
            return DashboardSnapshot {
                view,
                photos: Vec::new(),
                selected_count: 0,
                all_selected: false,
                lightbox: None,
                confirm: None,
                downloads: Vec::new(),
            };
        }
        DashboardSnapshot {
            view,
            photos: self
                .catalog
                .photos()
                .iter()
                .map(|photo| PhotoCard {
                    name: photo.name.clone(),
                    url: photo.url.clone(),
                    selected: self.selection.contains(&photo.name),
                })
                .collect(),
            selected_count: self.selection.len(),
            all_selected: self.selection.all_selected(),
            lightbox: self.lightbox.clone(),
            confirm: self.pending_delete.as_ref().map(|pending| match pending {
                PendingDelete::Single(_) => ConfirmPrompt { count: None },
                PendingDelete::Batch(names) => ConfirmPrompt {
                    count: Some(names.len()),
                },
            }),
            downloads: self.download_queue.clone(),
        }
    }

    /// Releases the session subscription.
    pub fn teardown(self) {
        self.gate.teardown();
    }
}
