//! Shared application state and the router.

use crate::auth::{self, OidcClient};
use crate::pages;
use crate::sessions::DashboardSessions;
use crate::storage::local::MEDIA_ROUTE;
use axum::{
    Router,
    routing::{get, post},
};
use std::path::PathBuf;
use std::sync::Arc;
use tera::Tera;
use tower_http::services::ServeDir;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Dashboards of the signed-in browsers.
    pub sessions: Arc<DashboardSessions>,
    /// Embedded page templates.
    pub templates: Arc<Tera>,
    /// OIDC client, when sign-in goes through one.
    pub oidc: Option<Arc<OidcClient>>,
    /// Whether cookies are marked `Secure`.
    pub secure_cookies: bool,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        sessions: Arc<DashboardSessions>,
        templates: Tera,
        oidc: Option<Arc<OidcClient>>,
        secure_cookies: bool,
    ) -> Self {
        Self {
            sessions,
            templates: Arc::new(templates),
            oidc,
            secure_cookies,
        }
    }
}

/// Builds the router.
///
/// `media_root` is served under `/media` for the local photo store.
pub fn router(state: AppState, media_root: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/", get(pages::index))
        .route("/admin", get(pages::admin))
        // Auth routes
        .route("/auth/login", get(auth::login))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/logout", post(auth::logout))
        // Dashboard actions
        .route("/admin/select-all", post(pages::select_all))
        .route("/admin/photos/{name}/toggle", post(pages::toggle))
        .route("/admin/photos/{name}/open", post(pages::open_lightbox))
        .route("/admin/photos/{name}/delete", post(pages::request_delete))
        .route("/admin/photos/{name}/download", post(pages::download))
        .route("/admin/lightbox/close", post(pages::close_lightbox))
        .route("/admin/selection/delete", post(pages::request_batch_delete))
        .route("/admin/selection/download", post(pages::download_selected))
        .route("/admin/delete/confirm", post(pages::confirm_delete))
        .route("/admin/delete/cancel", post(pages::cancel_delete));

    let router = match media_root {
        Some(root) => router.nest_service(MEDIA_ROUTE, ServeDir::new(root)),
        None => router,
    };
    router.with_state(state)
}
