//! The admin screen and its actions.
//!
//! Every action is a form POST against the browser's own dashboard, found
//! through its session cookie, and redirects back to `/admin`, which renders
//! the current snapshot. Downloads answer with the photo as an attachment.

use crate::app::AppState;
use crate::attachment::Attachment;
use crate::auth::middleware::{RequireDashboard, SESSION_COOKIE, browser_dashboard, removal_cookie};
use crate::view::ViewState;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tera::{Context, Tera};
use tracing::error;

// Embed templates at compile time so the binary is self-contained
const TPL_BASE: &str = include_str!("../templates/base.html");
const TPL_ADMIN: &str = include_str!("../templates/admin.html");

/// Where every action lands.
pub const ADMIN_PATH: &str = "/admin";

/// Builds the template set.
pub fn templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template("base.html", TPL_BASE)?;
    tera.add_raw_template("admin.html", TPL_ADMIN)?;
    Ok(tera)
}

fn render_template(tera: &Tera, name: &str, context: &Context) -> Response {
    match tera.render(name, context) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!(error = %err, template = name, "template error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

fn back_to_admin() -> Redirect {
    Redirect::to(ADMIN_PATH)
}

pub async fn index() -> Redirect {
    back_to_admin()
}

/// Renders the dashboard.
///
/// Browsers without a session see the sign-in screen. A session that has
/// ended is forgotten and its cookie removed.
pub async fn admin(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, snapshot) = match browser_dashboard(&state.sessions, &jar) {
        Some((id, dashboard)) => {
            let snapshot = {
                let mut dashboard = dashboard.lock().await;
                dashboard.sync_session().await;
                let snapshot = dashboard.snapshot();
                dashboard.clear_download_queue();
                snapshot
            };
            if snapshot.view == ViewState::Unauthenticated {
                state.sessions.remove(&id);
                (jar.add(removal_cookie(SESSION_COOKIE)), snapshot)
            } else {
                (jar, snapshot)
            }
        }
        None => {
            let dashboard = state.sessions.anonymous().await;
            let snapshot = dashboard.snapshot();
            dashboard.teardown();
            (jar, snapshot)
        }
    };

    let page = match Context::from_serialize(&snapshot) {
        Ok(context) => render_template(&state.templates, "admin.html", &context),
        Err(err) => {
            error!(error = %err, "failed to build template context");
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    };
    (jar, page).into_response()
}

#[derive(Debug, Deserialize)]
pub struct SelectAllForm {
    checked: bool,
}

pub async fn select_all(
    RequireDashboard(dashboard): RequireDashboard,
    Form(form): Form<SelectAllForm>,
) -> Redirect {
    let mut dashboard = dashboard.lock().await;
    dashboard.sync_session().await;
    dashboard.set_select_all(form.checked);
    back_to_admin()
}

pub async fn toggle(
    RequireDashboard(dashboard): RequireDashboard,
    Path(name): Path<String>,
) -> Redirect {
    let mut dashboard = dashboard.lock().await;
    dashboard.sync_session().await;
    dashboard.toggle(&name);
    back_to_admin()
}

pub async fn open_lightbox(
    RequireDashboard(dashboard): RequireDashboard,
    Path(name): Path<String>,
) -> Redirect {
    let mut dashboard = dashboard.lock().await;
    dashboard.sync_session().await;
    dashboard.open_lightbox(&name);
    back_to_admin()
}

pub async fn close_lightbox(RequireDashboard(dashboard): RequireDashboard) -> Redirect {
    dashboard.lock().await.close_lightbox();
    back_to_admin()
}

pub async fn request_delete(
    RequireDashboard(dashboard): RequireDashboard,
    Path(name): Path<String>,
) -> Redirect {
    let mut dashboard = dashboard.lock().await;
    dashboard.sync_session().await;
    dashboard.request_delete(&name);
    back_to_admin()
}

/// Sends one photo to the browser as an attachment.
///
/// Names outside the catalog, and browsers that are not admins, are sent
/// back to the dashboard instead.
pub async fn download(
    RequireDashboard(dashboard): RequireDashboard,
    Path(name): Path<String>,
) -> Response {
    let attachment = Attachment::new();
    {
        let mut dashboard = dashboard.lock().await;
        dashboard.sync_session().await;
        dashboard.download(&name, &attachment).await;
    }
    attachment
        .into_download()
        .unwrap_or_else(|| back_to_admin().into_response())
}

pub async fn request_batch_delete(RequireDashboard(dashboard): RequireDashboard) -> Redirect {
    let mut dashboard = dashboard.lock().await;
    dashboard.sync_session().await;
    dashboard.request_batch_delete();
    back_to_admin()
}

/// Queues the selected photos; the next render fetches them one by one.
pub async fn download_selected(RequireDashboard(dashboard): RequireDashboard) -> Redirect {
    let mut dashboard = dashboard.lock().await;
    dashboard.sync_session().await;
    dashboard.download_selected();
    back_to_admin()
}

pub async fn confirm_delete(RequireDashboard(dashboard): RequireDashboard) -> Redirect {
    let mut dashboard = dashboard.lock().await;
    dashboard.sync_session().await;
    dashboard.confirm_delete().await;
    back_to_admin()
}

pub async fn cancel_delete(RequireDashboard(dashboard): RequireDashboard) -> Redirect {
    dashboard.lock().await.cancel_delete();
    back_to_admin()
}
