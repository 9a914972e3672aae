//! Session cookies and the dashboard extractor.

use crate::app::AppState;
use crate::dashboard::Dashboard;
use crate::pages::ADMIN_PATH;
use crate::sessions::DashboardSessions;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use time::Duration as TimeDuration;
use tokio::sync::Mutex;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session";

/// Auth state cookie name (sign-in state carried between login and callback).
pub const AUTH_STATE_COOKIE: &str = "auth_state";

/// How long a started sign-in stays valid.
const AUTH_STATE_MINUTES: i64 = 10;

/// Extractor for the dashboard of a signed-in browser.
///
/// Requests without a live session cookie are sent back to the admin page,
/// which shows the sign-in screen. Nothing else happens for them.
pub struct RequireDashboard(pub Arc<Mutex<Dashboard>>);

impl<S> FromRequestParts<S> for RequireDashboard
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = DashboardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| DashboardRejection::NotSignedIn)?;

        let (_, dashboard) =
            browser_dashboard(&app_state.sessions, &jar).ok_or(DashboardRejection::NotSignedIn)?;
        Ok(RequireDashboard(dashboard))
    }
}

/// Rejection type for [`RequireDashboard`].
#[derive(Debug)]
pub enum DashboardRejection {
    NotSignedIn,
}

impl IntoResponse for DashboardRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotSignedIn => Redirect::to(ADMIN_PATH).into_response(),
        }
    }
}

/// Looks up the dashboard named by the request's session cookie.
pub fn browser_dashboard(
    sessions: &DashboardSessions,
    jar: &CookieJar,
) -> Option<(String, Arc<Mutex<Dashboard>>)> {
    let id = jar.get(SESSION_COOKIE)?.value().to_string();
    let dashboard = sessions.get(&id)?;
    Some((id, dashboard))
}

/// Builds the session cookie for a newly opened dashboard.
pub fn session_cookie(id: String, lifetime: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::seconds(lifetime.num_seconds()))
        .build()
}

/// Builds the cookie holding a started sign-in.
pub fn auth_state_cookie(handoff: String, secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_STATE_COOKIE, handoff))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(AUTH_STATE_MINUTES))
        .build()
}

/// Builds a cookie that makes the browser drop `name`.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .max_age(TimeDuration::ZERO)
        .build()
}
