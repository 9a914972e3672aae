//! Authentication routes for login, callback, and logout.

use super::middleware::{
    AUTH_STATE_COOKIE, SESSION_COOKIE, auth_state_cookie, browser_dashboard, removal_cookie,
    session_cookie,
};
use super::oidc::OidcAuthProvider;
use crate::app::AppState;
use crate::pages::ADMIN_PATH;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

/// Query parameters for the OIDC callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: String,
    state: String,
}

/// Starts a sign-in by redirecting to the identity provider.
///
/// The sign-in state is stored in a short-lived cookie so that each browser
/// completes only the sign-in it started.
pub async fn login(State(state): State<AppState>, jar: CookieJar) -> Response {
    let redirect = match browser_dashboard(&state.sessions, &jar) {
        Some((_, dashboard)) => dashboard.lock().await.sign_in().await,
        None => {
            let dashboard = state.sessions.anonymous().await;
            let redirect = dashboard.sign_in().await;
            dashboard.teardown();
            redirect
        }
    };

    let Some(redirect) = redirect else {
        return Redirect::to(ADMIN_PATH).into_response();
    };
    let jar = match redirect.handoff {
        Some(handoff) => jar.add(auth_state_cookie(handoff, state.secure_cookies)),
        None => jar,
    };
    (jar, Redirect::to(&redirect.url)).into_response()
}

/// Handles the callback after the user authenticates with the identity provider.
///
/// Opens a dashboard for this browser and hands it the session cookie.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<Response, AuthError> {
    let handoff = jar
        .get(AUTH_STATE_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(AuthError::MissingAuthState)?;
    let client = state.oidc.as_ref().ok_or(AuthError::NotConfigured)?;

    let signed_in = client
        .complete_sign_in(&query.code, &query.state, &handoff)
        .await
        .map_err(|e| AuthError::SignInFailed(e.to_string()))?;

    let provider = Arc::new(OidcAuthProvider::new(client.clone()));
    let (id, dashboard) = state.sessions.open(provider.clone()).await;
    provider.establish(signed_in.session, signed_in.refresh_token);
    dashboard.lock().await.sync_session().await;

    if let Some(previous) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
        state.sessions.remove(&previous);
    }

    let jar = jar
        .add(session_cookie(
            id,
            state.sessions.lifetime(),
            state.secure_cookies,
        ))
        .add(removal_cookie(AUTH_STATE_COOKIE));

    Ok((jar, Redirect::to(&signed_in.redirect_target)).into_response())
}

/// Signs the browser out and forgets its dashboard.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(dashboard) = state.sessions.remove(cookie.value()) {
            dashboard.lock().await.sign_out().await;
        }
    }

    (jar.add(removal_cookie(SESSION_COOKIE)), Redirect::to(ADMIN_PATH))
}

/// Authentication errors.
#[derive(Debug)]
pub enum AuthError {
    MissingAuthState,
    NotConfigured,
    SignInFailed(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingAuthState => (StatusCode::BAD_REQUEST, "Missing authentication state"),
            Self::NotConfigured => (StatusCode::NOT_FOUND, "Sign-in callback not available"),
            Self::SignInFailed(msg) => {
                error!("Sign-in failed: {}", msg);
                (StatusCode::BAD_REQUEST, "Authentication failed")
            }
        };

        (status, message).into_response()
    }
}
