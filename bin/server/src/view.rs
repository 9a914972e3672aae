//! Which screen the dashboard shows.

use photo_admin_platform_access::GateState;
use serde::Serialize;

/// The dashboard screen, derived from the admin gate alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    /// The first session resolution has not finished.
    Loading,
    /// Nobody is signed in.
    Unauthenticated,
    /// Signed in, but not on the allow-list.
    Unauthorized { email: Option<String> },
    /// Signed in as an admin.
    Ready,
}

impl ViewState {
    /// Derives the screen from the gate's loading, session and admin flags,
    /// in that order of precedence.
    #[must_use]
    pub fn derive(gate: &GateState) -> Self {
        if gate.is_loading() {
            return Self::Loading;
        }
        match gate.session() {
            None => Self::Unauthenticated,
            Some(session) if !gate.is_admin() => Self::Unauthorized {
                email: session.email().map(str::to_string),
            },
            Some(_) => Self::Ready,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}
