//! OIDC sign-in using the openidconnect crate.
//!
//! [`OidcClient`] is shared by the whole server: it holds the discovered
//! provider metadata and performs the authorization-code flow with PKCE.
//! Each signed-in browser gets its own [`OidcAuthProvider`], which owns that
//! browser's session and refreshes it when the access token runs out.

use async_trait::async_trait;
use openidconnect::core::{CoreAuthenticationFlow, CoreClient, CoreProviderMetadata};
use openidconnect::{
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, IssuerUrl, Nonce, OAuth2TokenResponse,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, RefreshToken, Scope, TokenResponse,
};
use photo_admin_core::UserIdentity;
use photo_admin_platform_access::{
    AuthProvider, AuthenticationError, ProviderConfig, Session, SessionBroadcaster, SessionEvent,
    SessionSubscription, SessionToken, SignInRedirect,
};
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Sign-in state carried by the browser between login and callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PendingSignIn {
    csrf_token: String,
    pkce_verifier: String,
    nonce: String,
    redirect_target: String,
}

/// A sign-in the provider has confirmed.
#[derive(Debug, Clone)]
pub struct CompletedSignIn {
    /// The new session.
    pub session: Session,
    /// Refresh token, if the provider issued one.
    pub refresh_token: Option<String>,
    /// Where to send the browser next.
    pub redirect_target: String,
}

/// Tokens returned by a refresh.
#[derive(Debug, Clone)]
struct RefreshedTokens {
    access_token: String,
    expires_in: Option<Duration>,
    refresh_token: Option<String>,
}

fn lifetime(expires_in: Option<Duration>) -> Option<chrono::Duration> {
    expires_in.and_then(|d| chrono::Duration::from_std(d).ok())
}

/// OIDC client shared by every browser.
pub struct OidcClient {
    provider_metadata: CoreProviderMetadata,
    client_id: ClientId,
    client_secret: ClientSecret,
    redirect_url: RedirectUrl,
    config: ProviderConfig,
    http_client: reqwest::Client,
}

impl OidcClient {
    /// Creates a client by discovering the issuer's metadata.
    pub async fn discover(config: ProviderConfig) -> Result<Self, Report<AuthenticationError>> {
        let provider = config.provider_name().to_string();
        let configuration_error = |reason: String| AuthenticationError::ProviderError {
            provider: provider.clone(),
            reason,
        };

        let issuer_url = IssuerUrl::new(config.issuer_url().to_string())
            .map_err(|e| configuration_error(format!("invalid issuer URL: {e}")))?;

        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| configuration_error(format!("failed to create HTTP client: {e}")))?;

        let provider_metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| configuration_error(format!("failed to discover provider: {e}")))?;

        let redirect_url = RedirectUrl::new(config.redirect_uri().to_string())
            .map_err(|e| configuration_error(format!("invalid redirect URI: {e}")))?;

        let client_id = ClientId::new(config.client_id().to_string());
        let client_secret = ClientSecret::new(config.client_secret().to_string());

        Ok(Self {
            provider_metadata,
            client_id,
            client_secret,
            redirect_url,
            config,
            http_client,
        })
    }

    /// Returns the provider configuration.
    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn provider_error(&self, reason: String) -> AuthenticationError {
        AuthenticationError::ProviderError {
            provider: self.config.provider_name().to_string(),
            reason,
        }
    }

    /// Builds the provider authorization URL.
    ///
    /// The returned handoff holds the CSRF token, PKCE verifier and nonce;
    /// the browser must present it again at the callback.
    pub fn authorization_request(
        &self,
        redirect_target: &str,
    ) -> Result<SignInRedirect, Report<AuthenticationError>> {
        let client = CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        )
        .set_redirect_uri(self.redirect_url.clone());

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                CsrfToken::new_random,
                Nonce::new_random,
            )
            .set_pkce_challenge(pkce_challenge);

        for scope in self.config.scopes() {
            auth_request = auth_request.add_scope(Scope::new(scope.to_string()));
        }

        let (auth_url, csrf_token, nonce) = auth_request.url();

        let handoff = serde_json::to_string(&PendingSignIn {
            csrf_token: csrf_token.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
            nonce: nonce.secret().clone(),
            redirect_target: redirect_target.to_string(),
        })
        .map_err(|e| self.provider_error(format!("failed to encode sign-in state: {e}")))?;

        Ok(SignInRedirect {
            url: auth_url.to_string(),
            handoff: Some(handoff),
        })
    }

    /// Completes a sign-in from the provider's callback.
    ///
    /// `handoff` is the state produced by [`OidcClient::authorization_request`]
    /// for this browser. Exchanges the code and validates the ID token.
    #[instrument(skip_all)]
    pub async fn complete_sign_in(
        &self,
        code: &str,
        state: &str,
        handoff: &str,
    ) -> Result<CompletedSignIn, Report<AuthenticationError>> {
        let pending: PendingSignIn =
            serde_json::from_str(handoff).map_err(|_| AuthenticationError::NoPendingSignIn)?;

        if state != pending.csrf_token {
            warn!("sign-in callback state mismatch");
            return Err(AuthenticationError::StateMismatch.into());
        }

        let client = CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        )
        .set_redirect_uri(self.redirect_url.clone());

        let token_request = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| self.provider_error(format!("token endpoint error: {e}")))?;

        let token_response = token_request
            .set_pkce_verifier(PkceCodeVerifier::new(pending.pkce_verifier))
            .request_async(&self.http_client)
            .await
            .map_err(|e| self.provider_error(format!("token exchange failed: {e}")))?;

        let id_token = token_response
            .id_token()
            .ok_or_else(|| AuthenticationError::InvalidToken {
                reason: "no ID token in response".to_string(),
            })?;

        let nonce = Nonce::new(pending.nonce);
        let claims = id_token
            .claims(&client.id_token_verifier(), &nonce)
            .map_err(|e| AuthenticationError::InvalidToken {
                reason: format!("ID token validation failed: {e}"),
            })?;

        let user = UserIdentity::new(claims.email().map(|e| e.as_str().to_string()));
        let token = SessionToken::new(token_response.access_token().secret().clone());
        let session = match lifetime(token_response.expires_in()) {
            Some(lifetime) => Session::with_expiry(token, user, lifetime),
            None => Session::new(token, user),
        };

        info!(email = ?session.email(), "sign-in completed");
        Ok(CompletedSignIn {
            session,
            refresh_token: token_response.refresh_token().map(|t| t.secret().clone()),
            redirect_target: pending.redirect_target,
        })
    }

    async fn refresh(
        &self,
        refresh_token: &str,
    ) -> Result<RefreshedTokens, Report<AuthenticationError>> {
        let client = CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        )
        .set_redirect_uri(self.redirect_url.clone());

        let refresh_token = RefreshToken::new(refresh_token.to_string());
        let token_response = client
            .exchange_refresh_token(&refresh_token)
            .map_err(|e| self.provider_error(format!("token endpoint error: {e}")))?
            .request_async(&self.http_client)
            .await
            .map_err(|e| self.provider_error(format!("token refresh failed: {e}")))?;

        Ok(RefreshedTokens {
            access_token: token_response.access_token().secret().clone(),
            expires_in: token_response.expires_in(),
            refresh_token: token_response.refresh_token().map(|t| t.secret().clone()),
        })
    }
}

#[derive(Debug, Default)]
struct ProviderState {
    current: Option<Session>,
    refresh_token: Option<String>,
}

/// Identity provider for one browser, backed by the shared [`OidcClient`].
pub struct OidcAuthProvider {
    client: Arc<OidcClient>,
    broadcaster: SessionBroadcaster,
    state: Mutex<ProviderState>,
}

impl OidcAuthProvider {
    /// Creates a provider with nobody signed in.
    #[must_use]
    pub fn new(client: Arc<OidcClient>) -> Self {
        Self {
            client,
            broadcaster: SessionBroadcaster::new(),
            state: Mutex::new(ProviderState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adopts a completed sign-in and announces it.
    pub fn establish(&self, session: Session, refresh_token: Option<String>) {
        {
            let mut state = self.state();
            state.current = Some(session.clone());
            state.refresh_token = refresh_token;
        }
        self.broadcaster.publish(SessionEvent::SignedIn(session));
    }

    async fn refresh_expired(&self, refresh_token: &str) -> Option<Session> {
        let tokens = match self.client.refresh(refresh_token).await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "failed to refresh session");
                return None;
            }
        };

        let session = {
            let mut state = self.state();
            let session = state.current.as_mut()?;
            session.refresh(
                SessionToken::new(tokens.access_token),
                lifetime(tokens.expires_in),
            );
            let session = session.clone();
            if tokens.refresh_token.is_some() {
                state.refresh_token = tokens.refresh_token;
            }
            session
        };

        info!(email = ?session.email(), "session refreshed");
        self.broadcaster
            .publish(SessionEvent::TokenRefreshed(session.clone()));
        Some(session)
    }
}

#[async_trait]
impl AuthProvider for OidcAuthProvider {
    async fn current_session(&self) -> Result<Option<Session>, Report<AuthenticationError>> {
        let refresh_token = {
            let state = self.state();
            if !state.current.as_ref().is_some_and(Session::is_expired) {
                return Ok(state.current.clone());
            }
            state.refresh_token.clone()
        };

        if let Some(refresh_token) = refresh_token {
            if let Some(session) = self.refresh_expired(&refresh_token).await {
                return Ok(Some(session));
            }
        }

        {
            let mut state = self.state();
            state.current = None;
            state.refresh_token = None;
        }
        info!("session expired");
        self.broadcaster.publish(SessionEvent::SignedOut);
        Ok(None)
    }

    fn subscribe(&self) -> SessionSubscription {
        self.broadcaster.subscribe()
    }

    async fn sign_in_with_provider(
        &self,
        provider: &str,
        redirect_target: &str,
    ) -> Result<SignInRedirect, Report<AuthenticationError>> {
        if provider != self.client.config().provider_name() {
            return Err(AuthenticationError::UnsupportedProvider {
                provider: provider.to_string(),
            }
            .into());
        }
        self.client.authorization_request(redirect_target)
    }

    async fn sign_out(&self) -> Result<(), Report<AuthenticationError>> {
        let had_session = {
            let mut state = self.state();
            state.refresh_token = None;
            state.current.take().is_some()
        };
        if had_session {
            self.broadcaster.publish(SessionEvent::SignedOut);
        }
        Ok(())
    }
}
