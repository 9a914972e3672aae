//! Identity provider configuration.
//!
//! The dashboard signs operators in through an external OIDC provider
//! (Google by default). These settings describe the client registration and
//! where the browser goes once sign-in completes.

use crate::gate::SignInOptions;
use serde::{Deserialize, Serialize};

/// Configuration for the identity provider.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The OIDC issuer URL (e.g., "https://accounts.google.com").
    /// Used for OIDC discovery.
    issuer_url: String,
    /// The OAuth2 client ID registered with the provider.
    client_id: String,
    /// The OAuth2 client secret.
    client_secret: String,
    /// The redirect URI for the OAuth2 callback (e.g., "http://localhost:3000/auth/callback").
    redirect_uri: String,
    /// OAuth2 scopes to request as a comma-separated string.
    /// Default: "openid,email,profile"
    #[serde(default = "default_scopes")]
    scopes: String,
    /// Name of the provider operators sign in with.
    /// Default: "google"
    #[serde(default = "default_provider_name")]
    provider_name: String,
    /// Where the browser lands after a completed sign-in.
    /// Default: "/admin"
    #[serde(default = "default_redirect_target")]
    redirect_target: String,
}

fn default_scopes() -> String {
    "openid,email,profile".to_string()
}

fn default_provider_name() -> String {
    "google".to_string()
}

fn default_redirect_target() -> String {
    "/admin".to_string()
}

impl ProviderConfig {
    /// Returns the OIDC issuer URL.
    #[must_use]
    pub fn issuer_url(&self) -> &str {
        &self.issuer_url
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the OAuth2 redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the OAuth2 scopes to request, parsed from comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Returns the provider name operators sign in with.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    /// Returns where the browser lands after sign-in.
    #[must_use]
    pub fn redirect_target(&self) -> &str {
        &self.redirect_target
    }

    /// Returns the options the admin gate uses to start a sign-in.
    #[must_use]
    pub fn sign_in_options(&self) -> SignInOptions {
        SignInOptions::new(self.provider_name.clone(), self.redirect_target.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn google() -> ProviderConfig {
        serde_json::from_str(
            r#"{
                "issuer_url": "https://accounts.google.com",
                "client_id": "client-id",
                "client_secret": "client-secret",
                "redirect_uri": "http://localhost:3000/auth/callback"
            }"#,
        )
        .expect("deserialize")
    }

    #[test]
    fn omitted_fields_take_defaults() {
        let config = google();

        assert_eq!(config.issuer_url(), "https://accounts.google.com");
        assert_eq!(config.client_id(), "client-id");
        assert_eq!(config.client_secret(), "client-secret");
        assert_eq!(config.redirect_uri(), "http://localhost:3000/auth/callback");
        assert_eq!(config.scopes(), vec!["openid", "email", "profile"]);
        assert_eq!(config.provider_name(), "google");
        assert_eq!(config.redirect_target(), "/admin");
    }

    #[test]
    fn provider_and_target_can_be_overridden() {
        let config: ProviderConfig = serde_json::from_str(
            r#"{
                "issuer_url": "https://auth.example.com",
                "client_id": "client-id",
                "client_secret": "client-secret",
                "redirect_uri": "https://photos.example.com/auth/callback",
                "scopes": "openid,email,,groups",
                "provider_name": "keycloak",
                "redirect_target": "/"
            }"#,
        )
        .expect("deserialize");

        assert_eq!(config.provider_name(), "keycloak");
        assert_eq!(config.redirect_target(), "/");
        assert_eq!(config.scopes(), vec!["openid", "email", "groups"]);
    }

    #[test]
    fn sign_in_options_follow_config() {
        let options = google().sign_in_options();
        assert_eq!(options.provider_name(), "google");
        assert_eq!(options.redirect_target(), "/admin");
    }

    #[test]
    fn scopes_are_trimmed() {
        let config: ProviderConfig = serde_json::from_str(
            r#"{
                "issuer_url": "https://accounts.google.com",
                "client_id": "my-client",
                "client_secret": "secret",
                "redirect_uri": "http://localhost:3000/auth/callback",
                "scopes": "openid, email"
            }"#,
        )
        .expect("deserialize");

        assert_eq!(config.scopes(), vec!["openid", "email"]);
    }
}
