//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables such as
//! `BIND_ADDRESS`, `OIDC__CLIENT_ID` or `STORAGE__BACKEND`.
//!
//! See [`ProviderConfig`](photo_admin_platform_access::ProviderConfig) for
//! identity provider configuration.

use photo_admin_platform_access::ProviderConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// PostgreSQL URL holding the `admins` allow-list table.
    /// When absent, `admin_emails` is used instead.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Comma-separated allow-list used when there is no database.
    #[serde(default)]
    pub admin_emails: String,

    /// Identity provider configuration.
    pub oidc: ProviderConfig,

    /// Photo storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Browser session configuration.
    #[serde(default)]
    pub session: SessionConfig,
}

fn default_bind_address() -> String {
    "127.0.0.1:3000".to_string()
}

/// Which object store holds the photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Firebase Storage over its REST API.
    Firebase,
    /// A local directory served under `/media`.
    Local,
}

/// Photo storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Storage backend.
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,

    /// Root directory for the local backend. Photos live in `<root>/photos`.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,

    /// Firebase bucket name (e.g., "my-app.appspot.com").
    #[serde(default)]
    pub bucket: Option<String>,

    /// OAuth2 access token for Firebase Storage requests.
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Local
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            root: default_storage_root(),
            bucket: None,
            access_token: None,
        }
    }
}

/// Browser session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session duration in minutes.
    #[serde(default = "default_session_duration_minutes")]
    pub duration_minutes: i64,

    /// Interval between session cleanup runs, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_session_duration_minutes() -> i64 {
    480
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_session_duration_minutes(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
