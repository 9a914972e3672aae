use photo_admin_authz::{AllowListStore, AuthorizationCheck, MemoryAllowList, PgAllowList};
use photo_admin_gallery::ObjectStore;
use photo_admin_server::{
    app::{AppState, router},
    auth::{OidcAuthProvider, OidcClient},
    config::{ServerConfig, StorageBackend},
    error::ServerError,
    pages,
    sessions::{DashboardParts, DashboardSessions},
    storage::{FirebaseStorage, LocalObjectStore},
};
use rootcause::prelude::Report;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Report<ServerError>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().map_err(|e| ServerError::Configuration {
        details: e.to_string(),
    })?;
    tracing::info!("Loaded configuration");

    // Allow-list: the admins table when a database is configured
    let allow_list: Arc<dyn AllowListStore> = match &config.database_url {
        Some(url) => Arc::new(PgAllowList::connect(url).await.map_err(|e| {
            ServerError::Database {
                details: e.to_string(),
            }
        })?),
        None => {
            let list = MemoryAllowList::from_csv(&config.admin_emails);
            if list.is_empty() {
                tracing::warn!("no database and no ADMIN_EMAILS configured, nobody is an admin");
            }
            tracing::info!(admins = list.len(), "using configured admin emails");
            Arc::new(list)
        }
    };
    let authorization = AuthorizationCheck::new(allow_list);

    // Photo storage
    let (store, media_root): (Arc<dyn ObjectStore>, Option<PathBuf>) = match config.storage.backend
    {
        StorageBackend::Firebase => {
            let bucket = config.storage.bucket.as_deref().ok_or_else(|| {
                ServerError::Configuration {
                    details: "STORAGE__BUCKET is required for the firebase backend".to_string(),
                }
            })?;
            let storage = FirebaseStorage::new(bucket, config.storage.access_token.clone())
                .map_err(|e| ServerError::Storage {
                    details: e.to_string(),
                })?;
            let store: Arc<dyn ObjectStore> = Arc::new(storage);
            (store, None)
        }
        StorageBackend::Local => {
            let root = config.storage.root.clone();
            tracing::info!(root = %root.display(), "serving photos from local directory");
            let store: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(root.clone()));
            (store, Some(root))
        }
    };

    // Initialize OIDC client
    tracing::info!("Discovering OIDC provider...");
    let sign_in = config.oidc.sign_in_options();
    let oidc_client = Arc::new(OidcClient::discover(config.oidc).await.map_err(|e| {
        ServerError::IdentityProvider {
            details: e.to_string(),
        }
    })?);

    let sessions = Arc::new(DashboardSessions::new(
        DashboardParts {
            authorization,
            sign_in,
            store,
        },
        Arc::new(OidcAuthProvider::new(oidc_client.clone())),
        chrono::Duration::minutes(config.session.duration_minutes),
    ));

    // Spawn periodic session cleanup task
    let cleanup_sessions = sessions.clone();
    let cleanup_interval_secs = config.session.cleanup_interval_seconds;
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(cleanup_interval_secs));
        loop {
            interval.tick().await;
            let count = cleanup_sessions.prune();
            if count > 0 {
                tracing::debug!(expired_sessions = count, "Periodic session cleanup");
            }
        }
    });

    let templates = pages::templates().map_err(|e| ServerError::Template {
        details: e.to_string(),
    })?;
    let state = AppState::new(
        sessions,
        templates,
        Some(oidc_client),
        config.session.secure_cookies,
    );
    let app = router(state, media_root);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .map_err(|e| ServerError::Bind {
            address: config.bind_address.clone(),
            details: e.to_string(),
        })?;

    tracing::info!("listening on http://{}", config.bind_address);

    axum::serve(listener, app).await.map_err(|e| ServerError::Serve {
        details: e.to_string(),
    })?;
    Ok(())
}
