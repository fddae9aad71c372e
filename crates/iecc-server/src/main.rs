mod config;

use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use iecc_api::auth::{AuthConfig, seed_admin};
use iecc_api::policy::DenyList;
use iecc_api::{AppState, AppStateInner};
use iecc_registry::{MemoryRegistry, Registry, SqliteRegistry};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iecc=debug,iecc_api=debug,iecc_registry=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Registry backend
    let registry: Arc<dyn Registry> = match &config.db_path {
        Some(path) => Arc::new(SqliteRegistry::open(path)?),
        None => {
            info!("No IECC_DB_PATH set; registry is in-memory and lost on restart");
            Arc::new(MemoryRegistry::new())
        }
    };

    seed_admin(registry.as_ref(), &config.admin_username, &config.admin_password)?;

    let policy = match &config.deny_terms {
        Some(terms) => DenyList::parse(terms),
        None => DenyList::default(),
    };
    info!("Content policy deny-list: {:?}", policy.terms());

    let state: AppState = Arc::new(AppStateInner {
        registry,
        policy: Arc::new(policy),
        auth: AuthConfig {
            jwt_secret: config.jwt_secret.clone(),
            token_ttl: Duration::hours(config.token_ttl_hours),
        },
    });

    let app = iecc_api::router(state);

    info!("IECC registry listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
