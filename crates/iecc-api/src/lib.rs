pub mod admin;
pub mod affirmations;
pub mod auth;
pub mod error;
pub mod export;
pub mod middleware;
pub mod policy;
pub mod routes;
pub mod submission;

use std::sync::Arc;

use iecc_registry::Registry;

use crate::auth::AuthConfig;
use crate::policy::ContentPolicy;

pub use routes::router;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub registry: Arc<dyn Registry>,
    pub policy: Arc<dyn ContentPolicy>,
    pub auth: AuthConfig,
}

/// Run registry or hashing work on the blocking pool. A SQLite backend does
/// file I/O on every call, so handlers never touch the registry inline.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, error::ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, error::ApiError> + Send + 'static,
    T: Send + 'static,
{
    let st = state.clone();
    tokio::task::spawn_blocking(move || f(&st))
        .await
        .map_err(|e| {
            tracing::error!("spawn_blocking join error: {}", e);
            error::ApiError::Internal
        })?
}
