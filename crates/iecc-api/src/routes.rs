use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::require_admin;
use crate::{AppState, admin, affirmations, auth};

/// Full HTTP surface. Everything under `/api/admin` sits behind [`require_admin`].
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/affirmations", post(affirmations::submit))
        .route("/api/affirmations/verify/{id}", get(affirmations::verify))
        .route("/api/affirmations/stats", get(affirmations::stats))
        .route("/api/auth/login", post(auth::login))
        .route("/health", get(health))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/api/admin/affirmations", get(admin::list))
        .route("/api/admin/affirmations/export", get(admin::export_csv))
        .route("/api/admin/summary", get(admin::summary))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}
