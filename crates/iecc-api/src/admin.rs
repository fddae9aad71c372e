use axum::{
    Extension, Json,
    extract::State,
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;

use iecc_types::api::{Claims, SummaryResponse};
use iecc_types::models::Affirmation;

use crate::{AppState, blocking};
use crate::error::ApiError;
use crate::export;

/// GET /api/admin/affirmations: every record, newest first.
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Affirmation>>, ApiError> {
    let list = blocking(&state, |st| Ok(st.registry.list_all()?)).await?;
    info!("Admin '{}' listed {} affirmations", claims.username, list.len());
    Ok(Json(list))
}

/// GET /api/admin/affirmations/export: the listing as a CSV attachment.
pub async fn export_csv(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let list = blocking(&state, |st| Ok(st.registry.list_all()?)).await?;
    info!("Admin '{}' exported {} affirmations", claims.username, list.len());

    let disposition = format!("attachment; filename=\"{}\"", export::filename(Utc::now()));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export::to_csv(&list),
    ))
}

/// GET /api/admin/summary: record count and the most recent timestamp.
pub async fn summary(State(state): State<AppState>) -> Result<Json<SummaryResponse>, ApiError> {
    // One snapshot so count and latest agree.
    let list = blocking(&state, |st| Ok(st.registry.list_all()?)).await?;
    Ok(Json(SummaryResponse {
        count: list.len() as u64,
        latest_timestamp: list.first().map(|a| a.timestamp),
    }))
}
