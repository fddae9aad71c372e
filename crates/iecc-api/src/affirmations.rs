use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use tracing::debug;

use iecc_registry::certificate;
use iecc_types::api::{StatsResponse, SubmitAffirmationRequest};
use iecc_types::models::Affirmation;

use crate::error::ApiError;
use crate::{AppState, blocking, submission};

/// POST /api/affirmations
pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<SubmitAffirmationRequest>, JsonRejection>,
) -> Result<Json<Affirmation>, ApiError> {
    let Json(req) = payload?;

    let affirmation = blocking(&state, move |st| {
        Ok(submission::submit(
            st.registry.as_ref(),
            st.policy.as_ref(),
            &req,
        )?)
    })
    .await?;

    Ok(Json(affirmation))
}

/// GET /api/affirmations/verify/{id}
///
/// Public and side-effect free. The id is matched exactly as given; a segment
/// that does not even decode is just another unknown certificate.
pub async fn verify(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Affirmation>, ApiError> {
    let certificate_id = match path {
        Ok(Path(id)) => id,
        Err(rejection) => {
            debug!("Undecodable certificate id: {}", rejection.body_text());
            return Err(ApiError::NotFound("Certificate not found"));
        }
    };

    if !certificate::is_well_formed(&certificate_id) {
        debug!("Verify for malformed certificate id '{}'", certificate_id);
        return Err(ApiError::NotFound("Certificate not found"));
    }

    let lookup_id = certificate_id.clone();
    let affirmation = blocking(&state, move |st| {
        Ok(st.registry.get_by_certificate_id(&lookup_id)?)
    })
    .await?
    .ok_or(ApiError::NotFound("Certificate not found"))?;

    debug!("Verified certificate {}", certificate_id);
    Ok(Json(affirmation))
}

/// GET /api/affirmations/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let count = blocking(&state, |st| Ok(st.registry.count()?)).await?;
    Ok(Json(StatsResponse { count }))
}
