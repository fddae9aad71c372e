use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::{AppState, blocking};
use crate::auth::decode_token;
use crate::error::ApiError;

/// Gate for every `/api/admin` route.
///
/// Requires `Authorization: Bearer <jwt>` signed with the configured secret
/// and naming an account that still exists. The decoded claims are attached
/// to the request extensions.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized("Missing bearer token"))?;

    let claims = decode_token(&state.auth.jwt_secret, token).map_err(|e| {
        debug!("Rejected admin token: {}", e);
        ApiError::Unauthorized("Invalid or expired token")
    })?;

    let user_id = claims.sub;
    let user = blocking(&state, move |st| Ok(st.registry.get_user(user_id)?)).await?;
    if user.is_none_or(|u| u.username != claims.username) {
        warn!("Token for unknown admin '{}' (id {})", claims.username, claims.sub);
        return Err(ApiError::Unauthorized("Unknown account"));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
