use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use iecc_registry::RegistryError;

use crate::submission::SubmitError;

/// Errors surfaced to HTTP callers. Every variant renders as
/// `{ "error": <kind>, "message": <text> }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: String,
    },
    #[error("{0}")]
    ContentPolicy(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::ContentPolicy(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation",
            ApiError::ContentPolicy(_) => "content_policy",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Internal => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let ApiError::Validation {
            field: Some(field), ..
        } = &self
        {
            body["field"] = json!(field);
        }
        (self.status(), Json(body)).into_response()
    }
}

impl From<SubmitError> for ApiError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Validation { field, message } => {
                warn!("Submission rejected: {}: {}", field, message);
                ApiError::Validation {
                    field: Some(field),
                    message: message.to_string(),
                }
            }
            SubmitError::Policy(violation) => {
                warn!("Submission rejected by content policy: {:?}", violation);
                ApiError::ContentPolicy(violation.to_string())
            }
            SubmitError::CertificateExhausted(_) | SubmitError::Registry(_) => {
                error!("Submission failed: {}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        error!("Registry error: {}", e);
        ApiError::Internal
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Malformed request body: {}", rejection.body_text());
        ApiError::Validation {
            field: None,
            message: rejection.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(e: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = e.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_carries_field() {
        let (status, body) = render(ApiError::Validation {
            field: Some("fullName"),
            message: "Name is too short".into(),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation");
        assert_eq!(body["field"], "fullName");
        assert_eq!(body["message"], "Name is too short");
    }

    #[tokio::test]
    async fn kinds_map_to_statuses() {
        let (status, body) = render(ApiError::ContentPolicy("nope".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "content_policy");
        assert!(body.get("field").is_none());

        let (status, body) = render(ApiError::NotFound("Certificate not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Certificate not found");

        let (status, _) = render(ApiError::Unauthorized("missing bearer token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = render(ApiError::from(RegistryError::LockPoisoned)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal");
    }
}
