use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- JWT Claims --

/// Claims carried by admin session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: u64,
    pub username: String,
    pub exp: usize,
}

// -- Affirmations --

/// Raw submission body. Both fields are optional at the wire level so that a
/// missing field is reported as a validation error rather than a decode error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAffirmationRequest {
    pub full_name: Option<String>,
    pub consent: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub count: u64,
    pub latest_timestamp: Option<DateTime<Utc>>,
}

// -- Auth --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}
