use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One signed commitment to the charter.
///
/// Records are created once by the registry and never mutated afterwards.
/// `id` is the internal primary key; `certificate_id` is the public lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affirmation {
    pub id: u64,
    pub certificate_id: String,
    pub full_name: String,
    pub timestamp: DateTime<Utc>,
    pub consent: bool,
}

/// Admin account. `password` holds an Argon2 PHC string, never plaintext.
#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub password: String,
}
