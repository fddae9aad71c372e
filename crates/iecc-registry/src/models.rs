//! SQLite row types. Kept apart from the wire models so a corrupt row is
//! reported instead of silently defaulted.

use chrono::{DateTime, Utc};

use iecc_types::models::{Affirmation, User};

use crate::RegistryError;

pub struct AffirmationRow {
    pub id: i64,
    pub certificate_id: String,
    pub full_name: String,
    pub timestamp: String,
    pub consent: bool,
}

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
}

impl TryFrom<AffirmationRow> for Affirmation {
    type Error = RegistryError;

    fn try_from(row: AffirmationRow) -> Result<Self, Self::Error> {
        let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| {
                RegistryError::Corrupt(format!(
                    "timestamp '{}' on affirmation {}: {}",
                    row.timestamp, row.id, e
                ))
            })?
            .with_timezone(&Utc);

        Ok(Affirmation {
            id: row_id(row.id)?,
            certificate_id: row.certificate_id,
            full_name: row.full_name,
            timestamp,
            consent: row.consent,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = RegistryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row_id(row.id)?,
            username: row.username,
            password: row.password,
        })
    }
}

fn row_id(id: i64) -> Result<u64, RegistryError> {
    u64::try_from(id).map_err(|_| RegistryError::Corrupt(format!("negative row id {}", id)))
}
