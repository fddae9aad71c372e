use std::path::Path;
use std::sync::Mutex;

use chrono::SecondsFormat;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row};
use tracing::info;

use iecc_types::models::{Affirmation, User};

use crate::models::{AffirmationRow, UserRow};
use crate::{Registry, RegistryError, Result, migrations, now_millis};

const AFFIRMATION_COLUMNS: &str = "id, certificate_id, full_name, timestamp, consent";

/// Registry backed by a SQLite file. Timestamps are stored as RFC 3339 text
/// with millisecond precision and a `Z` suffix, so they order lexically.
pub struct SqliteRegistry {
    conn: Mutex<Connection>,
}

impl SqliteRegistry {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("Registry database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|_| RegistryError::LockPoisoned)?;
        f(&conn)
    }
}

impl Registry for SqliteRegistry {
    fn create_affirmation(
        &self,
        full_name: &str,
        consent: bool,
        certificate_id: &str,
    ) -> Result<Affirmation> {
        let timestamp = now_millis();
        let stamp = timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO affirmations (certificate_id, full_name, timestamp, consent)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![certificate_id, full_name, stamp, consent],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    RegistryError::DuplicateCertificate(certificate_id.to_string())
                } else {
                    e.into()
                }
            })?;

            Ok(Affirmation {
                id: conn.last_insert_rowid() as u64,
                certificate_id: certificate_id.to_string(),
                full_name: full_name.to_string(),
                timestamp,
                consent,
            })
        })
    }

    fn get_by_certificate_id(&self, certificate_id: &str) -> Result<Option<Affirmation>> {
        let row = self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM affirmations WHERE certificate_id = ?1",
                AFFIRMATION_COLUMNS
            );
            Ok(conn
                .query_row(&sql, [certificate_id], affirmation_row)
                .optional()?)
        })?;

        row.map(Affirmation::try_from).transpose()
    }

    fn list_all(&self) -> Result<Vec<Affirmation>> {
        let rows = self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM affirmations ORDER BY timestamp DESC, id DESC",
                AFFIRMATION_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], affirmation_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        rows.into_iter().map(Affirmation::try_from).collect()
    }

    fn count(&self) -> Result<u64> {
        let count: i64 = self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM affirmations", [], |r| r.get(0))?)
        })?;
        Ok(count as u64)
    }

    fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password) VALUES (?1, ?2)",
                (username, password_hash),
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    RegistryError::DuplicateUsername(username.to_string())
                } else {
                    e.into()
                }
            })?;

            Ok(User {
                id: conn.last_insert_rowid() as u64,
                username: username.to_string(),
                password: password_hash.to_string(),
            })
        })
    }

    fn get_user(&self, id: u64) -> Result<Option<User>> {
        let Ok(id) = i64::try_from(id) else {
            return Ok(None);
        };
        let row = self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT id, username, password FROM users WHERE id = ?1",
                    [id],
                    user_row,
                )
                .optional()?)
        })?;

        row.map(User::try_from).transpose()
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT id, username, password FROM users WHERE username = ?1",
                    [username],
                    user_row,
                )
                .optional()?)
        })?;

        row.map(User::try_from).transpose()
    }
}

fn affirmation_row(row: &Row<'_>) -> rusqlite::Result<AffirmationRow> {
    Ok(AffirmationRow {
        id: row.get(0)?,
        certificate_id: row.get(1)?,
        full_name: row.get(2)?,
        timestamp: row.get(3)?,
        consent: row.get(4)?,
    })
}

fn user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
    })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation
    )
}
