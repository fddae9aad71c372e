use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Registry: running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE affirmations (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                certificate_id  TEXT NOT NULL UNIQUE,
                full_name       TEXT NOT NULL,
                timestamp       TEXT NOT NULL,
                consent         INTEGER NOT NULL
            );

            CREATE INDEX idx_affirmations_timestamp
                ON affirmations(timestamp);

            CREATE TABLE users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Registry migrations complete");
    Ok(())
}
