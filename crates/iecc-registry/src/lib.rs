pub mod certificate;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod sqlite;

use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;

use iecc_types::models::{Affirmation, User};

pub use memory::MemoryRegistry;
pub use sqlite::SqliteRegistry;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("certificate id {0} is already registered")]
    DuplicateCertificate(String),
    #[error("username {0} is already taken")]
    DuplicateUsername(String),
    #[error("registry lock poisoned")]
    LockPoisoned,
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Storage for affirmations and admin accounts.
///
/// Implementations must serialize their own access: handlers call into the
/// registry from any worker thread. "Not found" is `Ok(None)`, never an error.
pub trait Registry: Send + Sync {
    /// Stores a new affirmation under the next sequential id, stamped with the
    /// current instant. Fails with `DuplicateCertificate` if the id is taken.
    fn create_affirmation(
        &self,
        full_name: &str,
        consent: bool,
        certificate_id: &str,
    ) -> Result<Affirmation>;

    /// Exact, case-sensitive lookup.
    fn get_by_certificate_id(&self, certificate_id: &str) -> Result<Option<Affirmation>>;

    /// Every record, newest first.
    fn list_all(&self) -> Result<Vec<Affirmation>>;

    fn count(&self) -> Result<u64>;

    fn create_user(&self, username: &str, password_hash: &str) -> Result<User>;

    fn get_user(&self, id: u64) -> Result<Option<User>>;

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// Current instant at the millisecond granularity records are stored with.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Listing order: timestamp descending, ties broken by id descending.
pub(crate) fn sort_newest_first(affirmations: &mut [Affirmation]) {
    affirmations.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.id.cmp(&a.id))
    });
}
