use std::sync::Mutex;

use iecc_types::models::{Affirmation, User};

use crate::{Registry, RegistryError, Result, now_millis, sort_newest_first};

/// Process-lifetime registry. Everything lives behind one mutex, so inserts,
/// lookups and listings never observe each other half-done.
pub struct MemoryRegistry {
    inner: Mutex<Inner>,
}

struct Inner {
    affirmations: Vec<Affirmation>,
    users: Vec<User>,
    next_affirmation_id: u64,
    next_user_id: u64,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                affirmations: Vec::new(),
                users: Vec::new(),
                next_affirmation_id: 1,
                next_user_id: 1,
            }),
        }
    }

    fn with_inner<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Inner) -> Result<T>,
    {
        let mut inner = self.inner.lock().map_err(|_| RegistryError::LockPoisoned)?;
        f(&mut inner)
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry for MemoryRegistry {
    fn create_affirmation(
        &self,
        full_name: &str,
        consent: bool,
        certificate_id: &str,
    ) -> Result<Affirmation> {
        self.with_inner(|inner| {
            if inner
                .affirmations
                .iter()
                .any(|a| a.certificate_id == certificate_id)
            {
                return Err(RegistryError::DuplicateCertificate(certificate_id.to_string()));
            }

            let affirmation = Affirmation {
                id: inner.next_affirmation_id,
                certificate_id: certificate_id.to_string(),
                full_name: full_name.to_string(),
                timestamp: now_millis(),
                consent,
            };
            inner.next_affirmation_id += 1;
            inner.affirmations.push(affirmation.clone());
            Ok(affirmation)
        })
    }

    fn get_by_certificate_id(&self, certificate_id: &str) -> Result<Option<Affirmation>> {
        self.with_inner(|inner| {
            Ok(inner
                .affirmations
                .iter()
                .find(|a| a.certificate_id == certificate_id)
                .cloned())
        })
    }

    fn list_all(&self) -> Result<Vec<Affirmation>> {
        let mut list = self.with_inner(|inner| Ok(inner.affirmations.clone()))?;
        sort_newest_first(&mut list);
        Ok(list)
    }

    fn count(&self) -> Result<u64> {
        self.with_inner(|inner| Ok(inner.affirmations.len() as u64))
    }

    fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        self.with_inner(|inner| {
            if inner.users.iter().any(|u| u.username == username) {
                return Err(RegistryError::DuplicateUsername(username.to_string()));
            }

            let user = User {
                id: inner.next_user_id,
                username: username.to_string(),
                password: password_hash.to_string(),
            };
            inner.next_user_id += 1;
            inner.users.push(user.clone());
            Ok(user)
        })
    }

    fn get_user(&self, id: u64) -> Result<Option<User>> {
        self.with_inner(|inner| Ok(inner.users.iter().find(|u| u.id == id).cloned()))
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.with_inner(|inner| {
            Ok(inner
                .users
                .iter()
                .find(|u| u.username == username)
                .cloned())
        })
    }
}
