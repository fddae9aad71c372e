use std::sync::LazyLock;

use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{error, info, warn};

use iecc_registry::{Registry, RegistryError};
use iecc_types::api::{Claims, LoginRequest, LoginResponse};
use iecc_types::models::User;

use crate::{AppState, blocking};
use crate::error::ApiError;

/// Token signing settings shared by the login handler and the admin middleware.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

/// Hash a password with Argon2id and a random salt, returning the PHC string.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        warn!("Stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn create_token(config: &AuthConfig, user: &User) -> anyhow::Result<(String, DateTime<Utc>)> {
    let expires_at = Utc::now()
        .checked_add_signed(config.token_ttl)
        .ok_or_else(|| anyhow!("Token lifetime {} overflows the clock", config.token_ttl))?;
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok((token, expires_at))
}

pub fn decode_token(secret: &str, token: &str) -> anyhow::Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Create the admin account unless one with that username already exists.
/// Returns whether an account was created.
pub fn seed_admin(registry: &dyn Registry, username: &str, password: &str) -> anyhow::Result<bool> {
    if registry.get_user_by_username(username)?.is_some() {
        info!("Admin account '{}' already present, skipping seed", username);
        return Ok(false);
    }

    let hash = hash_password(password)?;
    match registry.create_user(username, &hash) {
        Ok(user) => {
            info!("Seeded admin account '{}' (id {})", user.username, user.id);
            Ok(true)
        }
        Err(RegistryError::DuplicateUsername(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Hash checked when the username is unknown, so a miss costs the same
/// Argon2 work as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("iecc-unknown-account").ok());

/// Look up an admin and check the password. Unknown usernames and wrong
/// passwords are indistinguishable to the caller.
pub fn authenticate(registry: &dyn Registry, username: &str, password: &str) -> Result<User, ApiError> {
    let Some(user) = registry.get_user_by_username(username)? else {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            let _ = verify_password(password, dummy);
        }
        warn!("Failed login for unknown account '{}'", username);
        return Err(ApiError::Unauthorized("Invalid username or password"));
    };

    if !verify_password(password, &user.password) {
        warn!("Failed login for '{}'", username);
        return Err(ApiError::Unauthorized("Invalid username or password"));
    }
    Ok(user)
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;

    // Argon2 verification is CPU-bound; keep it off the async workers.
    let user = blocking(&state, move |st| {
        authenticate(st.registry.as_ref(), &req.username, &req.password)
    })
    .await?;

    let (token, expires_at) = create_token(&state.auth, &user).map_err(|e| {
        error!("Token signing failed: {}", e);
        ApiError::Internal
    })?;

    info!("Admin '{}' logged in", user.username);
    Ok(Json(LoginResponse {
        token,
        username: user.username,
        expires_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use iecc_registry::MemoryRegistry;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".into(),
            token_ttl: Duration::hours(1),
        }
    }

    fn user() -> User {
        User {
            id: 7,
            username: "admin".into(),
            password: String::new(),
        }
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("admin123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
        assert!(!verify_password("admin123", "not-a-phc-string"));
    }

    #[test]
    fn token_carries_user() {
        let (token, expires_at) = create_token(&config(), &user()).unwrap();
        let claims = decode_token("test-secret", &token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.exp, expires_at.timestamp() as usize);
    }

    #[test]
    fn token_rejected_with_wrong_secret() {
        let (token, _) = create_token(&config(), &user()).unwrap();
        assert!(decode_token("other-secret", &token).is_err());
    }

    #[test]
    fn oversized_ttl_is_an_error() {
        let forever = AuthConfig {
            token_ttl: Duration::hours(100_000_000_000),
            ..config()
        };
        assert!(create_token(&forever, &user()).is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let expired = AuthConfig {
            token_ttl: Duration::hours(-2),
            ..config()
        };
        let (token, _) = create_token(&expired, &user()).unwrap();
        assert!(decode_token("test-secret", &token).is_err());
    }

    #[test]
    fn unknown_account_still_pays_for_a_hash_check() {
        let dummy = DUMMY_HASH.as_deref().expect("dummy hash should be computed");
        assert!(PasswordHash::new(dummy).is_ok());
        assert!(!verify_password("admin123", dummy));

        let reg = MemoryRegistry::new();
        seed_admin(&reg, "admin", "admin123").unwrap();

        let unknown = authenticate(&reg, "root", "admin123").unwrap_err();
        let wrong = authenticate(&reg, "admin", "admin124").unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(unknown, ApiError::Unauthorized(_)));

        assert_eq!(authenticate(&reg, "admin", "admin123").unwrap().username, "admin");
    }

    #[test]
    fn seed_admin_is_idempotent() {
        let reg = MemoryRegistry::new();
        assert!(seed_admin(&reg, "admin", "admin123").unwrap());
        assert!(!seed_admin(&reg, "admin", "different").unwrap());

        let stored = reg.get_user_by_username("admin").unwrap().unwrap();
        assert!(verify_password("admin123", &stored.password));
    }
}
