use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-secret-change-me";
const DEV_ADMIN_PASSWORD: &str = "admin123";

/// Longest admin session accepted (one year).
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Placeholder JWT secrets that MUST NOT be used in production.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", DEV_JWT_SECRET];

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    /// SQLite file for the registry. Unset keeps everything in memory.
    pub db_path: Option<PathBuf>,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub admin_username: String,
    pub admin_password: String,
    pub deny_terms: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let production = var("IECC_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production"));

        let host = var("IECC_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("IECC_PORT")
            .unwrap_or_else(|| "5000".into())
            .parse()
            .context("IECC_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let jwt_secret = var("IECC_JWT_SECRET").unwrap_or_default();
        let jwt_secret = if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            if production {
                bail!("IECC_JWT_SECRET is unset or still a placeholder");
            }
            warn!("IECC_JWT_SECRET is unset or a placeholder; admin tokens are forgeable");
            DEV_JWT_SECRET.to_string()
        } else {
            jwt_secret
        };

        let token_ttl_hours: i64 = match var("IECC_TOKEN_TTL_HOURS") {
            Some(v) => v.parse().context("IECC_TOKEN_TTL_HOURS must be an integer")?,
            None => 12,
        };
        if token_ttl_hours <= 0 {
            bail!("IECC_TOKEN_TTL_HOURS must be positive");
        }
        if token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            bail!("IECC_TOKEN_TTL_HOURS must be at most {}", MAX_TOKEN_TTL_HOURS);
        }

        let admin_username = var("IECC_ADMIN_USERNAME")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "admin".into());
        let admin_password = match var("IECC_ADMIN_PASSWORD").filter(|v| !v.is_empty()) {
            Some(p) => p,
            None => {
                if production {
                    bail!("IECC_ADMIN_PASSWORD must be set in production");
                }
                warn!("IECC_ADMIN_PASSWORD is unset; seeding admin with the default password");
                DEV_ADMIN_PASSWORD.to_string()
            }
        };

        Ok(Self {
            addr,
            db_path: var("IECC_DB_PATH").filter(|v| !v.is_empty()).map(PathBuf::from),
            jwt_secret,
            token_ttl_hours,
            admin_username,
            admin_password,
            deny_terms: var("IECC_DENY_TERMS"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.addr, "0.0.0.0:5000".parse::<SocketAddr>().unwrap());
        assert!(config.db_path.is_none());
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.token_ttl_hours, 12);
        assert_eq!(config.admin_username, "admin");
        assert_eq!(config.admin_password, DEV_ADMIN_PASSWORD);
        assert!(config.deny_terms.is_none());
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("IECC_HOST", "127.0.0.1"),
            ("IECC_PORT", "8080"),
            ("IECC_DB_PATH", "/var/lib/iecc/registry.db"),
            ("IECC_JWT_SECRET", "s3cret"),
            ("IECC_TOKEN_TTL_HOURS", "2"),
            ("IECC_ADMIN_USERNAME", "root"),
            ("IECC_ADMIN_PASSWORD", "hunter22"),
            ("IECC_DENY_TERMS", "spam,eggs"),
        ])
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.db_path, Some(PathBuf::from("/var/lib/iecc/registry.db")));
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.token_ttl_hours, 2);
        assert_eq!(config.admin_username, "root");
        assert_eq!(config.admin_password, "hunter22");
        assert_eq!(config.deny_terms.as_deref(), Some("spam,eggs"));
    }

    #[test]
    fn production_refuses_placeholders() {
        let err = load(&[("IECC_ENV", "production"), ("IECC_ADMIN_PASSWORD", "x")]).unwrap_err();
        assert!(err.to_string().contains("IECC_JWT_SECRET"));

        let err = load(&[
            ("IECC_ENV", "Production"),
            ("IECC_JWT_SECRET", "dev-secret-change-me"),
            ("IECC_ADMIN_PASSWORD", "x"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("IECC_JWT_SECRET"));

        let err = load(&[("IECC_ENV", "production"), ("IECC_JWT_SECRET", "s3cret")]).unwrap_err();
        assert!(err.to_string().contains("IECC_ADMIN_PASSWORD"));

        assert!(
            load(&[
                ("IECC_ENV", "production"),
                ("IECC_JWT_SECRET", "s3cret"),
                ("IECC_ADMIN_PASSWORD", "x"),
            ])
            .is_ok()
        );
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(load(&[("IECC_PORT", "http")]).is_err());
        assert!(load(&[("IECC_TOKEN_TTL_HOURS", "0")]).is_err());
        assert!(load(&[("IECC_TOKEN_TTL_HOURS", "soon")]).is_err());
    }

    #[test]
    fn token_ttl_is_capped() {
        assert_eq!(
            load(&[("IECC_TOKEN_TTL_HOURS", "8760")]).unwrap().token_ttl_hours,
            MAX_TOKEN_TTL_HOURS
        );

        let err = load(&[("IECC_TOKEN_TTL_HOURS", "8761")]).unwrap_err();
        assert!(err.to_string().contains("at most 8760"));

        // Large enough to overflow a timestamp, and beyond what chrono can
        // even represent as a duration.
        assert!(load(&[("IECC_TOKEN_TTL_HOURS", "100000000000")]).is_err());
        assert!(load(&[("IECC_TOKEN_TTL_HOURS", "9223372036854775807")]).is_err());
    }
}
