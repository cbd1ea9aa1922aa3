use std::{fmt, net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use serde::Deserialize;

/// One year; longer lifetimes are almost certainly a unit mistake.
const MAX_TOKEN_TTL_MINUTES: u64 = 365 * 24 * 60;

/// Token signing and password hashing knobs.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    pub signing_secret: String,
    pub issuer: String,
    pub audience: String,
    pub token_ttl: Duration,
    /// Argon2 time cost (number of passes over memory).
    pub hash_cost_factor: u32,
    /// Argon2 memory cost in KiB.
    pub hash_memory_kib: u32,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("token_ttl", &self.token_ttl)
            .field("hash_cost_factor", &self.hash_cost_factor)
            .field("hash_memory_kib", &self.hash_memory_kib)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` selects the in-memory user store.
    pub database_url: Option<String>,
    pub listen_addr: SocketAddr,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let signing_secret = get("TOKEN_SECRET")
            .filter(|s| !s.is_empty())
            .context("TOKEN_SECRET must be set to a non-empty value")?;

        let ttl_minutes: u64 = parse_or(&get, "TOKEN_TTL_MINUTES", 6 * 60)?;
        anyhow::ensure!(
            (1..=MAX_TOKEN_TTL_MINUTES).contains(&ttl_minutes),
            "TOKEN_TTL_MINUTES must be between 1 and {MAX_TOKEN_TTL_MINUTES}"
        );
        let ttl_secs = ttl_minutes
            .checked_mul(60)
            .context("TOKEN_TTL_MINUTES overflows")?;

        let auth = AuthConfig {
            signing_secret,
            issuer: get("TOKEN_ISSUER").unwrap_or_else(|| "authgate".into()),
            audience: get("TOKEN_AUDIENCE").unwrap_or_else(|| "authgate-users".into()),
            token_ttl: Duration::from_secs(ttl_secs),
            hash_cost_factor: parse_or(&get, "HASH_COST_FACTOR", argon2::Params::DEFAULT_T_COST)?,
            hash_memory_kib: parse_or(&get, "HASH_MEMORY_KIB", argon2::Params::DEFAULT_M_COST)?,
        };

        let database_url = get("DATABASE_URL").filter(|s| !s.is_empty());

        let host = get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&get, "APP_PORT", 8080)?;
        let listen_addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .with_context(|| format!("APP_HOST/APP_PORT do not form a socket address: {host}:{port}"))?;

        Ok(Self {
            database_url,
            listen_addr,
            auth,
        })
    }
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}
