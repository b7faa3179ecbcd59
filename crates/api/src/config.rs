//! Environment-sourced configuration
//!
//! Loaded once at startup; the signing secret and hashing cost live for the
//! process lifetime and are never reloaded.

use std::time::Duration;

/// Fallback signing secret, accepted only when MEDREC_ENV=development
const DEV_JWT_SECRET: &str = "medrec-dev-secret-do-not-use-in-production";

/// Default session token lifetime
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Default bcrypt work factor
const DEFAULT_BCRYPT_COST: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// Symmetric signing secret for session tokens
    pub jwt_secret: String,
    /// How long an issued token is accepted
    pub token_lifetime: Duration,
    /// bcrypt work factor; verification time scales with this
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let environment = std::env::var("MEDREC_ENV").unwrap_or_else(|_| "production".to_string());

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if environment == "development" => {
                tracing::warn!("JWT_SECRET not set, using development fallback secret");
                DEV_JWT_SECRET.to_string()
            }
            _ => anyhow::bail!("JWT_SECRET must be set outside development"),
        };

        let token_lifetime = match std::env::var("TOKEN_LIFETIME") {
            Ok(raw) => parse_duration(&raw)
                .ok_or_else(|| anyhow::anyhow!("TOKEN_LIFETIME is not a valid duration: {raw}"))?,
            Err(_) => DEFAULT_TOKEN_LIFETIME,
        };

        let bcrypt_cost = match std::env::var("BCRYPT_COST") {
            Ok(raw) => raw
                .parse::<u32>()
                .map_err(|_| anyhow::anyhow!("BCRYPT_COST is not a valid integer: {raw}"))?,
            Err(_) => DEFAULT_BCRYPT_COST,
        };

        Ok(Self {
            database_url,
            bind_address,
            jwt_secret,
            token_lifetime,
            bcrypt_cost,
        })
    }
}

/// Parse a duration string like "90s", "15m", "24h", or "7d".
/// A bare number is taken as seconds.
fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (value, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => raw.split_at(idx),
        None => (raw, "s"),
    };

    let value: u64 = value.parse().ok()?;
    let seconds = match unit {
        "s" => value,
        "m" => value.checked_mul(60)?,
        "h" => value.checked_mul(60 * 60)?,
        "d" => value.checked_mul(24 * 60 * 60)?,
        _ => return None,
    };

    Some(Duration::from_secs(seconds))
}
