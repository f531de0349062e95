use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

use voxboard_api::auth::AuthConfig;
use voxboard_api::oauth::GoogleConfig;

/// JWT secrets shipped in sample env files. Refused at startup.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "changeme",
    "secret",
];

/// Upper bound on session token lifetime (one year).
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("VOXBOARD_JWT_SECRET is unset or still a placeholder")]
    InsecureSecret,
    #[error("{var} must be a number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("VOXBOARD_TOKEN_TTL_HOURS must be between 1 and {max}, got {0}", max = MAX_TOKEN_TTL_HOURS)]
    InvalidTokenTtl(i64),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub auth: AuthConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup, so tests don't touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = var("VOXBOARD_JWT_SECRET", "");
        if jwt_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::InsecureSecret);
        }

        let port = number("VOXBOARD_PORT", var("VOXBOARD_PORT", "8080"))?;
        let ttl_hours: i64 = number("VOXBOARD_TOKEN_TTL_HOURS", var("VOXBOARD_TOKEN_TTL_HOURS", "24"))?;
        let token_ttl = Some(ttl_hours)
            .filter(|hours| (1..=MAX_TOKEN_TTL_HOURS).contains(hours))
            .and_then(Duration::try_hours)
            .ok_or(ConfigError::InvalidTokenTtl(ttl_hours))?;

        let admin_emails = var("VOXBOARD_ADMIN_EMAILS", "")
            .split(',')
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .collect();

        Ok(Self {
            host: var("VOXBOARD_HOST", "0.0.0.0"),
            port,
            db_path: var("VOXBOARD_DB_PATH", "voxboard.db").into(),
            auth: AuthConfig {
                jwt_secret,
                token_ttl,
                admin_emails,
                google: GoogleConfig {
                    client_id: var("GOOGLE_CLIENT_ID", ""),
                    client_secret: var("GOOGLE_CLIENT_SECRET", ""),
                    redirect_url: var("GOOGLE_REDIRECT_URL", ""),
                },
            },
        })
    }
}

fn number<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { var, value })
}
