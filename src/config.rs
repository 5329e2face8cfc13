use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

use crate::errors::{Error, Result};

const DEV_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub upload_dir: String,
    /// When set, NGOs must be approved by an admin before they can request donations.
    pub require_ngo_approval: bool,
    pub allowed_origins: Vec<String>,
    pub auth_rate_limit_period_secs: u64,
    /// Zero disables the limiter on the sign-in/sign-up routes.
    pub auth_rate_limit_burst: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_url: "sqlite://surplus_share.db?mode=rwc".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl_hours: 24,
            upload_dir: "uploads".to_string(),
            require_ngo_approval: false,
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            auth_rate_limit_period_secs: 2,
            auth_rate_limit_burst: 10,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        let production = env::var("RUST_ENV").is_ok_and(|mode| mode == "production");

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if production => {
                return Err(Error::Config("JWT_SECRET must be set in production".into()));
            }
            _ => {
                warn!("JWT_SECRET not set, using the development secret");
                defaults.jwt_secret
            }
        };

        let allowed_origins = match env::var("ALLOWED_ORIGINS") {
            Ok(value) => value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => defaults.allowed_origins,
        };

        Ok(Self {
            host: try_load("HOST", defaults.host)?,
            port: try_load("PORT", defaults.port)?,
            database_url: try_load("DATABASE_URL", defaults.database_url)?,
            jwt_secret,
            jwt_ttl_hours: try_load("JWT_TTL_HOURS", defaults.jwt_ttl_hours)?,
            upload_dir: try_load("UPLOAD_DIR", defaults.upload_dir)?,
            require_ngo_approval: try_load("REQUIRE_NGO_APPROVAL", defaults.require_ngo_approval)?,
            allowed_origins,
            auth_rate_limit_period_secs: try_load(
                "AUTH_RATE_LIMIT_PERIOD_SECS",
                defaults.auth_rate_limit_period_secs,
            )?,
            auth_rate_limit_burst: try_load("AUTH_RATE_LIMIT_BURST", defaults.auth_rate_limit_burst)?,
        })
    }
}

fn try_load<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid {key} value `{value}`: {e}"))),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
