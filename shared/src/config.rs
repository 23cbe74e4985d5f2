use std::str::FromStr;

use anyhow::{Context, Result};

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub reservation: ReservationConfig,
    pub spaces: SpacesConfig,
}

impl AppConfig {
    pub fn new() -> Result<AppConfig> {
        let database = DatabaseConfig {
            host: env_or("DATABASE_HOST", "localhost"),
            port: parse_env_or("DATABASE_PORT", 5432)?,
            username: env_or("DATABASE_USERNAME", "app"),
            password: env_or("DATABASE_PASSWORD", "passwd"),
            database: env_or("DATABASE_NAME", "app"),
        };
        let redis = RedisConfig {
            host: env_or("REDIS_HOST", "localhost"),
            port: parse_env_or("REDIS_PORT", 6379)?,
        };
        let auth = AuthConfig {
            ttl: parse_env_or("AUTH_TOKEN_TTL", 86400)?,
        };
        let reservation = ReservationConfig {
            min_duration_minutes: parse_env_or("RESERVATION_MIN_DURATION_MINUTES", 30)?,
            max_duration_hours: parse_env_or("RESERVATION_MAX_DURATION_HOURS", 4)?,
        };
        let mode = match std::env::var("SPACES_MODE") {
            Err(_) => SpaceResolutionMode::Local,
            Ok(v) => v.parse()?,
        };
        let spaces = SpacesConfig {
            mode,
            base_url: env_or("SPACES_BASE_URL", "http://spaces:8000/api"),
            timeout_seconds: parse_env_or("SPACES_TIMEOUT_SECONDS", 5)?,
        };
        Ok(AppConfig {
            database,
            redis,
            auth,
            reservation,
            spaces,
        })
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

pub struct AuthConfig {
    pub ttl: u64,
}

pub struct ReservationConfig {
    pub min_duration_minutes: i64,
    pub max_duration_hours: i64,
}

/// How space data is obtained: from the shared datastore, or from the
/// spaces service over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceResolutionMode {
    Local,
    Remote,
}

impl FromStr for SpaceResolutionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(SpaceResolutionMode::Local),
            "remote" => Ok(SpaceResolutionMode::Remote),
            other => anyhow::bail!("unknown space resolution mode: {other}"),
        }
    }
}

pub struct SpacesConfig {
    pub mode: SpaceResolutionMode,
    pub base_url: String,
    pub timeout_seconds: u64,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(v) => v.parse().with_context(|| format!("failed to parse {key}")),
    }
}
