//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

use super::constants::{
    DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES, DEFAULT_DATABASE_URL, DEFAULT_JWT_ALGORITHM,
    DEFAULT_PASSWORD_HASH_ITERATIONS, DEFAULT_PASSWORD_HASH_MEMORY_KIB,
    DEFAULT_PASSWORD_HASH_PARALLELISM, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    MIN_JWT_SECRET_LENGTH, SUPPORTED_JWT_ALGORITHMS,
};
use crate::errors::{AppError, AppResult};

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashCost {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_PASSWORD_HASH_MEMORY_KIB,
            iterations: DEFAULT_PASSWORD_HASH_ITERATIONS,
            parallelism: DEFAULT_PASSWORD_HASH_PARALLELISM,
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub access_token_expire_minutes: i64,
    pub password_hash_cost: PasswordHashCost,
    pub server_host: String,
    pub server_port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .field("password_hash_cost", &self.password_hash_cost)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honoured when present. Fails if `JWT_SECRET` is
    /// missing in a release build, too short, or if any numeric setting
    /// does not parse.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            }
            Err(_) => {
                return Err(AppError::config(
                    "JWT_SECRET environment variable must be set in production",
                ))
            }
        };

        let cost = PasswordHashCost::default();

        let base = Self::new(
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
        )?
        .with_jwt_algorithm(
            &env::var("JWT_ALGORITHM").unwrap_or_else(|_| DEFAULT_JWT_ALGORITHM.to_string()),
        )?;

        Ok(Self {
            access_token_expire_minutes: parse_var(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
            )?,
            password_hash_cost: PasswordHashCost {
                memory_kib: parse_var("PASSWORD_HASH_MEMORY_KIB", cost.memory_kib)?,
                iterations: parse_var("PASSWORD_HASH_ITERATIONS", cost.iterations)?,
                parallelism: parse_var("PASSWORD_HASH_PARALLELISM", cost.parallelism)?,
            },
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            ..base
        })
    }

    /// Build a configuration with defaults for everything but the
    /// database URL and signing secret.
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> AppResult<Self> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::config(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        Ok(Self {
            database_url: database_url.into(),
            jwt_secret,
            jwt_algorithm: Algorithm::HS256,
            access_token_expire_minutes: DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
            password_hash_cost: PasswordHashCost::default(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            cors_allowed_origins: Vec::new(),
        })
    }

    /// Replace the signing algorithm; only HMAC variants are accepted.
    pub fn with_jwt_algorithm(mut self, name: &str) -> AppResult<Self> {
        let name = name.trim().to_ascii_uppercase();
        if !SUPPORTED_JWT_ALGORITHMS.contains(&name.as_str()) {
            return Err(AppError::config(format!(
                "JWT_ALGORITHM must be one of {}",
                SUPPORTED_JWT_ALGORITHMS.join(", ")
            )));
        }
        self.jwt_algorithm = Algorithm::from_str(&name)
            .map_err(|e| AppError::config(format!("Invalid JWT_ALGORITHM: {}", e)))?;
        Ok(self)
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Read and parse an optional environment variable.
fn parse_var<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("{} is invalid: {}", key, e))),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
