use anyhow::{bail, Context, Result};

use crate::discovery::{primary, secondary};
use crate::mailer::DEFAULT_SMTP_HOST;

/// Where uploaded resumes are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    S3(S3Config),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Without it, accounts are kept in memory.
    pub database_url: Option<String>,
    pub storage: StorageBackend,
    pub smtp_host: String,
    pub primary_discovery_url: String,
    pub secondary_discovery_url: String,
    /// Seed values for the user's discovery keys.
    pub primary_discovery_api_key: Option<String>,
    pub secondary_discovery_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            database_url: optional_env("DATABASE_URL"),
            storage: storage_from_env()?,
            smtp_host: env_or("SMTP_HOST", DEFAULT_SMTP_HOST),
            primary_discovery_url: env_or("PRIMARY_DISCOVERY_URL", primary::DEFAULT_BASE_URL),
            secondary_discovery_url: env_or("SECONDARY_DISCOVERY_URL", secondary::DEFAULT_BASE_URL),
            primary_discovery_api_key: optional_env("PRIMARY_DISCOVERY_API_KEY"),
            secondary_discovery_api_key: optional_env("SECONDARY_DISCOVERY_API_KEY"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn storage_from_env() -> Result<StorageBackend> {
    parse_storage_backend(&env_or("STORAGE_BACKEND", "memory"), || {
        Ok(S3Config {
            bucket: require_env("S3_BUCKET")?,
            endpoint: require_env("S3_ENDPOINT")?,
            access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
        })
    })
}

fn parse_storage_backend(
    kind: &str,
    s3: impl FnOnce() -> Result<S3Config>,
) -> Result<StorageBackend> {
    match kind.trim().to_lowercase().as_str() {
        "memory" => Ok(StorageBackend::Memory),
        "s3" => Ok(StorageBackend::S3(s3()?)),
        other => bail!("STORAGE_BACKEND must be 'memory' or 's3', got '{other}'"),
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}
