use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_FALLBACK_MODEL, DEFAULT_MODEL, GEMINI_API_BASE_URL};

/// Default upload ceiling for resume files (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub primary_model: String,
    pub fallback_model: String,
    pub identity_api_key: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub app_env: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_base_url: env_or("GEMINI_BASE_URL", GEMINI_API_BASE_URL),
            primary_model: env_or("GEMINI_MODEL", DEFAULT_MODEL),
            fallback_model: env_or("GEMINI_FALLBACK_MODEL", DEFAULT_FALLBACK_MODEL),
            identity_api_key: require_env("IDENTITY_API_KEY")?,
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(raw) => raw
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a positive integer")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            app_env: env_or("APP_ENV", "development"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Error responses carry a `details` field only outside production.
    pub fn expose_error_details(&self) -> bool {
        !self.app_env.eq_ignore_ascii_case("production")
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
