use std::time::Duration;

use anyhow::{Context, Result};

/// Console configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the resume-review backend, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Explicit CSRF token. When unset the token is read from the
    /// `csrftoken` cookie the backend sets on any page load.
    pub csrf_token: Option<String>,
    /// Silent re-fetch interval for analyses that are still being reviewed.
    pub poll_interval: Duration,
    /// Dashboard page size.
    pub page_size: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let poll_secs = std::env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u64>()
            .context("POLL_INTERVAL_SECS must be a whole number of seconds")?;

        Ok(Config {
            base_url: require_env("BASE_URL")?,
            csrf_token: std::env::var("CSRF_TOKEN").ok().filter(|t| !t.is_empty()),
            poll_interval: Duration::from_secs(poll_secs),
            page_size: std::env::var("PAGE_SIZE")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<usize>()
                .context("PAGE_SIZE must be a positive integer")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
