use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // Contribution service endpoints
    pub contribution_status_url: String,
    pub contribution_url: String,
    pub contribution_bulk_url: String,
    pub http_timeout_secs: u64,

    // API
    pub api_key: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL not set")?,

            contribution_status_url: std::env::var("TRANSLATION_CONTRIBUTION_STATUS_URL")
                .context("TRANSLATION_CONTRIBUTION_STATUS_URL not set")?,
            contribution_url: std::env::var("TRANSLATION_CONTRIBUTION_URL")
                .context("TRANSLATION_CONTRIBUTION_URL not set")?,
            contribution_bulk_url: std::env::var("TRANSLATION_CONTRIBUTION_URL_BULK")
                .context("TRANSLATION_CONTRIBUTION_URL_BULK not set")?,
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),

            // Blank API_KEY means unset
            api_key: std::env::var("API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty())
                .context("API_KEY not set")?,
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }
}
