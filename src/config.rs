//! Process configuration read from the environment.

use crate::engine::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::error::{Error, Result};
use std::time::Duration;

/// Settings for the real reasoning engine and scraping service.
#[derive(Debug, Clone)]
pub struct Settings {
    pub deepseek_api_key: String,
    pub deepseek_base_url: String,
    pub model: String,
    pub scrapingant_api_key: String,
    pub render_js: bool,
    /// Deadline for a whole pipeline run
    pub request_timeout: Duration,
    /// Per-call HTTP timeout for the reasoning engine
    pub model_timeout: Duration,
    /// Per-call HTTP timeout for the scraping service
    pub scrape_timeout: Duration,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required =
            |key: &str| get(key).ok_or_else(|| Error::Config(format!("{} is not set", key)));
        let seconds = |key: &str, default: u64| -> Result<Duration> {
            match get(key) {
                Some(raw) => raw
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| {
                        Error::Config(format!("{} must be a number of seconds, got '{}'", key, raw))
                    }),
                None => Ok(Duration::from_secs(default)),
            }
        };

        Ok(Self {
            deepseek_api_key: required("DEEPSEEK_API_KEY")?,
            deepseek_base_url: get("DEEPSEEK_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: get("DEEPSEEK_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            scrapingant_api_key: required("SCRAPINGANT_API_KEY")?,
            render_js: get("SCRAPINGANT_RENDER_JS").is_none_or(|v| v.eq_ignore_ascii_case("true")),
            request_timeout: seconds("RIVALSCOPE_REQUEST_TIMEOUT_SECS", 180)?,
            model_timeout: seconds("RIVALSCOPE_MODEL_TIMEOUT_SECS", 60)?,
            scrape_timeout: seconds("RIVALSCOPE_SCRAPE_TIMEOUT_SECS", 25)?,
        })
    }
}
