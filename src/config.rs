use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;
use crate::batch::SessionPolicy;
use crate::extractor::ExtractorConfig;

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_BROWSER_ARGS: [&str; 5] = [
    "--headless=new",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--window-size=1920,1080",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} is not a valid URL: {source}")]
    InvalidUrl { key: &'static str, source: url::ParseError },
    #[error("SESSION_POLICY: {0}")]
    InvalidPolicy(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub extractor: ExtractorConfig,
    pub webdriver_url: Url,
    pub browser_args: Vec<String>,
    pub session_policy: SessionPolicy,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Builds the configuration from defaults overridden by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut extractor = ExtractorConfig::default();
        if let Some(url) = lookup("RESULT_URL") {
            parse_url("RESULT_URL", &url)?;
            extractor.result_url = url;
        }
        if let Some(secs) = lookup("WAIT_TIMEOUT_SECS") {
            extractor.wait_timeout = Duration::from_secs(parse_number("WAIT_TIMEOUT_SECS", &secs)?);
        }
        if let Some(ms) = lookup("SETTLE_DELAY_MS") {
            extractor.settle_delay = Duration::from_millis(parse_number("SETTLE_DELAY_MS", &ms)?);
        }

        let webdriver_url = parse_url(
            "WEBDRIVER_URL",
            &lookup("WEBDRIVER_URL").unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string()),
        )?;

        let browser_args = match lookup("BROWSER_ARGS") {
            Some(raw) => raw
                .split(';')
                .map(str::trim)
                .filter(|arg| !arg.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_BROWSER_ARGS.iter().map(|arg| arg.to_string()).collect(),
        };

        let session_policy = match lookup("SESSION_POLICY") {
            Some(raw) => raw.parse::<SessionPolicy>().map_err(ConfigError::InvalidPolicy)?,
            None => SessionPolicy::default(),
        };

        Ok(Config {
            extractor,
            webdriver_url,
            browser_args,
            session_policy,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: value.to_string(),
    })
}

fn parse_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim()).map_err(|source| ConfigError::InvalidUrl { key, source })
}
