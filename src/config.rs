use std::time::Duration;

use thiserror::Error;

use crate::api::AlcorClient;
use crate::services::chart_service::ChartOptions;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{name} must be {expected}, got '{value}'")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Runtime settings, read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    pub tokens_url: String,
    pub pools_url: String,
    pub http_timeout: Duration,
    pub chart: ChartOptions,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tokens_url: AlcorClient::DEFAULT_TOKENS_URL.to_string(),
            pools_url: AlcorClient::DEFAULT_POOLS_URL.to_string(),
            http_timeout: AlcorClient::DEFAULT_TIMEOUT,
            chart: ChartOptions::default(),
        }
    }
}

impl Config {
    /// TOKENS_URL, POOLS_URL, HTTP_TIMEOUT_SECS, CHART_WIDTH, CHART_HEIGHT,
    /// CHART_PADDING; anything unset keeps its default
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("TOKENS_URL").filter(|v| !v.trim().is_empty()) {
            config.tokens_url = url.trim().to_string();
        }
        if let Some(url) = lookup("POOLS_URL").filter(|v| !v.trim().is_empty()) {
            config.pools_url = url.trim().to_string();
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "HTTP_TIMEOUT_SECS", "a whole number of seconds")? {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(width) = parse_var::<u32, _>(&lookup, "CHART_WIDTH", "a positive pixel count")? {
            config.chart.width = positive(width, "CHART_WIDTH")?;
        }
        if let Some(height) = parse_var::<u32, _>(&lookup, "CHART_HEIGHT", "a positive pixel count")? {
            config.chart.height = positive(height, "CHART_HEIGHT")?;
        }
        if let Some(padding) = parse_var::<f64, _>(&lookup, "CHART_PADDING", "a non-negative number")? {
            if !padding.is_finite() || padding < 0.0 {
                return Err(ConfigError {
                    name: "CHART_PADDING",
                    value: padding.to_string(),
                    expected: "a non-negative number",
                });
            }
            config.chart.padding = padding;
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str, expected: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| ConfigError {
            name,
            value: raw,
            expected,
        }),
    }
}

fn positive(value: u32, name: &'static str) -> Result<u32, ConfigError> {
    if value == 0 {
        return Err(ConfigError {
            name,
            value: value.to_string(),
            expected: "a positive pixel count",
        });
    }
    Ok(value)
}
