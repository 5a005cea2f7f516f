use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::{delay, Limit, PolicyBuilder, TracingSink, DEFAULT_LIMIT};

/// Delay curve between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// Always wait `base_delay_secs`.
    #[default]
    Constant,
    /// `base_delay_secs * 2^(attempt-1)`, capped at `max_delay_secs`.
    Exponential,
}

/// Level at which retried failures are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Retry settings loaded from `~/.config/perfect-retry/config.toml`.
///
/// Every key is optional; missing keys take the [`Default`] value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt. Ignored when `unlimited`.
    pub limit: u32,
    /// Retry until success or a fatal failure.
    pub unlimited: bool,
    pub backoff: Backoff,
    /// Constant delay, or the exponential base, in seconds (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Upper bound on the exponential delay in seconds.
    pub max_delay_secs: u64,
    pub log_level: LogLevel,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            unlimited: false,
            backoff: Backoff::Constant,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
            log_level: LogLevel::Warn,
        }
    }
}

impl RetryConfig {
    pub fn limit(&self) -> Limit {
        if self.unlimited {
            Limit::Unlimited
        } else {
            Limit::Finite(self.limit)
        }
    }

    pub fn base_delay(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.base_delay_secs)
            .with_context(|| format!("invalid base_delay_secs: {}", self.base_delay_secs))
    }

    /// A policy builder with limit, delay and a tracing sink taken from this
    /// config. The caller still decides which failures are retryable.
    pub fn policy_builder<E>(&self) -> Result<PolicyBuilder<E>> {
        let base = self.base_delay()?;
        let max = Duration::from_secs(self.max_delay_secs);
        let builder = PolicyBuilder::new()
            .limit(self.limit())
            .sink(TracingSink::new(self.log_level.into()));
        Ok(match self.backoff {
            Backoff::Constant => builder.delay(delay::constant(base)),
            Backoff::Exponential => builder.delay(delay::exponential(base, max)),
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("perfect-retry")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RetryConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<RetryConfig> {
    if !path.exists() {
        let default_cfg = RetryConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(path)
}

/// Read and parse an existing config file.
pub fn load_from(path: &Path) -> Result<RetryConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: RetryConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
