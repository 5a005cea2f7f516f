//! Config command: show where the config lives and what it resolves to.

use anyhow::Result;
use perfect_retry_core::config::{self, RetryConfig};

/// Print the config path, the effective limit and the settings as TOML.
pub fn show_config(cfg: &RetryConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    println!("# effective limit: {}", cfg.limit());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
