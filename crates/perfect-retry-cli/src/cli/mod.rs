//! CLI for perfect-retry.

mod child;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use perfect_retry_core::config::{self, Backoff};

use commands::{run_program, show_config, RunOptions};

/// Top-level CLI: run a program until it succeeds.
#[derive(Debug, Parser)]
#[command(name = "perfect-retry")]
#[command(about = "perfect-retry: run a program, retrying it until it succeeds", long_about = None)]
pub struct Cli {
    /// Log to ~/.local/state/perfect-retry/perfect-retry.log instead of stderr.
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackoffArg {
    Constant,
    Exponential,
}

impl From<BackoffArg> for Backoff {
    fn from(arg: BackoffArg) -> Self {
        match arg {
            BackoffArg::Constant => Backoff::Constant,
            BackoffArg::Exponential => Backoff::Exponential,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run PROGRAM until it exits 0 or the retry limit is reached.
    Run {
        /// Retries allowed after the first attempt (overrides config).
        #[arg(long, value_name = "N", conflicts_with = "unlimited")]
        limit: Option<u32>,

        /// Retry until success or a fatal exit code.
        #[arg(long)]
        unlimited: bool,

        /// Delay between attempts, or the exponential base, in milliseconds.
        #[arg(long, value_name = "MS")]
        delay_ms: Option<u64>,

        /// Delay curve between attempts.
        #[arg(long, value_enum)]
        backoff: Option<BackoffArg>,

        /// Cap on the exponential delay, in seconds.
        #[arg(long, value_name = "SECS")]
        max_delay_secs: Option<u64>,

        /// Exit code that stops retrying immediately (repeatable).
        #[arg(long = "fatal-exit-code", value_name = "CODE")]
        fatal_exit_codes: Vec<i32>,

        /// Program to run, followed by its arguments.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true, value_name = "PROGRAM")]
        command: Vec<String>,
    },

    /// Show the config file path and the resolved retry settings.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        crate::init_logging(cli.log_file);

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                limit,
                unlimited,
                delay_ms,
                backoff,
                max_delay_secs,
                fatal_exit_codes,
                command,
            } => {
                let opts = RunOptions {
                    limit,
                    unlimited,
                    delay_ms,
                    backoff: backoff.map(Backoff::from),
                    max_delay_secs,
                    fatal_exit_codes,
                    command,
                };
                run_program(&cfg, opts).await?;
            }
            CliCommand::Config => show_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
