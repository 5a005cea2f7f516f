//! Run command: retry a program until it exits 0.

use anyhow::{Context, Result};
use perfect_retry_core::config::{Backoff, RetryConfig};
use perfect_retry_core::{CancelToken, Policy, Retrier, RetryError};

use crate::cli::child::{run_once, CommandError, CommandFailureKind};

/// `run` flags; unset ones fall back to the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub limit: Option<u32>,
    pub unlimited: bool,
    pub delay_ms: Option<u64>,
    pub backoff: Option<Backoff>,
    pub max_delay_secs: Option<u64>,
    pub fatal_exit_codes: Vec<i32>,
    pub command: Vec<String>,
}

impl RunOptions {
    /// Config with the command-line overrides applied.
    pub fn effective_config(&self, cfg: &RetryConfig) -> RetryConfig {
        let mut cfg = cfg.clone();
        if let Some(limit) = self.limit {
            cfg.limit = limit;
            cfg.unlimited = false;
        }
        if self.unlimited {
            cfg.unlimited = true;
        }
        if let Some(ms) = self.delay_ms {
            cfg.base_delay_secs = ms as f64 / 1000.0;
        }
        if let Some(backoff) = self.backoff {
            cfg.backoff = backoff;
        }
        if let Some(secs) = self.max_delay_secs {
            cfg.max_delay_secs = secs;
        }
        cfg
    }

    /// Spawn failures and the listed exit codes are fatal; everything else is retried.
    pub fn policy(&self, cfg: &RetryConfig) -> Result<Policy<CommandError>> {
        let fatal = std::iter::once(CommandFailureKind::Spawn).chain(
            self.fatal_exit_codes
                .iter()
                .map(|&code| CommandFailureKind::Exit(code)),
        );
        let policy = self
            .effective_config(cfg)
            .policy_builder::<CommandError>()?
            .fatal_kinds(fatal)
            .build()?;
        Ok(policy)
    }
}

/// Run the program under `retrier`; returns the attempt that succeeded.
pub fn execute_program(
    retrier: &Retrier<CommandError>,
    command: &[String],
) -> Result<u32, RetryError<CommandError>> {
    let (program, args) = match command.split_first() {
        Some(split) => split,
        None => {
            return Err(RetryError::Fatal(CommandError::Spawn {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            }))
        }
    };
    retrier.execute(|attempt| run_once(program, args, attempt).map(|()| attempt))
}

/// Retry the program from `opts`, cancelling the pending wait on Ctrl-C.
pub async fn run_program(cfg: &RetryConfig, opts: RunOptions) -> Result<()> {
    let policy = opts.policy(cfg)?;
    tracing::debug!("run policy: {:?}", policy);

    let token = CancelToken::new();
    let retrier = Retrier::new(policy).with_cancel(token.clone());
    let command = opts.command.clone();
    let mut task = tokio::task::spawn_blocking(move || execute_program(&retrier, &command));

    let outcome = tokio::select! {
        joined = &mut task => joined?,
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::info!("interrupt received, cancelling retries");
            token.cancel();
            task.await?
        }
    };

    let attempt = outcome.with_context(|| format!("running {}", opts.command.join(" ")))?;
    tracing::info!(attempt, "{} succeeded", opts.command.join(" "));
    Ok(())
}
