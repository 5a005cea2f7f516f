//! One attempt of the wrapped program, and how its failures classify.

use perfect_retry_core::Classify;
use std::io;
use std::process::Command;

/// Failure of a single run of the wrapped program.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The program could not be started (not found, not executable). Never retried.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    /// The program ran and exited non-zero.
    #[error("{program} exited with status {code}")]
    Exit { program: String, code: i32 },
    /// The program was killed by a signal.
    #[error("{program} terminated by signal")]
    Signal { program: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFailureKind {
    Spawn,
    Exit(i32),
    Signal,
}

impl Classify for CommandError {
    type Kind = CommandFailureKind;

    fn kind(&self) -> CommandFailureKind {
        match self {
            CommandError::Spawn { .. } => CommandFailureKind::Spawn,
            CommandError::Exit { code, .. } => CommandFailureKind::Exit(*code),
            CommandError::Signal { .. } => CommandFailureKind::Signal,
        }
    }
}

/// Run `program` once and wait for it.
pub fn run_once(program: &str, args: &[String], attempt: u32) -> Result<(), CommandError> {
    tracing::debug!(attempt, "starting {} {:?}", program, args);
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| CommandError::Spawn {
            program: program.to_string(),
            source,
        })?;
    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(CommandError::Exit {
            program: program.to_string(),
            code,
        }),
        None => Err(CommandError::Signal {
            program: program.to_string(),
        }),
    }
}
