//! Blocking child-process execution with optional exit-status checking.
//!
//! The [`Executor`] trait is the seam the cmake wrapper delegates to;
//! [`SystemExecutor`] spawns real processes through `std::process::Command`.

use std::collections::BTreeMap;
use std::io;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Environment handed to a child process, variable name to value.
pub type Env = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum ProcessExecutionError {
    #[error("empty command line")]
    EmptyCommand,
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} failed with {}", describe_code(*.code))]
    Failed { program: String, code: Option<i32> },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    /// `None` when the child was terminated by a signal.
    pub code: Option<i32>,
}

impl ExecOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub trait Executor: Send + Sync {
    /// Runs `argv[0]` with the remaining elements as arguments and waits for it.
    ///
    /// `env` of `None` (or an empty map) inherits the current environment;
    /// otherwise the child sees exactly the given variables. With `check`
    /// set, a non-zero exit is reported as [`ProcessExecutionError::Failed`].
    fn execute(
        &self,
        argv: &[String],
        env: Option<&Env>,
        check: bool,
    ) -> Result<ExecOutcome, ProcessExecutionError>;
}

/// Spawns processes with inherited stdio; output goes straight to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn execute(
        &self,
        argv: &[String],
        env: Option<&Env>,
        check: bool,
    ) -> Result<ExecOutcome, ProcessExecutionError> {
        let (program, args) = argv
            .split_first()
            .ok_or(ProcessExecutionError::EmptyCommand)?;

        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(vars) = env.filter(|vars| !vars.is_empty()) {
            cmd.env_clear().envs(vars);
        }

        let custom_env = env.is_some_and(|vars| !vars.is_empty());
        debug!(?argv, custom_env, "spawning");
        let status = cmd.status().map_err(|source| {
            debug!("spawn of {program} failed: {source}");
            ProcessExecutionError::Spawn {
                program: program.clone(),
                source,
            }
        })?;

        let outcome = ExecOutcome {
            code: status.code(),
        };
        if check && !outcome.success() {
            debug!("{program} exited with {status}");
            return Err(ProcessExecutionError::Failed {
                program: program.clone(),
                code: outcome.code,
            });
        }
        Ok(outcome)
    }
}
