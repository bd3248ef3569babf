//! Invoker that spawns real processes via `std::process::Command`.

use crate::backend::CommandInvoker;
use crate::error::{Error, Result};
use std::process::{Command, Stdio};

/// Invoker that executes real commands with fixed environment overrides.
#[derive(Debug, Clone, Default)]
pub struct ProcessInvoker {
    env: Vec<(String, String)>,
}

impl ProcessInvoker {
    /// Create an invoker with no environment overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an environment override applied to every invocation.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    fn command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        cmd
    }
}

impl CommandInvoker for ProcessInvoker {
    fn run(&self, program: &str, args: &[String]) -> Result<String> {
        log::debug!("running {} {}", program, args.join(" "));

        let output = self
            .command(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                program: program.to_string(),
                args: args.to_vec(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_run_captures_stdout() {
        let invoker = ProcessInvoker::new();
        let out = invoker
            .run("sh", &["-c".into(), "printf 'a\\tb'".into()])
            .unwrap();
        assert_eq!(out, "a\tb");
    }

    #[test]
    fn test_env_override_applied() {
        let invoker = ProcessInvoker::new().env("HOME", "/tmp");
        let out = invoker
            .run("sh", &["-c".into(), "printf %s \"$HOME\"".into()])
            .unwrap();
        assert_eq!(out, "/tmp");
    }

    #[test]
    fn test_nonzero_exit_is_error() {
        let invoker = ProcessInvoker::new();
        let err = invoker
            .run("sh", &["-c".into(), "echo boom >&2; exit 3".into()])
            .unwrap_err();
        match err {
            Error::CommandFailed { stderr, program, .. } => {
                assert_eq!(program, "sh");
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let invoker = ProcessInvoker::new();
        let err = invoker
            .run("definitely-not-a-real-binary-burrow", &[])
            .unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }
}
