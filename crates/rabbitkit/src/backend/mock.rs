//! Scripted invoker for tests.

use crate::backend::CommandInvoker;
use crate::error::{Error, Result};
use std::sync::{Mutex, PoisonError};

/// A recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// `program arg1 arg2 ...`
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

enum Reply {
    Stdout(String),
    Fail(String),
}

/// Invoker that answers from canned replies and records every call.
///
/// Replies are matched by command-line prefix, first match wins. Calls
/// with no matching reply succeed with empty output.
#[derive(Default)]
pub struct MockInvoker {
    replies: Vec<(String, Reply)>,
    calls: Mutex<Vec<Invocation>>,
}

impl MockInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix` with `stdout`.
    pub fn respond(mut self, prefix: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.replies.push((prefix.into(), Reply::Stdout(stdout.into())));
        self
    }

    /// Fail commands starting with `prefix` with a non-zero exit.
    pub fn fail(mut self, prefix: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.replies.push((prefix.into(), Reply::Fail(stderr.into())));
        self
    }

    /// Every invocation so far, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Invocations of `program` only.
    pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|c| c.program == program)
            .collect()
    }
}

impl CommandInvoker for MockInvoker {
    fn run(&self, program: &str, args: &[String]) -> Result<String> {
        let invocation = Invocation {
            program: program.to_string(),
            args: args.to_vec(),
        };
        let line = invocation.command_line();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(invocation);

        match self.replies.iter().find(|(prefix, _)| line.starts_with(prefix)) {
            Some((_, Reply::Stdout(out))) => Ok(out.clone()),
            Some((_, Reply::Fail(stderr))) => Err(Error::CommandFailed {
                program: program.to_string(),
                args: args.to_vec(),
                status: "exit status: 1".to_string(),
                stderr: stderr.clone(),
            }),
            None => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_match_and_record() {
        let mock = MockInvoker::new()
            .respond("rabbitmqctl list_vhosts", "/\n")
            .fail("rabbitmqadmin delete", "not found");

        let out = mock.run("rabbitmqctl", &["list_vhosts".into(), "-q".into()]).unwrap();
        assert_eq!(out, "/\n");
        assert!(mock.run("rabbitmqadmin", &["delete".into()]).is_err());
        assert_eq!(mock.run("true", &[]).unwrap(), "");

        assert_eq!(mock.calls().len(), 3);
        assert_eq!(mock.calls_to("rabbitmqctl")[0].command_line(), "rabbitmqctl list_vhosts -q");
    }
}
