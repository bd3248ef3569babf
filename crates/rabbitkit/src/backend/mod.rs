//! Command invocation abstraction.
//!
//! The [`CommandInvoker`] trait is the only way this crate reaches the
//! broker, allowing for different implementations (real processes, mocks
//! for testing). It is configured once at startup and passed explicitly.
//!
//! The scripted `mock::MockInvoker` is only built for this crate's tests
//! or with the `mock` feature.

#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod process;

use crate::error::Result;

/// Runs external commands and returns their captured stdout.
///
/// Implementations must fail with a command error on a non-zero exit. No
/// timeout is imposed here; an implementation that needs one adds it.
pub trait CommandInvoker: Send + Sync {
    /// Run `program` with `args`, returning stdout as text.
    fn run(&self, program: &str, args: &[String]) -> Result<String>;
}
