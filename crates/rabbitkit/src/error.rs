//! Error types for broker discovery and convergence.
//!
//! Errors are categorized so callers can decide what to surface and what
//! a later reconciliation pass will correct on its own. Nothing in this
//! crate retries: a failed pass is fixed by running the pass again.

use thiserror::Error;

/// Categories of errors raised while reconciling queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Broker output could not be turned into structured data
    Decode,
    /// An external tool failed to start or exited non-zero
    Command,
    /// A desired identifier has no recoverable name or vhost
    Identity,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Decode => "Unreadable broker output",
            Self::Command => "Broker command failed",
            Self::Identity => "Invalid queue identifier",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Decode => {
                "Inspect `rabbitmqctl list_queues` output, or set on_decode_error = \"skip\""
            }
            Self::Command => "Check the broker is running and the admin credentials are valid",
            Self::Identity => "Use the form name@vhost, or give the queue an explicit vhost",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur while discovering or converging queues.
#[derive(Debug, Error)]
pub enum Error {
    /// The arguments column could not be repaired into a JSON object
    #[error("cannot decode queue arguments {text:?}: {source}")]
    ArgumentDecode {
        /// Text after the repair heuristics ran
        text: String,
        /// Underlying JSON parse error
        #[source]
        source: serde_json::Error,
    },

    /// The arguments column decoded to something other than an object
    #[error("queue arguments {text:?} are not a key/value mapping")]
    ArgumentShape {
        /// Text after the repair heuristics ran
        text: String,
    },

    /// A queue listing line is missing required columns
    #[error("malformed queue listing in vhost {vhost}: {line:?}")]
    MalformedListing {
        /// Virtual host being listed
        vhost: String,
        /// The offending line
        line: String,
    },

    /// A desired identifier has no recoverable name or vhost
    #[error("invalid queue identifier {identifier:?}: {reason}")]
    InvalidIdentifier {
        /// The identifier as supplied
        identifier: String,
        /// What was missing
        reason: &'static str,
    },

    /// The command could not be started
    #[error("failed to execute {program}: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The command ran and exited unsuccessfully
    #[error("{program} {} failed ({status}): {stderr}", .args.join(" "))]
    CommandFailed {
        /// Program that was invoked
        program: String,
        /// Arguments it was invoked with
        args: Vec<String>,
        /// Exit status description
        status: String,
        /// Standard error output from the failed command
        stderr: String,
    },

    /// JSON error outside of argument decoding
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::ArgumentDecode { .. }
            | Error::ArgumentShape { .. }
            | Error::MalformedListing { .. } => ErrorCategory::Decode,
            Error::Spawn { .. } | Error::CommandFailed { .. } => ErrorCategory::Command,
            Error::InvalidIdentifier { .. } => ErrorCategory::Identity,
            _ => ErrorCategory::Other,
        }
    }

    /// Whether a decode-skip policy may drop the line that raised this error.
    pub fn is_line_local(&self) -> bool {
        self.category() == ErrorCategory::Decode
    }
}

/// Result type for broker operations.
pub type Result<T> = std::result::Result<T, Error>;
