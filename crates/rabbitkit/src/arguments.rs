//! Decoder for the `arguments` column of `rabbitmqctl list_queues`.
//!
//! The broker prints queue arguments as an Erlang-flavoured proplist:
//!
//! ```text
//! [{"x-max-length",10},{"x-queue-type","classic"}]
//! ```
//!
//! That is close to JSON but not quite: keys are separated from values by
//! a comma and each pair is its own brace group. The decoder rewrites it to
//! `{"x-max-length":10,"x-queue-type":"classic"}` and parses the result.
//!
//! Grammar assumptions: a single level of brace groups, no nested braces
//! inside values, and no `",` sequence inside a key. Anything else is a
//! decode error rather than a guess.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Decoded queue arguments.
pub type Arguments = serde_json::Map<String, serde_json::Value>;

static ENCLOSING_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\[(.*)\]$").expect("valid regex"));

static KEY_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{("(?:\\"|[^"])*?"),"#).expect("valid regex"));

static GROUP_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\}\s*,\s*\{").expect("valid regex"));

/// Rewrite the broker's proplist text into JSON object text.
///
/// Exposed separately so the heuristic can be inspected without parsing.
pub fn repair(text: &str) -> String {
    let trimmed = text.trim();
    let unbracketed = ENCLOSING_BRACKETS.replace(trimmed, "$1");
    let keyed = KEY_SEPARATOR.replace_all(&unbracketed, "{$1:");
    let joined = GROUP_BOUNDARY.replace_all(&keyed, ",");

    let joined = joined.trim();
    if joined.is_empty() {
        "{}".to_string()
    } else {
        joined.to_string()
    }
}

/// Decode the broker's arguments text into a key/value mapping.
///
/// Empty text (or `[]`) is an empty mapping. Text the rewrite cannot turn
/// into a JSON object is an error, never an empty mapping.
pub fn decode_arguments(text: &str) -> Result<Arguments> {
    let repaired = repair(text);
    let value: serde_json::Value =
        serde_json::from_str(&repaired).map_err(|source| Error::ArgumentDecode {
            text: repaired.clone(),
            source,
        })?;

    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(Error::ArgumentShape { text: repaired }),
    }
}

/// Serialize arguments the way `rabbitmqadmin declare` expects them.
pub fn encode_arguments(arguments: &Arguments) -> Result<String> {
    Ok(serde_json::to_string(arguments)?)
}
