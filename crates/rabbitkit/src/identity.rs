//! Queue identity: the `name@vhost` composite key.
//!
//! Discovered and desired queues are matched on the identifier string. A
//! vhost containing `@` will not round-trip, since the vhost is read from
//! after the last separator and the name from before the first.

use crate::error::{Error, Result};
use std::fmt;

/// Separator between queue name and vhost in an identifier.
pub const SEPARATOR: char = '@';

/// Composite identity of a queue within the broker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueId {
    /// Bare queue name
    pub name: String,
    /// Virtual host the queue lives in
    pub vhost: String,
}

impl QueueId {
    /// Create an identity from its parts.
    pub fn new(name: impl Into<String>, vhost: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vhost: vhost.into(),
        }
    }

    /// The identifier string used for matching.
    pub fn identifier(&self) -> String {
        format!("{}{SEPARATOR}{}", self.name, self.vhost)
    }

    /// Resolve a desired identifier into a name and vhost.
    ///
    /// An explicit `vhost_override` wins. Otherwise the vhost is the text
    /// after the last `@`, or `default_vhost` when the identifier has no
    /// separator at all.
    pub fn parse(
        identifier: &str,
        vhost_override: Option<&str>,
        default_vhost: &str,
    ) -> Result<Self> {
        let (name, vhost) = match split_identifier(identifier) {
            Some((name, vhost)) => (name, vhost),
            None => (identifier, default_vhost),
        };
        let vhost = vhost_override.unwrap_or(vhost);

        if name.is_empty() {
            return Err(Error::InvalidIdentifier {
                identifier: identifier.to_string(),
                reason: "empty queue name",
            });
        }
        if vhost.is_empty() {
            return Err(Error::InvalidIdentifier {
                identifier: identifier.to_string(),
                reason: "empty vhost",
            });
        }

        Ok(Self::new(name, vhost))
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.name, self.vhost)
    }
}

/// Split an identifier into `(name, vhost)`.
///
/// Name is everything before the first separator, vhost everything after
/// the last. Returns `None` when there is no separator.
pub fn split_identifier(identifier: &str) -> Option<(&str, &str)> {
    let first = identifier.find(SEPARATOR)?;
    let last = identifier.rfind(SEPARATOR)?;
    Some((&identifier[..first], &identifier[last + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_format() {
        assert_eq!(QueueId::new("q1", "/").identifier(), "q1@/");
        assert_eq!(QueueId::new("orders", "/prod").to_string(), "orders@/prod");
    }

    #[test]
    fn test_split_round_trip() {
        let id = QueueId::new("orders", "/prod");
        let identifier = id.identifier();
        assert_eq!(split_identifier(&identifier), Some(("orders", "/prod")));
    }

    #[test]
    fn test_split_without_separator() {
        assert_eq!(split_identifier("orders"), None);
    }

    #[test]
    fn test_split_uses_first_and_last_separator() {
        assert_eq!(split_identifier("a@b@c"), Some(("a", "c")));
    }

    #[test]
    fn test_parse_with_vhost() {
        let id = QueueId::parse("orders@/prod", None, "/").unwrap();
        assert_eq!(id, QueueId::new("orders", "/prod"));
    }

    #[test]
    fn test_parse_default_vhost() {
        let id = QueueId::parse("orders", None, "/").unwrap();
        assert_eq!(id, QueueId::new("orders", "/"));
    }

    #[test]
    fn test_parse_override_wins() {
        let id = QueueId::parse("orders@/prod", Some("/staging"), "/").unwrap();
        assert_eq!(id.vhost, "/staging");
        assert_eq!(id.name, "orders");
    }

    #[test]
    fn test_parse_empty_name() {
        let err = QueueId::parse("@/prod", None, "/").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidIdentifier {
                reason: "empty queue name",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_empty_vhost() {
        let err = QueueId::parse("orders@", None, "/").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidIdentifier {
                reason: "empty vhost",
                ..
            }
        ));
    }
}
