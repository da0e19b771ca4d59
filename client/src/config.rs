//! Session and trap-listener configuration.
//!
//! [`SessionConfig`]/[`TrapListenerConfig`] are the code-first builder
//! surface. When the `serde` feature is enabled they also derive
//! `Deserialize`/`Serialize` so an embedding application can load them from
//! its own TOML/YAML/JSON config file; this crate never reads a file
//! itself, matching the "no persisted state" non-goal.

use std::collections::HashSet;
use std::time::Duration;

/// Per-session parameters: target agent, community, and the retry/timeout
/// and bulk-request defaults every request on the session inherits.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub community: String,
    #[cfg_attr(feature = "serde", serde(with = "duration_millis"))]
    pub timeout: Duration,
    pub retries: u32,
    pub max_repetitions: u32,
    pub non_repeaters: u32,
    /// Drop replies whose source `(ip, port)` does not match the configured
    /// peer. Defaults to `true`; RFC 1901 does not require this, it is this
    /// library's explicit hardening default.
    pub validate_source_addr: bool,
    /// When `true`, a walk that observes a non-increasing OID from the
    /// agent raises `Error::NonIncreasingOid` instead of ending the walk
    /// silently. Defaults to `false` (end-of-walk), matching the source
    /// implementation's default.
    pub strict: bool,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>) -> SessionConfig {
        SessionConfig {
            host: host.into(),
            ..SessionConfig::default()
        }
    }

    pub fn port(mut self, port: u16) -> SessionConfig {
        self.port = port;
        self
    }

    pub fn community(mut self, community: impl Into<String>) -> SessionConfig {
        self.community = community.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> SessionConfig {
        self.timeout = timeout;
        self
    }

    pub fn retries(mut self, retries: u32) -> SessionConfig {
        self.retries = retries;
        self
    }

    pub fn max_repetitions(mut self, max_repetitions: u32) -> SessionConfig {
        self.max_repetitions = max_repetitions;
        self
    }

    pub fn non_repeaters(mut self, non_repeaters: u32) -> SessionConfig {
        self.non_repeaters = non_repeaters;
        self
    }

    pub fn validate_source_addr(mut self, validate: bool) -> SessionConfig {
        self.validate_source_addr = validate;
        self
    }

    pub fn strict(mut self, strict: bool) -> SessionConfig {
        self.strict = strict;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig {
            host: String::new(),
            port: 161,
            community: "public".to_string(),
            timeout: Duration::from_secs(10),
            retries: 3,
            max_repetitions: 10,
            non_repeaters: 0,
            validate_source_addr: true,
            strict: false,
        }
    }
}

/// Trap-listener parameters: bind address and an optional community
/// allow-list (default: accept any community).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TrapListenerConfig {
    pub host: String,
    pub port: u16,
    pub communities: Option<HashSet<String>>,
}

impl Default for TrapListenerConfig {
    fn default() -> TrapListenerConfig {
        TrapListenerConfig {
            host: "0.0.0.0".to_string(),
            port: 162,
            communities: None,
        }
    }
}

impl TrapListenerConfig {
    pub fn new() -> TrapListenerConfig {
        TrapListenerConfig::default()
    }

    pub fn host(mut self, host: impl Into<String>) -> TrapListenerConfig {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> TrapListenerConfig {
        self.port = port;
        self
    }

    pub fn communities(mut self, communities: impl IntoIterator<Item = String>) -> TrapListenerConfig {
        self.communities = Some(communities.into_iter().collect());
        self
    }
}

#[cfg(feature = "serde")]
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.port, 161);
        assert_eq!(cfg.community, "public");
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert_eq!(cfg.retries, 3);
        assert_eq!(cfg.max_repetitions, 10);
        assert_eq!(cfg.non_repeaters, 0);
        assert!(cfg.validate_source_addr);
        assert!(!cfg.strict);
    }

    #[test]
    fn builder_overrides_fields() {
        let cfg = SessionConfig::new("switch1.example.com")
            .port(1161)
            .community("private")
            .retries(1)
            .validate_source_addr(false);
        assert_eq!(cfg.host, "switch1.example.com");
        assert_eq!(cfg.port, 1161);
        assert_eq!(cfg.community, "private");
        assert_eq!(cfg.retries, 1);
        assert!(!cfg.validate_source_addr);
    }

    #[test]
    fn trap_listener_defaults() {
        let cfg = TrapListenerConfig::default();
        assert_eq!(cfg.port, 162);
        assert!(cfg.communities.is_none());
    }
}
