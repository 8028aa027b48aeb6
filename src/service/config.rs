//! Driver-level timeouts.
//!
//! Reference: SPEC_FULL.md Section 3 (timeout defaults).

use std::time::Duration;

/// Timeouts governing bootstrap, lookup, and liveness probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// How long to wait for a bootstrap seed to respond to a ping.
    pub ping_seed_timeout: Duration,
    /// Overall budget for the self-lookup performed during bootstrap, and
    /// for `FindPeer` lookups in general.
    pub find_peer_timeout: Duration,
    /// Budget for a single lookup round's parallel queries.
    pub round_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            ping_seed_timeout: Duration::from_secs(5),
            find_peer_timeout: Duration::from_secs(30),
            round_timeout: Duration::from_secs(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = DriverConfig::default();
        assert_eq!(config.ping_seed_timeout, Duration::from_secs(5));
        assert_eq!(config.find_peer_timeout, Duration::from_secs(30));
        assert_eq!(config.round_timeout, Duration::from_secs(2));
    }
}
