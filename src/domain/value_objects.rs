//! Value objects: XOR distance and routing-table configuration.
//!
//! Reference: spec.md Section 4.1 (Kademlia arithmetic) and Section 6
//! (Environment/config).

use crate::crypto::Address;
use crate::domain::RoutingError;

/// The XOR distance between two addresses, treated as a 160-bit big-endian
/// unsigned integer.
///
/// Reference: spec.md Section 4.1 (`SortByDistance`) — distinct from the
/// common-prefix-length used to pick a bucket index (see
/// `domain::services::common_prefix_length`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Distance(pub [u8; 20]);

impl Distance {
    pub fn between(a: &Address, b: &Address) -> Self {
        let mut out = [0u8; 20];
        for i in 0..20 {
            out[i] = a.as_bytes()[i] ^ b.as_bytes()[i];
        }
        Self(out)
    }

    pub fn zero() -> Self {
        Self([0u8; 20])
    }
}

/// Routing-table configuration.
///
/// Reference: spec.md Section 4.3 (`RoutingTable` construction) and Section 6
/// (defaults: `tableSize = 160`, `bucketSize = 16`, `alpha = 3`,
/// `k = bucketSize`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KademliaConfig {
    /// Number of buckets; bucket `tableSize - 1` absorbs all peers whose CPL
    /// with the local address is `>= tableSize - 1`.
    pub table_size: usize,
    /// Maximum peers per bucket, and maximum entries in its replacement
    /// cache.
    pub bucket_size: usize,
    /// Lookup parallelism factor (`alpha`).
    pub alpha: usize,
    /// Neighborhood size used by `Neighbors`/`FindPeer` (`k`). Defaults to
    /// `bucket_size`.
    pub k: usize,
}

impl Default for KademliaConfig {
    fn default() -> Self {
        Self {
            table_size: 160,
            bucket_size: 16,
            alpha: 3,
            k: 16,
        }
    }
}

impl KademliaConfig {
    /// Validate construction parameters.
    ///
    /// Reference: spec.md Section 4.3 ("`tableSize >= 1` and
    /// `bucketSize >= 1`; otherwise construction fails with an
    /// out-of-range error").
    pub fn validate(&self) -> Result<(), RoutingError> {
        if self.table_size == 0 {
            return Err(RoutingError::ArgumentOutOfRange("table_size must be >= 1"));
        }
        if self.bucket_size == 0 {
            return Err(RoutingError::ArgumentOutOfRange(
                "bucket_size must be >= 1",
            ));
        }
        Ok(())
    }

    /// A config with small buckets, convenient for deterministic tests.
    pub fn for_testing() -> Self {
        Self {
            table_size: 8,
            bucket_size: 3,
            alpha: 2,
            k: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        let a = Address::new([1u8; 20]);
        let b = Address::new([2u8; 20]);
        assert_eq!(Distance::between(&a, &b), Distance::between(&b, &a));
    }

    #[test]
    fn distance_to_self_is_zero() {
        let a = Address::new([7u8; 20]);
        assert_eq!(Distance::between(&a, &a), Distance::zero());
    }

    #[test]
    fn default_config_matches_spec_defaults() {
        let config = KademliaConfig::default();
        assert_eq!(config.table_size, 160);
        assert_eq!(config.bucket_size, 16);
        assert_eq!(config.alpha, 3);
        assert_eq!(config.k, config.bucket_size);
    }

    #[test]
    fn zero_table_size_is_rejected() {
        let config = KademliaConfig {
            table_size: 0,
            ..KademliaConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RoutingError::ArgumentOutOfRange(_))
        ));
    }
}
