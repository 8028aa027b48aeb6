//! `ConfigProvider` adapters.
//!
//! Reference: SPEC_FULL.md Section 2 ("A `ConfigProvider` port plus a
//! static/TOML adapter for `tableSize`, `bucketSize`, `alpha`, timeouts").

use crate::domain::{BoundPeer, KademliaConfig};
use crate::ports::ConfigProvider;

/// In-memory configuration provider with hardcoded values.
///
/// Useful for tests and for hosts that assemble their bootstrap set some
/// other way. For loading from a file, see `TomlConfigProvider` (behind the
/// `config-toml` feature).
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    bootstrap_seeds: Vec<BoundPeer>,
    config: KademliaConfig,
}

impl StaticConfigProvider {
    pub fn new() -> Self {
        Self {
            bootstrap_seeds: Vec::new(),
            config: KademliaConfig::default(),
        }
    }

    pub fn with_bootstrap_seeds(mut self, seeds: Vec<BoundPeer>) -> Self {
        self.bootstrap_seeds = seeds;
        self
    }

    pub fn with_config(mut self, config: KademliaConfig) -> Self {
        self.config = config;
        self
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn bootstrap_seeds(&self) -> Vec<BoundPeer> {
        self.bootstrap_seeds.clone()
    }

    fn kademlia_config(&self) -> KademliaConfig {
        self.config.clone()
    }
}

#[cfg(feature = "config-toml")]
mod toml_provider {
    use std::fs;
    use std::net::IpAddr;
    use std::path::Path;

    use serde::Deserialize;
    use thiserror::Error;

    use super::*;
    use crate::crypto::{Address, PublicKey};
    use crate::domain::{Endpoint, Peer, Timestamp};

    #[derive(Debug, Deserialize, Default)]
    struct ConfigFile {
        #[serde(default)]
        bootstrap: Vec<SeedEntry>,
        #[serde(default)]
        kademlia: KademliaFile,
    }

    #[derive(Debug, Deserialize)]
    struct SeedEntry {
        address: String,
        public_key: String,
        host: IpAddr,
        port: u16,
    }

    #[derive(Debug, Deserialize, Default)]
    struct KademliaFile {
        table_size: Option<usize>,
        bucket_size: Option<usize>,
        alpha: Option<usize>,
        k: Option<usize>,
    }

    /// Errors loading or parsing a TOML configuration file.
    #[derive(Debug, Error, Clone)]
    pub enum ConfigError {
        #[error("failed to read {path}: {error}")]
        Io { path: String, error: String },
        #[error("failed to parse config: {0}")]
        Parse(String),
        #[error("invalid bootstrap seed {address}: {reason}")]
        InvalidSeed { address: String, reason: String },
    }

    /// Loads bootstrap seeds and `KademliaConfig` from a TOML file.
    ///
    /// # Config file format
    ///
    /// ```toml
    /// [kademlia]
    /// table_size = 160
    /// bucket_size = 16
    /// alpha = 3
    /// k = 16
    ///
    /// [[bootstrap]]
    /// address = "00112233445566778899aabbccddeeff0011223"
    /// public_key = "02...33 hex bytes, compressed secp256k1..."
    /// host = "203.0.113.10"
    /// port = 30303
    /// ```
    pub struct TomlConfigProvider {
        bootstrap_seeds: Vec<BoundPeer>,
        config: KademliaConfig,
    }

    impl TomlConfigProvider {
        pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
            let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
                path: path.as_ref().display().to_string(),
                error: e.to_string(),
            })?;
            Self::parse(&content)
        }

        pub fn parse(content: &str) -> Result<Self, ConfigError> {
            let file: ConfigFile =
                toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

            let mut bootstrap_seeds = Vec::with_capacity(file.bootstrap.len());
            for seed in &file.bootstrap {
                let address = parse_address(&seed.address).map_err(|reason| ConfigError::InvalidSeed {
                    address: seed.address.clone(),
                    reason,
                })?;
                let public_key =
                    parse_public_key(&seed.public_key).map_err(|reason| ConfigError::InvalidSeed {
                        address: seed.address.clone(),
                        reason,
                    })?;
                let peer = Peer::new(address, public_key);
                let endpoint = Endpoint::new(seed.host, seed.port);
                bootstrap_seeds.push(BoundPeer::new(peer, endpoint, Timestamp::new(0)));
            }

            let defaults = KademliaConfig::default();
            let kc = file.kademlia;
            let config = KademliaConfig {
                table_size: kc.table_size.unwrap_or(defaults.table_size),
                bucket_size: kc.bucket_size.unwrap_or(defaults.bucket_size),
                alpha: kc.alpha.unwrap_or(defaults.alpha),
                k: kc.k.unwrap_or(defaults.bucket_size),
            };

            Ok(Self {
                bootstrap_seeds,
                config,
            })
        }
    }

    impl ConfigProvider for TomlConfigProvider {
        fn bootstrap_seeds(&self) -> Vec<BoundPeer> {
            self.bootstrap_seeds.clone()
        }

        fn kademlia_config(&self) -> KademliaConfig {
            self.config.clone()
        }
    }

    fn parse_address(s: &str) -> Result<Address, String> {
        decode_hex::<20>(s).map(Address::new)
    }

    fn parse_public_key(s: &str) -> Result<PublicKey, String> {
        let bytes = decode_hex::<33>(s)?;
        PublicKey::from_bytes(bytes).map_err(|e| e.to_string())
    }

    fn decode_hex<const N: usize>(s: &str) -> Result<[u8; N], String> {
        if s.len() != N * 2 {
            return Err(format!("expected {} hex characters, got {}", N * 2, s.len()));
        }
        let mut out = [0u8; N];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| format!("invalid hex byte at position {i}"))?;
        }
        Ok(out)
    }

}

#[cfg(feature = "config-toml")]
pub use toml_provider::{ConfigError, TomlConfigProvider};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::domain::{Endpoint, Peer, Timestamp};

    #[test]
    fn static_provider_defaults_to_no_seeds_and_default_config() {
        let provider = StaticConfigProvider::new();
        assert!(provider.bootstrap_seeds().is_empty());
        assert_eq!(provider.kademlia_config(), KademliaConfig::default());
    }

    #[test]
    fn static_provider_returns_configured_seeds() {
        let keypair = KeyPair::generate();
        let peer = Peer::from_public_key(keypair.public_key());
        let endpoint = Endpoint::new(std::net::IpAddr::from([127, 0, 0, 1]), 30303);
        let seed = BoundPeer::new(peer, endpoint, Timestamp::new(0));

        let provider = StaticConfigProvider::new().with_bootstrap_seeds(vec![seed]);

        assert_eq!(provider.bootstrap_seeds(), vec![seed]);
    }
}
