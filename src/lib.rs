//! # P2P Networking Core
//!
//! Signed message codec and Kademlia-style routing table for blockchain
//! peer-to-peer networking.
//!
//! ## Architecture
//!
//! The crate follows a hexagonal layout:
//! - **Domain layer:** pure Kademlia logic (XOR distance, k-buckets, the
//!   routing table) with no I/O.
//! - **Codec:** the signed multipart message format shared by every peer.
//! - **Ports layer:** trait boundaries the protocol driver requires from
//!   its host (`MessageSocket`, `TimeSource`, `ConfigProvider`,
//!   `ChainCollaborator`, `SyncCollaborator`) and exposes to it
//!   (`ProtocolDriverApi`).
//! - **Service layer:** `Driver`, the concrete `ProtocolDriverApi`
//!   implementation tying the above together.
//! - **Adapters:** concrete `ConfigProvider`s (`StaticConfigProvider`,
//!   and `TomlConfigProvider` behind the `config-toml` feature).
//!
//! ## Example
//!
//! ```rust
//! use p2p_core::{Address, KademliaConfig, RoutingTable};
//!
//! let local = Address::new([0u8; 20]);
//! let table = RoutingTable::new(local, KademliaConfig::default()).unwrap();
//! assert_eq!(table.count(), 0);
//! ```

pub mod adapters;
pub mod codec;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

#[cfg(feature = "test-utils")]
pub mod testing;

// Re-export identity and crypto primitives.
pub use crypto::{Address, CryptoError, KeyPair, PublicKey, SignatureBytes};

// Re-export domain types.
pub use domain::{
    BoundPeer, Distance, Endpoint, KBucket, KademliaConfig, Peer, RoutingError, RoutingTable,
    Timestamp,
};

// Re-export domain services.
pub use domain::services::{bucket_index, common_prefix_length, find_k_closest, sort_by_distance, xor_distance};

// Re-export the message codec.
pub use codec::{
    CodecError, GetBlockHashes, Hash, HashList, Message, ParsedMessage, PeerSetDeltaRecord,
};

// Re-export port traits.
pub use ports::{
    ChainCollaborator, ConfigProvider, DriverError, MessageSocket, ProtocolDriverApi,
    SyncCollaborator, TimeSource, TransportError,
};

// Re-export the service layer.
pub use service::{Driver, DriverConfig};

// Re-export the top-level error aggregate.
pub use error::P2pError;

// Re-export the configuration adapters.
pub use adapters::StaticConfigProvider;
#[cfg(feature = "config-toml")]
pub use adapters::{ConfigError, TomlConfigProvider};
