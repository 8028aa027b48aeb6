//! Core domain entities for peer routing.
//!
//! Reference: spec.md Section 3 (Data Model).

use crate::crypto::{Address, PublicKey};

/// A logical peer identity: an address paired with the public key that
/// proves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peer {
    pub address: Address,
    pub public_key: PublicKey,
}

impl Peer {
    pub fn new(address: Address, public_key: PublicKey) -> Self {
        Self {
            address,
            public_key,
        }
    }

    /// Build a peer from its public key, deriving the address.
    pub fn from_public_key(public_key: PublicKey) -> Self {
        Self {
            address: public_key.to_address(),
            public_key,
        }
    }
}

/// A reachable network endpoint. Routing deals exclusively in `BoundPeer`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: std::net::IpAddr,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: std::net::IpAddr, port: u16) -> Self {
        Self { host, port }
    }
}

/// A `Peer` plus the endpoint it can be reached at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundPeer {
    pub peer: Peer,
    pub endpoint: Endpoint,
    /// Last time this peer made (or was credited with) contact.
    pub last_updated: Timestamp,
}

impl BoundPeer {
    pub fn new(peer: Peer, endpoint: Endpoint, last_updated: Timestamp) -> Self {
        Self {
            peer,
            endpoint,
            last_updated,
        }
    }

    pub fn address(&self) -> Address {
        self.peer.address
    }
}

/// Unix timestamp in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn add_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    pub fn sub_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_sub(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    #[test]
    fn bound_peer_address_matches_peer_address() {
        let keypair = KeyPair::generate();
        let peer = Peer::from_public_key(keypair.public_key());
        let endpoint = Endpoint::new(std::net::IpAddr::from([127, 0, 0, 1]), 30303);
        let bound = BoundPeer::new(peer, endpoint, Timestamp::new(1_000));
        assert_eq!(bound.address(), peer.address);
    }

    #[test]
    fn timestamp_arithmetic_saturates() {
        let ts = Timestamp::new(100);
        assert_eq!(ts.add_secs(50).as_secs(), 150);
        assert_eq!(ts.sub_secs(200).as_secs(), 0);
    }
}
