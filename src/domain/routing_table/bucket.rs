//! K-bucket: bounded recency-ordered peer list with a secondary replacement
//! queue.
//!
//! Reference: spec.md Section 4.2.

use crate::crypto::Address;
use crate::domain::BoundPeer;

/// A single Kademlia bucket.
///
/// The head (`peers[0]`) is the least-recently-seen peer; the tail is the
/// most recently seen. On overflow the driver liveness-probes the head
/// before evicting it — see `add_peer`.
#[derive(Debug, Clone)]
pub struct KBucket {
    capacity: usize,
    peers: Vec<BoundPeer>,
    replacement_cache: Vec<BoundPeer>,
}

impl KBucket {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            peers: Vec::new(),
            replacement_cache: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.peers.len() >= self.capacity
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.peers.iter().any(|p| &p.address() == address)
    }

    pub fn peers(&self) -> &[BoundPeer] {
        &self.peers
    }

    pub fn head(&self) -> Option<&BoundPeer> {
        self.peers.first()
    }

    pub fn tail(&self) -> Option<&BoundPeer> {
        self.peers.last()
    }

    pub fn replacement_cache(&self) -> &[BoundPeer] {
        &self.replacement_cache
    }

    /// Insert or refresh `peer`.
    ///
    /// If already present, it is moved to the tail (recency bump) and `None`
    /// is returned. If the bucket has room, it is appended at the tail. If
    /// the bucket is full, `peer` goes into the replacement cache instead
    /// (evicting the oldest cached candidate if that cache is also full, or
    /// bumping `peer` to newest if it was already cached) and the current
    /// head is returned as the candidate the caller should liveness-probe.
    pub fn add_peer(&mut self, peer: BoundPeer) -> Option<BoundPeer> {
        if let Some(pos) = self.peers.iter().position(|p| p.address() == peer.address()) {
            self.peers.remove(pos);
            self.peers.push(peer);
            return None;
        }

        if !self.is_full() {
            self.peers.push(peer);
            return None;
        }

        if let Some(pos) = self
            .replacement_cache
            .iter()
            .position(|p| p.address() == peer.address())
        {
            self.replacement_cache.remove(pos);
        } else if self.replacement_cache.len() >= self.capacity {
            self.replacement_cache.remove(0);
        }
        self.replacement_cache.push(peer);

        self.peers.first().copied()
    }

    /// Remove `address` from the bucket by equality. Does not promote from
    /// the replacement cache.
    pub fn remove_peer(&mut self, address: &Address) -> Option<BoundPeer> {
        self.peers
            .iter()
            .position(|p| &p.address() == address)
            .map(|pos| self.peers.remove(pos))
    }

    /// Pop and return the newest replacement candidate.
    pub fn replacement_cache_pop(&mut self) -> Option<BoundPeer> {
        self.replacement_cache.pop()
    }

    pub fn clear(&mut self) {
        self.peers.clear();
        self.replacement_cache.clear();
    }
}
