//! The routing table: a fixed array of k-buckets guarded by a single mutex.
//!
//! Reference: spec.md Section 4.3.

use parking_lot::Mutex;
use rand::seq::SliceRandom;

use crate::crypto::Address;
use crate::domain::services::bucket_index;
use crate::domain::{BoundPeer, KBucket, KademliaConfig, RoutingError};

/// Kademlia routing table. All mutation is serialized through a single
/// `parking_lot::Mutex` guarding the bucket array; the mutex is never held
/// across an await point — callers perform I/O (liveness probes) outside the
/// lock and feed results back in a second call.
#[derive(Debug)]
pub struct RoutingTable {
    local_address: Address,
    config: KademliaConfig,
    buckets: Mutex<Vec<KBucket>>,
}

impl RoutingTable {
    /// Construct a table for `local_address`. Fails if `config` is invalid.
    pub fn new(local_address: Address, config: KademliaConfig) -> Result<Self, RoutingError> {
        config.validate()?;
        let buckets = (0..config.table_size)
            .map(|_| KBucket::new(config.bucket_size))
            .collect();
        Ok(Self {
            local_address,
            config,
            buckets: Mutex::new(buckets),
        })
    }

    pub fn local_address(&self) -> Address {
        self.local_address
    }

    pub fn config(&self) -> &KademliaConfig {
        &self.config
    }

    fn index_of(&self, address: &Address) -> usize {
        bucket_index(&self.local_address, address, self.config.table_size)
    }

    /// Add or refresh `peer`. Errors if `peer` is the local address.
    ///
    /// Delegates to the target bucket's `add_peer`; any candidate-for-eviction
    /// bubbled up from the bucket is returned unchanged.
    pub fn add_peer(&self, peer: BoundPeer) -> Result<Option<BoundPeer>, RoutingError> {
        if peer.address() == self.local_address {
            return Err(RoutingError::ArgumentInvalid(
                "cannot add the local address to the routing table",
            ));
        }
        let index = self.index_of(&peer.address());
        let mut buckets = self.buckets.lock();
        Ok(buckets[index].add_peer(peer))
    }

    /// Remove `address`. Errors if it is the local address. Returns whether
    /// the peer was present.
    pub fn remove_peer(&self, address: &Address) -> Result<bool, RoutingError> {
        if *address == self.local_address {
            return Err(RoutingError::ArgumentInvalid(
                "cannot remove the local address from the routing table",
            ));
        }
        let index = self.index_of(address);
        let mut buckets = self.buckets.lock();
        Ok(buckets[index].remove_peer(address).is_some())
    }

    /// Pop the newest replacement-cache candidate for the bucket holding
    /// `address`, promoting it into the bucket if a slot is now free.
    ///
    /// Used by the protocol driver after a dead head has been evicted via
    /// `remove_peer`.
    pub fn promote_from_replacement_cache(&self, address: &Address) -> Option<BoundPeer> {
        let index = self.index_of(address);
        let mut buckets = self.buckets.lock();
        let candidate = buckets[index].replacement_cache_pop()?;
        buckets[index].add_peer(candidate);
        Some(candidate)
    }

    /// The head (least-recently-seen peer) of bucket `level`, if any.
    pub fn bucket_head(&self, level: usize) -> Option<BoundPeer> {
        self.buckets.lock().get(level).and_then(|b| b.head().copied())
    }

    /// Pop the newest replacement candidate for bucket `level` without
    /// promoting it. Used by the protocol driver's liveness-probe loop,
    /// which decides separately whether to re-add it via `add_peer`.
    pub fn pop_replacement_candidate(&self, level: usize) -> Option<BoundPeer> {
        self.buckets.lock().get_mut(level)?.replacement_cache_pop()
    }

    /// Indices of buckets that currently hold replacement-cache candidates.
    pub fn buckets_with_replacement_candidates(&self) -> Vec<usize> {
        self.buckets
            .lock()
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.replacement_cache().is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn contains(&self, address: &Address) -> bool {
        let index = self.index_of(address);
        self.buckets.lock()[index].contains(address)
    }

    pub fn bucket_of(&self, address: &Address) -> usize {
        self.index_of(address)
    }

    /// Snapshot of the peers in bucket `level`, in recency order.
    pub fn bucket_at(&self, level: usize) -> Vec<BoundPeer> {
        self.buckets
            .lock()
            .get(level)
            .map(|bucket| bucket.peers().to_vec())
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.buckets.lock().iter().map(|b| b.len()).sum()
    }

    /// Indices of buckets that are not yet full.
    pub fn non_full_buckets(&self) -> Vec<usize> {
        self.buckets
            .lock()
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.is_full())
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of buckets that hold at least one peer.
    pub fn non_empty_buckets(&self) -> Vec<usize> {
        self.buckets
            .lock()
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    /// Up to `2 * k` peers closest to `target`, ascending by XOR distance,
    /// excluding `target` itself.
    pub fn neighbors(&self, target: &Address, k: usize) -> Vec<BoundPeer> {
        let all_peers: Vec<BoundPeer> = self
            .buckets
            .lock()
            .iter()
            .flat_map(|b| b.peers().iter().copied())
            .filter(|p| &p.address() != target)
            .collect();

        crate::domain::services::find_k_closest(&all_peers, target, 2 * k)
    }

    /// One randomly chosen peer per non-empty bucket.
    pub fn peers_to_broadcast(&self) -> Vec<BoundPeer> {
        let mut rng = rand::thread_rng();
        self.buckets
            .lock()
            .iter()
            .filter(|b| !b.is_empty())
            .filter_map(|b| b.peers().choose(&mut rng).copied())
            .collect()
    }

    /// Empty all buckets and replacement caches.
    pub fn clear(&self) {
        let mut buckets = self.buckets.lock();
        for bucket in buckets.iter_mut() {
            bucket.clear();
        }
    }
}
