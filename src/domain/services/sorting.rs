//! Peer sorting and selection by XOR distance.
//!
//! Reference: spec.md Section 8 ("Neighbor ordering": ascending XOR distance,
//! closest first).

use super::distance::xor_distance;
use crate::crypto::Address;
use crate::domain::BoundPeer;

/// Sort peers by ascending XOR distance from `target` (closest first).
pub fn sort_by_distance(peers: &[BoundPeer], target: &Address) -> Vec<BoundPeer> {
    let mut sorted = peers.to_vec();
    sorted.sort_by_key(|peer| xor_distance(&peer.address(), target));
    sorted
}

/// The `k` closest peers to `target`, ascending by distance.
pub fn find_k_closest(peers: &[BoundPeer], target: &Address, k: usize) -> Vec<BoundPeer> {
    let sorted = sort_by_distance(peers, target);
    sorted.into_iter().take(k).collect()
}
