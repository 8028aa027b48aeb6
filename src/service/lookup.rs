//! Pure helpers for the iterative `FindPeer` lookup.
//!
//! Reference: spec.md Section 4.5 ("FindPeer(target)").

use std::collections::HashSet;

use crate::crypto::Address;
use crate::domain::services::xor_distance;
use crate::domain::BoundPeer;

/// Merge newly `discovered` peers into `shortlist`, re-sort by distance to
/// `target`, and truncate to the closest `k`. Returns whether the closest
/// known distance improved, which the caller uses to decide whether another
/// lookup round is worthwhile.
pub fn merge_shortlist(
    shortlist: &mut Vec<BoundPeer>,
    discovered: Vec<BoundPeer>,
    target: &Address,
    k: usize,
) -> bool {
    let best_before = shortlist.first().map(|p| xor_distance(&p.address(), target));

    for peer in discovered {
        if peer.address() == *target {
            continue;
        }
        if let Some(existing) = shortlist.iter_mut().find(|p| p.address() == peer.address()) {
            *existing = peer;
        } else {
            shortlist.push(peer);
        }
    }

    shortlist.sort_by_key(|p| xor_distance(&p.address(), target));
    shortlist.truncate(k);

    let best_after = shortlist.first().map(|p| xor_distance(&p.address(), target));
    match (best_before, best_after) {
        (Some(before), Some(after)) => after < before,
        (None, Some(_)) => true,
        _ => false,
    }
}

/// The next `alpha` shortlist members not yet queried, closest first.
pub fn next_round_candidates(
    shortlist: &[BoundPeer],
    queried: &HashSet<Address>,
    alpha: usize,
) -> Vec<BoundPeer> {
    shortlist
        .iter()
        .filter(|p| !queried.contains(&p.address()))
        .take(alpha)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Endpoint, Peer, Timestamp};

    fn peer_with_address(byte: u8) -> BoundPeer {
        let address = Address::new([byte; 20]);
        let public_key = crate::crypto::KeyPair::generate().public_key();
        BoundPeer::new(
            Peer::new(address, public_key),
            Endpoint::new(std::net::IpAddr::from([127, 0, 0, 1]), 30303),
            Timestamp::new(0),
        )
    }

    #[test]
    fn merge_shortlist_deduplicates_and_truncates() {
        let target = Address::new([0u8; 20]);
        let mut shortlist = vec![peer_with_address(0xFF)];
        let improved = merge_shortlist(&mut shortlist, vec![peer_with_address(0x01)], &target, 1);
        assert!(improved);
        assert_eq!(shortlist.len(), 1);
        assert_eq!(shortlist[0].address(), Address::new([0x01u8; 20]));
    }

    #[test]
    fn merge_shortlist_excludes_target() {
        let target = Address::new([0x42u8; 20]);
        let mut shortlist = Vec::new();
        merge_shortlist(&mut shortlist, vec![peer_with_address(0x42)], &target, 5);
        assert!(shortlist.is_empty());
    }

    #[test]
    fn next_round_candidates_skips_queried_and_caps_at_alpha() {
        let target = Address::new([0u8; 20]);
        let mut shortlist = vec![peer_with_address(0x01), peer_with_address(0x02), peer_with_address(0x03)];
        shortlist.sort_by_key(|p| xor_distance(&p.address(), &target));
        let mut queried = HashSet::new();
        queried.insert(Address::new([0x01u8; 20]));

        let next = next_round_candidates(&shortlist, &queried, 1);
        assert_eq!(next.len(), 1);
        assert_ne!(next[0].address(), Address::new([0x01u8; 20]));
    }
}
