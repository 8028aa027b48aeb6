//! Reference: spec.md Section 8 (concrete scenarios 3, 4, 5).

use super::*;
use crate::crypto::{Address, KeyPair};
use crate::domain::{Endpoint, KademliaConfig, Peer, Timestamp};

fn address_with_cpl(cpl: u32) -> Address {
    let mut bytes = [0u8; 20];
    let byte_index = (cpl / 8) as usize;
    let bit_index = (cpl % 8) as u8;
    if byte_index < 20 {
        bytes[byte_index] = 0b1000_0000 >> bit_index;
    }
    Address::new(bytes)
}

fn bound_peer_with_address(address: Address) -> BoundPeer {
    let keypair = KeyPair::generate();
    let peer = Peer::new(address, keypair.public_key());
    BoundPeer::new(
        peer,
        Endpoint::new(std::net::IpAddr::from([127, 0, 0, 1]), 30303),
        Timestamp::new(0),
    )
}

fn table_with_bucket_size(bucket_size: usize) -> RoutingTable {
    let config = KademliaConfig {
        table_size: 8,
        bucket_size,
        alpha: 2,
        k: bucket_size,
    };
    RoutingTable::new(Address::zero(), config).unwrap()
}

#[test]
fn construction_rejects_invalid_config() {
    let config = KademliaConfig {
        table_size: 0,
        ..KademliaConfig::default()
    };
    assert!(RoutingTable::new(Address::zero(), config).is_err());
}

#[test]
fn self_insertion_errors() {
    let table = table_with_bucket_size(2);
    let local_peer = bound_peer_with_address(Address::zero());
    assert!(table.add_peer(local_peer).is_err());
    assert!(!table.contains(&Address::zero()));
}

#[test]
fn bucket_overflow_with_live_head_caches_candidate() {
    // Scenario 3: bucketSize=2; P1, P2 (CPL=i) fill the bucket; P3 (CPL=i)
    // overflows; head P1 is the returned eviction candidate.
    let table = table_with_bucket_size(2);
    let p1 = bound_peer_with_address(address_with_cpl(3));
    let p2 = bound_peer_with_address(address_with_cpl(3));
    let p3 = bound_peer_with_address(address_with_cpl(3));

    assert!(table.add_peer(p1).unwrap().is_none());
    assert!(table.add_peer(p2).unwrap().is_none());
    let candidate = table.add_peer(p3).unwrap();

    assert_eq!(candidate.unwrap().address(), p1.address());
    let bucket_peers = table.bucket_at(table.bucket_of(&p1.address()));
    assert_eq!(bucket_peers.len(), 2);
    assert_eq!(bucket_peers[0].address(), p1.address());
    assert_eq!(bucket_peers[1].address(), p2.address());
}

#[test]
fn bucket_overflow_with_dead_head_promotes_replacement() {
    // Scenario 4: same as 3, but P1 does not respond; after the driver
    // removes it and checks the replacement cache, bucket = [P2, P3],
    // replacement cache = [].
    let table = table_with_bucket_size(2);
    let p1 = bound_peer_with_address(address_with_cpl(3));
    let p2 = bound_peer_with_address(address_with_cpl(3));
    let p3 = bound_peer_with_address(address_with_cpl(3));

    table.add_peer(p1).unwrap();
    table.add_peer(p2).unwrap();
    table.add_peer(p3).unwrap();

    table.remove_peer(&p1.address()).unwrap();
    let promoted = table.promote_from_replacement_cache(&p1.address());

    assert_eq!(promoted.unwrap().address(), p3.address());
    let bucket_peers = table.bucket_at(table.bucket_of(&p2.address()));
    assert_eq!(bucket_peers.len(), 2);
    assert_eq!(bucket_peers[0].address(), p2.address());
    assert_eq!(bucket_peers[1].address(), p3.address());
}

#[test]
fn neighbors_excludes_target_and_is_ordered_ascending() {
    // Scenario 5: table contains 10 peers; Neighbors(P5.Address, k=3)
    // excludes P5, has length <= 6, sorted ascending by XOR distance.
    let table = table_with_bucket_size(16);
    let peers: Vec<BoundPeer> = (1u32..=10)
        .map(|i| bound_peer_with_address(address_with_cpl(i % 8)))
        .collect();
    for peer in &peers {
        table.add_peer(*peer).unwrap();
    }

    let target = peers[4].address();
    let neighbors = table.neighbors(&target, 3);

    assert!(neighbors.len() <= 6);
    assert!(neighbors.iter().all(|p| p.address() != target));

    let mut previous = crate::domain::services::xor_distance(&neighbors[0].address(), &target);
    for peer in &neighbors[1..] {
        let distance = crate::domain::services::xor_distance(&peer.address(), &target);
        assert!(distance >= previous);
        previous = distance;
    }
}

#[test]
fn clear_empties_every_bucket_and_replacement_cache() {
    let table = table_with_bucket_size(1);
    let p1 = bound_peer_with_address(address_with_cpl(2));
    let p2 = bound_peer_with_address(address_with_cpl(2));
    table.add_peer(p1).unwrap();
    table.add_peer(p2).unwrap();

    table.clear();

    assert_eq!(table.count(), 0);
    assert!(table.non_empty_buckets().is_empty());
}

#[test]
fn bucket_head_and_replacement_candidates_are_queryable_by_level() {
    let table = table_with_bucket_size(2);
    let p1 = bound_peer_with_address(address_with_cpl(3));
    let p2 = bound_peer_with_address(address_with_cpl(3));
    let p3 = bound_peer_with_address(address_with_cpl(3));
    let level = table.bucket_of(&p1.address());

    table.add_peer(p1).unwrap();
    table.add_peer(p2).unwrap();
    table.add_peer(p3).unwrap();

    assert_eq!(table.bucket_head(level).unwrap().address(), p1.address());
    assert_eq!(table.buckets_with_replacement_candidates(), vec![level]);

    let popped = table.pop_replacement_candidate(level).unwrap();
    assert_eq!(popped.address(), p3.address());
    assert!(table.buckets_with_replacement_candidates().is_empty());
}

#[test]
fn peers_to_broadcast_returns_one_per_non_empty_bucket() {
    let table = table_with_bucket_size(4);
    table
        .add_peer(bound_peer_with_address(address_with_cpl(1)))
        .unwrap();
    table
        .add_peer(bound_peer_with_address(address_with_cpl(5)))
        .unwrap();

    let broadcast_set = table.peers_to_broadcast();
    assert_eq!(broadcast_set.len(), table.non_empty_buckets().len());
}
