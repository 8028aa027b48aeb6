//! Kademlia arithmetic: common-prefix-length (bucket placement) and XOR
//! distance (neighbor ordering).
//!
//! Reference: spec.md Section 4.1, GLOSSARY ("CPL", "XOR distance").

use crate::crypto::Address;
use crate::domain::Distance;

/// Number of leading bits `a` and `b` have in common.
///
/// Used to pick a bucket index: `min(common_prefix_length(a, b), table_size - 1)`.
/// Returns `160` when `a == b`.
pub fn common_prefix_length(a: &Address, b: &Address) -> u32 {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    for i in 0..20 {
        let xor = a_bytes[i] ^ b_bytes[i];
        if xor != 0 {
            return (i as u32) * 8 + xor.leading_zeros();
        }
    }
    160
}

/// The bucket index a peer at `remote` belongs in, relative to `local`,
/// given a table of `table_size` buckets.
pub fn bucket_index(local: &Address, remote: &Address, table_size: usize) -> usize {
    let cpl = common_prefix_length(local, remote) as usize;
    cpl.min(table_size - 1)
}

/// The XOR distance between two addresses, as used by `SortByDistance` /
/// `Neighbors`. Distinct from `common_prefix_length`: this is the full
/// 160-bit magnitude, not a bucket index.
pub fn xor_distance(a: &Address, b: &Address) -> Distance {
    Distance::between(a, b)
}
