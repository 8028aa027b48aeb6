//! Routing-table errors.
//!
//! Reference: spec.md Section 7 (Error Handling Design).

use thiserror::Error;

/// Errors raised by routing-table construction and mutation.
///
/// Policy: `ArgumentOutOfRange` and `ArgumentInvalid` are programmer errors
/// and propagate to the caller; there is no recovery path for them inside
/// this crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// A configuration value was `<= 0` at construction.
    #[error("argument out of range: {0}")]
    ArgumentOutOfRange(&'static str),

    /// A null peer, or the local node itself, was passed to `AddPeer` /
    /// `RemovePeer`.
    #[error("invalid argument: {0}")]
    ArgumentInvalid(&'static str),

    /// The requested peer is not present in the table.
    #[error("peer not found")]
    PeerNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_non_empty() {
        assert!(!RoutingError::PeerNotFound.to_string().is_empty());
        assert!(!RoutingError::ArgumentOutOfRange("x").to_string().is_empty());
        assert!(!RoutingError::ArgumentInvalid("x").to_string().is_empty());
    }
}
