//! Top-level error aggregation for host applications that want a single
//! error type at the crate boundary.
//!
//! Reference: SPEC_FULL.md Section 7 (Error Handling Design).

use thiserror::Error;

use crate::codec::CodecError;
use crate::domain::RoutingError;
use crate::ports::{DriverError, TransportError};

/// Aggregates every error this crate can produce. Internal layers keep
/// their own narrow error enums (`RoutingError`, `CodecError`,
/// `DriverError`, `TransportError`); this type exists for callers that
/// would rather match one thing at the application boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum P2pError {
    #[error(transparent)]
    Routing(#[from] RoutingError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_routing_error() {
        let err: P2pError = RoutingError::PeerNotFound.into();
        assert!(matches!(err, P2pError::Routing(RoutingError::PeerNotFound)));
    }

    #[test]
    fn wraps_codec_error() {
        let err: P2pError = CodecError::EmptyFrameSequence.into();
        assert!(matches!(err, P2pError::Codec(CodecError::EmptyFrameSequence)));
    }
}
