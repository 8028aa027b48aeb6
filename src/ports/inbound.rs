//! Driving port: the protocol driver's own public contract.
//!
//! Reference: spec.md Section 4.5.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::codec::{CodecError, Message};
use crate::domain::{BoundPeer, RoutingError};

use super::outbound::TransportError;

/// Errors from driver operations.
///
/// Reference: spec.md Section 7 — `Timeout` is recovered locally (peer
/// treated as unresponsive); `Cancelled` propagates with routing state left
/// consistent; the rest wrap the layer they came from.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("operation timed out")]
    Timeout,
    #[error("operation was cancelled")]
    Cancelled,
    #[error(transparent)]
    Routing(#[from] RoutingError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// The protocol driver's public contract: maintain routing-table health and
/// convert inbound messages into routing-table events plus outbound
/// replies.
///
/// Every operation takes a `CancellationToken`; cancellation is cooperative
/// and leaves routing state consistent.
#[async_trait]
pub trait ProtocolDriverApi: Send + Sync {
    async fn bootstrap(
        &self,
        seeds: Vec<BoundPeer>,
        ping_seed_timeout: Duration,
        find_peer_timeout: Duration,
        ct: CancellationToken,
    ) -> Result<(), DriverError>;

    async fn refresh_table(&self, max_age: Duration, ct: CancellationToken) -> Result<(), DriverError>;

    async fn rebuild_connection(&self, ct: CancellationToken) -> Result<(), DriverError>;

    async fn check_replacement_cache(&self, ct: CancellationToken) -> Result<(), DriverError>;

    async fn receive_message(
        &self,
        sender: BoundPeer,
        message: Message,
    ) -> Result<(), DriverError>;

    /// Human-readable dump of bucket contents, for diagnostics.
    fn trace(&self) -> String;
}
