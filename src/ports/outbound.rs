//! Driven ports (outbound SPIs): collaborators the protocol driver requires
//! from the host application.
//!
//! Reference: SPEC_FULL.md Section 6.

use async_trait::async_trait;
use thiserror::Error;

use crate::codec::{GetBlockHashes, HashList};
use crate::crypto::Address;
use crate::domain::{BoundPeer, KademliaConfig, Timestamp};

/// Errors from sending or receiving on the underlying message-framed
/// transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
    #[error("operation timed out")]
    Timeout,
}

/// A decoded multipart message as handed up from the transport, before
/// signature verification.
#[derive(Debug, Clone)]
pub struct InboundFrames {
    pub frames: Vec<Vec<u8>>,
    /// `true` for a dealer-style reply (no identity frame), `false` for a
    /// router-style receive (leading identity frame).
    pub reply: bool,
}

/// Abstract message-framed socket. The codec never touches a socket
/// directly; the driver does, through this trait.
///
/// Reference: spec.md Section 6 ("Transport requirements").
#[async_trait]
pub trait MessageSocket: Send + Sync {
    async fn send(&self, peer: &BoundPeer, frames: Vec<Vec<u8>>) -> Result<(), TransportError>;
    async fn receive(&self) -> Result<InboundFrames, TransportError>;
}

/// Current time, injected so driver tests can run without a wall clock.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Bootstrap seeds and Kademlia tuning, loaded from the host application's
/// configuration.
pub trait ConfigProvider: Send + Sync {
    fn bootstrap_seeds(&self) -> Vec<BoundPeer>;
    fn kademlia_config(&self) -> KademliaConfig;
}

/// Answers chain-data requests (`GetBlockHashes`/`GetBlocks`/`GetTxs`) from
/// local chain state. Out of scope for this crate — trait only.
#[async_trait]
pub trait ChainCollaborator: Send + Sync {
    async fn get_block_hashes(&self, request: GetBlockHashes) -> HashList;
    async fn get_blocks(&self, hashes: &HashList) -> Vec<Vec<u8>>;
    async fn get_txs(&self, hashes: &HashList) -> Vec<Vec<u8>>;
}

/// Receives inventory and data variants (`TxIds`, `BlockHashes`, `Block`,
/// `Tx`) for downstream processing. Out of scope for this crate — trait
/// only.
#[async_trait]
pub trait SyncCollaborator: Send + Sync {
    async fn on_tx_ids(&self, tx_ids: HashList, sender: Address);
    async fn on_block_hashes(&self, hashes: HashList, sender: Address);
    async fn on_block(&self, block: Vec<u8>, sender: Address);
    async fn on_tx(&self, tx: Vec<u8>, sender: Address);
}
