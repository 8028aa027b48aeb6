//! Centralized testing utilities, available behind the `test-utils` feature.
//!
//! Reference: SPEC_FULL.md Section 8 (Test tooling).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::codec::{GetBlockHashes, HashList};
use crate::crypto::Address;
use crate::domain::{BoundPeer, Timestamp};
use crate::ports::{
    ChainCollaborator, InboundFrames, MessageSocket, SyncCollaborator, TimeSource, TransportError,
};

/// A time source that always returns a fixed timestamp.
///
/// Useful for deterministic tests where time progression needs to be
/// controlled explicitly.
#[derive(Debug, Clone)]
pub struct FixedTimeSource {
    timestamp: u64,
}

impl FixedTimeSource {
    /// Create a new fixed time source with the given timestamp (in seconds).
    pub fn new(timestamp: u64) -> Self {
        Self { timestamp }
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.timestamp)
    }
}

/// A [`MessageSocket`] that hands out queued raw frame sets in FIFO order
/// and records every frame set sent through it.
#[derive(Default)]
pub struct MockMessageSocket {
    sent: Mutex<Vec<Vec<Vec<u8>>>>,
    replies: Mutex<VecDeque<Vec<Vec<u8>>>>,
}

impl MockMessageSocket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw frame set to be returned by the next `receive` call.
    pub fn queue_reply(&self, frames: Vec<Vec<u8>>) {
        self.replies.lock().unwrap().push_back(frames);
    }

    /// Every frame set sent so far, oldest first.
    pub fn sent_frames(&self) -> Vec<Vec<Vec<u8>>> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSocket for MockMessageSocket {
    async fn send(&self, _peer: &BoundPeer, frames: Vec<Vec<u8>>) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(frames);
        Ok(())
    }

    async fn receive(&self) -> Result<InboundFrames, TransportError> {
        let frames = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::ReceiveFailed("no queued reply".into()))?;
        Ok(InboundFrames { frames, reply: true })
    }
}

/// A [`ChainCollaborator`] that answers every request with empty data.
#[derive(Debug, Default)]
pub struct NullChainCollaborator;

#[async_trait]
impl ChainCollaborator for NullChainCollaborator {
    async fn get_block_hashes(&self, _request: GetBlockHashes) -> HashList {
        HashList::default()
    }

    async fn get_blocks(&self, _hashes: &HashList) -> Vec<Vec<u8>> {
        Vec::new()
    }

    async fn get_txs(&self, _hashes: &HashList) -> Vec<Vec<u8>> {
        Vec::new()
    }
}

/// A [`SyncCollaborator`] that records every call it receives, for
/// assertion in downstream tests.
#[derive(Debug, Default)]
pub struct RecordingSyncCollaborator {
    pub tx_ids: Mutex<Vec<(HashList, Address)>>,
    pub block_hashes: Mutex<Vec<(HashList, Address)>>,
    pub blocks: Mutex<Vec<(Vec<u8>, Address)>>,
    pub txs: Mutex<Vec<(Vec<u8>, Address)>>,
}

#[async_trait]
impl SyncCollaborator for RecordingSyncCollaborator {
    async fn on_tx_ids(&self, tx_ids: HashList, sender: Address) {
        self.tx_ids.lock().unwrap().push((tx_ids, sender));
    }

    async fn on_block_hashes(&self, hashes: HashList, sender: Address) {
        self.block_hashes.lock().unwrap().push((hashes, sender));
    }

    async fn on_block(&self, block: Vec<u8>, sender: Address) {
        self.blocks.lock().unwrap().push((block, sender));
    }

    async fn on_tx(&self, tx: Vec<u8>, sender: Address) {
        self.txs.lock().unwrap().push((tx, sender));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Endpoint, Peer};

    #[test]
    fn fixed_time_source_returns_configured_value() {
        let source = FixedTimeSource::new(1000);
        assert_eq!(source.now().as_secs(), 1000);
    }

    #[test]
    fn fixed_time_source_is_clone() {
        let source = FixedTimeSource::new(500);
        let cloned = source.clone();
        assert_eq!(source.now().as_secs(), cloned.now().as_secs());
    }

    #[tokio::test]
    async fn mock_message_socket_records_sent_frames() {
        let socket = MockMessageSocket::new();
        let keypair = crate::crypto::KeyPair::generate();
        let peer = BoundPeer::new(
            Peer::from_public_key(keypair.public_key()),
            Endpoint::new(std::net::IpAddr::from([127, 0, 0, 1]), 30303),
            Timestamp::new(0),
        );
        socket.send(&peer, vec![vec![1, 2, 3]]).await.unwrap();
        assert_eq!(socket.sent_frames(), vec![vec![vec![1, 2, 3]]]);
    }
}
