//! The protocol driver: turns routing-table maintenance and inbound
//! messages into outbound traffic.
//!
//! Reference: spec.md Section 4.5.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::RngCore;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::codec::{self, Message};
use crate::crypto::{Address, KeyPair};
use crate::domain::{BoundPeer, RoutingTable, Timestamp};
use crate::ports::{
    ChainCollaborator, DriverError, MessageSocket, ProtocolDriverApi, SyncCollaborator, TimeSource,
};

use super::config::DriverConfig;
use super::lookup::{merge_shortlist, next_round_candidates};

/// Drives bootstrap, routing-table maintenance, and inbound dispatch for a
/// single local node.
///
/// Generic over the four outbound collaborators so the core stays free of
/// any concrete transport or chain implementation.
pub struct Driver<S, T, C, Y> {
    local_address: Address,
    keypair: Arc<KeyPair>,
    table: Arc<RoutingTable>,
    socket: Arc<S>,
    time_source: Arc<T>,
    chain: Arc<C>,
    sync: Arc<Y>,
    config: DriverConfig,
}

impl<S, T, C, Y> Driver<S, T, C, Y>
where
    S: MessageSocket,
    T: TimeSource,
    C: ChainCollaborator,
    Y: SyncCollaborator,
{
    pub fn new(
        keypair: KeyPair,
        table: Arc<RoutingTable>,
        socket: Arc<S>,
        time_source: Arc<T>,
        chain: Arc<C>,
        sync: Arc<Y>,
        config: DriverConfig,
    ) -> Self {
        let local_address = keypair.address();
        Self {
            local_address,
            keypair: Arc::new(keypair),
            table,
            socket,
            time_source,
            chain,
            sync,
            config,
        }
    }

    fn now(&self) -> Timestamp {
        self.time_source.now()
    }

    async fn send(&self, peer: &BoundPeer, message: &Message) -> Result<(), DriverError> {
        let frames = codec::to_transport_message(message, &self.keypair, Some(self.local_address));
        self.socket.send(peer, frames).await?;
        Ok(())
    }

    /// Send `message` to `peer` and wait up to `timeout` for a reply.
    ///
    /// This crate has no real socket behind `MessageSocket`, so there is no
    /// per-request correlation id to key a shared receive loop on: each
    /// probe issues its own `receive` call and assumes the next inbound
    /// frame set is the peer's reply. A production transport would
    /// multiplex all replies through one receive task keyed by request id.
    async fn request(
        &self,
        peer: &BoundPeer,
        message: &Message,
        timeout: Duration,
    ) -> Result<Message, DriverError> {
        self.send(peer, message).await?;
        let inbound = tokio::time::timeout(timeout, self.socket.receive())
            .await
            .map_err(|_| DriverError::Timeout)??;
        let parsed = codec::parse(&inbound.frames, inbound.reply).map_err(|e| {
            warn!(peer = ?peer.address(), error = %e, "dropped invalid message");
            e
        })?;
        Ok(parsed.message)
    }

    async fn ping_and_await_pong(&self, peer: &BoundPeer, timeout: Duration) -> bool {
        matches!(
            self.request(peer, &Message::Ping, timeout).await,
            Ok(Message::Pong)
        )
    }

    /// Query `peer` for its known peers.
    ///
    /// There is no dedicated find-peer wire message — spec.md's type-tag
    /// table defines none — so a `Ping` is reused as the query, and the
    /// `PeerSetDelta` that follows the `Pong` is read as the answer. This
    /// reuses an existing wire variant rather than inventing a new tag, at
    /// the cost of returning the peer's general neighborhood rather than
    /// peers specifically close to the lookup target.
    async fn query_peer_for_peers(&self, peer: &BoundPeer, timeout: Duration) -> Vec<BoundPeer> {
        if !self.ping_and_await_pong(peer, timeout).await {
            return Vec::new();
        }
        let now = self.now();
        match tokio::time::timeout(timeout, self.socket.receive()).await {
            Ok(Ok(inbound)) => match codec::parse(&inbound.frames, inbound.reply) {
                Ok(parsed) => match parsed.message {
                    Message::PeerSetDelta(records) => {
                        records.into_iter().map(|record| record.to_bound_peer(now)).collect()
                    }
                    _ => Vec::new(),
                },
                Err(e) => {
                    warn!(peer = ?peer.address(), error = %e, "dropped invalid message");
                    Vec::new()
                }
            },
            _ => Vec::new(),
        }
    }

    /// Add or refresh `peer`; liveness-probe any bubbled-up eviction
    /// candidate and evict it if it is dead, promoting a replacement.
    async fn record_contact(&self, peer: BoundPeer) -> Result<(), DriverError> {
        if let Some(candidate) = self.table.add_peer(peer)? {
            if !self.ping_and_await_pong(&candidate, self.config.round_timeout).await {
                self.table.remove_peer(&candidate.address())?;
                self.table.promote_from_replacement_cache(&candidate.address());
            }
        }
        Ok(())
    }

    /// Iterative lookup for the peers closest to `target`.
    async fn find_peer(
        &self,
        target: Address,
        timeout: Duration,
        ct: &CancellationToken,
    ) -> Result<Vec<BoundPeer>, DriverError> {
        let config = self.table.config().clone();
        let mut shortlist = self.table.neighbors(&target, config.k);
        let mut queried: HashSet<Address> = HashSet::new();
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if ct.is_cancelled() {
                return Err(DriverError::Cancelled);
            }
            if tokio::time::Instant::now() >= deadline {
                break;
            }

            let round = next_round_candidates(&shortlist, &queried, config.alpha);
            if round.is_empty() {
                break;
            }

            let mut discovered = Vec::new();
            for peer in &round {
                queried.insert(peer.address());
                if ct.is_cancelled() {
                    return Err(DriverError::Cancelled);
                }
                discovered.extend(self.query_peer_for_peers(peer, self.config.round_timeout).await);
            }

            if !merge_shortlist(&mut shortlist, discovered, &target, config.k) {
                break;
            }
        }

        Ok(shortlist)
    }

    /// A random address sharing exactly `cpl` leading bits with the local
    /// address, used to target a lookup at a specific bucket.
    fn random_address_with_cpl(&self, cpl: usize) -> Address {
        let mut out = *self.local_address.as_bytes();
        let byte_index = cpl / 8;
        let bit_in_byte = cpl % 8;

        if byte_index < out.len() {
            let flip_mask = 0x80u8 >> bit_in_byte;
            let tail_mask = flip_mask.wrapping_sub(1);
            let mut rng = rand::thread_rng();
            out[byte_index] = ((out[byte_index] ^ flip_mask) & !tail_mask)
                | (rng.next_u32() as u8 & tail_mask);
            for byte in out.iter_mut().skip(byte_index + 1) {
                *byte = rand::random();
            }
        }
        Address::new(out)
    }
}

#[async_trait]
impl<S, T, C, Y> ProtocolDriverApi for Driver<S, T, C, Y>
where
    S: MessageSocket,
    T: TimeSource,
    C: ChainCollaborator,
    Y: SyncCollaborator,
{
    async fn bootstrap(
        &self,
        seeds: Vec<BoundPeer>,
        ping_seed_timeout: Duration,
        find_peer_timeout: Duration,
        ct: CancellationToken,
    ) -> Result<(), DriverError> {
        for seed in seeds {
            if ct.is_cancelled() {
                return Err(DriverError::Cancelled);
            }
            if self.ping_and_await_pong(&seed, ping_seed_timeout).await {
                self.record_contact(seed).await?;
            } else {
                warn!(peer = ?seed.address(), "bootstrap seed did not respond");
            }
        }
        self.find_peer(self.local_address, find_peer_timeout, &ct).await?;
        Ok(())
    }

    async fn refresh_table(&self, max_age: Duration, ct: CancellationToken) -> Result<(), DriverError> {
        let now = self.now();
        for level in self.table.non_empty_buckets() {
            if ct.is_cancelled() {
                return Err(DriverError::Cancelled);
            }
            let freshest = self
                .table
                .bucket_at(level)
                .iter()
                .map(|p| p.last_updated)
                .max();
            let is_stale = freshest
                .map(|ts| now.as_secs().saturating_sub(ts.as_secs()) > max_age.as_secs())
                .unwrap_or(false);
            if is_stale {
                let target = self.random_address_with_cpl(level);
                self.find_peer(target, self.config.find_peer_timeout, &ct).await?;
            }
        }
        Ok(())
    }

    async fn rebuild_connection(&self, ct: CancellationToken) -> Result<(), DriverError> {
        self.find_peer(self.local_address, self.config.find_peer_timeout, &ct)
            .await?;

        let non_empty: HashSet<usize> = self.table.non_empty_buckets().into_iter().collect();
        for level in 0..self.table.config().table_size {
            if non_empty.contains(&level) {
                continue;
            }
            if ct.is_cancelled() {
                return Err(DriverError::Cancelled);
            }
            let target = self.random_address_with_cpl(level);
            self.find_peer(target, self.config.find_peer_timeout, &ct).await?;
        }
        Ok(())
    }

    async fn check_replacement_cache(&self, ct: CancellationToken) -> Result<(), DriverError> {
        for level in self.table.buckets_with_replacement_candidates() {
            if ct.is_cancelled() {
                return Err(DriverError::Cancelled);
            }
            while let Some(candidate) = self.table.pop_replacement_candidate(level) {
                if !self.ping_and_await_pong(&candidate, self.config.round_timeout).await {
                    continue;
                }
                if let Some(head) = self.table.bucket_head(level) {
                    if !self.ping_and_await_pong(&head, self.config.round_timeout).await {
                        self.table.remove_peer(&head.address())?;
                    }
                }
                self.table.add_peer(candidate)?;
                break;
            }
        }
        Ok(())
    }

    async fn receive_message(&self, sender: BoundPeer, message: Message) -> Result<(), DriverError> {
        self.record_contact(sender).await?;

        match message {
            Message::Ping => self.send(&sender, &Message::Pong).await?,
            Message::Pong => trace!(peer = ?sender.address(), "received unsolicited pong"),
            Message::PeerSetDelta(_) => {
                trace!(peer = ?sender.address(), "received unsolicited peer-set delta")
            }
            Message::GetBlockHashes(request) => {
                let hashes = self.chain.get_block_hashes(request).await;
                self.send(&sender, &Message::BlockHashes(hashes)).await?;
            }
            Message::GetBlocks(hashes) => {
                for block in self.chain.get_blocks(&hashes).await {
                    self.send(&sender, &Message::Block(block)).await?;
                }
            }
            Message::GetTxs(hashes) => {
                for tx in self.chain.get_txs(&hashes).await {
                    self.send(&sender, &Message::Tx(tx)).await?;
                }
            }
            Message::TxIds(hashes) => self.sync.on_tx_ids(hashes, sender.address()).await,
            Message::BlockHashes(hashes) => self.sync.on_block_hashes(hashes, sender.address()).await,
            Message::Block(bytes) => self.sync.on_block(bytes, sender.address()).await,
            Message::Tx(bytes) => self.sync.on_tx(bytes, sender.address()).await,
        }
        Ok(())
    }

    fn trace(&self) -> String {
        let mut out = String::new();
        for level in self.table.non_empty_buckets() {
            let peers = self.table.bucket_at(level);
            out.push_str(&format!("bucket {level}: {} peers\n", peers.len()));
        }
        out
    }
}
