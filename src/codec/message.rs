//! Message taxonomy and per-variant body framing.
//!
//! Reference: spec.md Section 6 (type tags, per-variant body frames).

use std::net::IpAddr;

use crate::crypto::{Address, PublicKey};
use crate::domain::{BoundPeer, Endpoint, Peer, Timestamp};

use super::frame::CodecError;

pub const TAG_PING: u8 = 0x01;
pub const TAG_PONG: u8 = 0x02;
pub const TAG_PEER_SET_DELTA: u8 = 0x03;
pub const TAG_GET_BLOCK_HASHES: u8 = 0x04;
pub const TAG_BLOCK_HASHES: u8 = 0x05;
pub const TAG_TX_IDS: u8 = 0x06;
pub const TAG_GET_BLOCKS: u8 = 0x07;
pub const TAG_GET_TXS: u8 = 0x08;
pub const TAG_BLOCK: u8 = 0x09;
// Note the gap: Tx = 0x10 (sixteen), not 0x0A. Wire-compatibility requires
// this exact numbering be preserved.
pub const TAG_TX: u8 = 0x10;

/// A 32-byte block or transaction hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashValue(pub [u8; 32]);

/// Alias kept for readability at call sites (`GetBlockHashes`' stop hash,
/// `BlockHashes`/`TxIds` entries, …) — all of them are the same 32-byte
/// value.
pub type Hash = HashValue;

/// Body of `GetBlockHashes`: one frame per locator hash, then a final
/// stop-hash frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetBlockHashes {
    pub locator_hashes: Vec<Hash>,
    pub stop_hash: Hash,
}

/// Body shape shared by `BlockHashes`, `TxIds`, `GetBlocks`, and `GetTxs`:
/// a single frame holding a count-prefixed array of hashes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HashList(pub Vec<Hash>);

/// One entry of a `PeerSetDelta`: `[address(20B)][pubkey(33B)][host][port(2B)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerSetDeltaRecord {
    pub address: Address,
    pub public_key: PublicKey,
    pub endpoint: Endpoint,
}

impl PeerSetDeltaRecord {
    pub fn from_bound_peer(peer: &BoundPeer) -> Self {
        Self {
            address: peer.address(),
            public_key: peer.peer.public_key,
            endpoint: peer.endpoint,
        }
    }

    pub fn to_bound_peer(self, now: Timestamp) -> BoundPeer {
        BoundPeer::new(Peer::new(self.address, self.public_key), self.endpoint, now)
    }
}

/// A protocol message. Every variant carries the type tag it was framed
/// under (spec.md Section 6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Ping,
    Pong,
    PeerSetDelta(Vec<PeerSetDeltaRecord>),
    GetBlockHashes(GetBlockHashes),
    BlockHashes(HashList),
    TxIds(HashList),
    GetBlocks(HashList),
    GetTxs(HashList),
    Block(Vec<u8>),
    Tx(Vec<u8>),
}

impl Message {
    pub fn type_tag(&self) -> u8 {
        match self {
            Message::Ping => TAG_PING,
            Message::Pong => TAG_PONG,
            Message::PeerSetDelta(_) => TAG_PEER_SET_DELTA,
            Message::GetBlockHashes(_) => TAG_GET_BLOCK_HASHES,
            Message::BlockHashes(_) => TAG_BLOCK_HASHES,
            Message::TxIds(_) => TAG_TX_IDS,
            Message::GetBlocks(_) => TAG_GET_BLOCKS,
            Message::GetTxs(_) => TAG_GET_TXS,
            Message::Block(_) => TAG_BLOCK,
            Message::Tx(_) => TAG_TX,
        }
    }

    /// This message's ordered body frames, as they go on the wire.
    pub fn to_body_frames(&self) -> Vec<Vec<u8>> {
        match self {
            Message::Ping | Message::Pong => Vec::new(),
            Message::PeerSetDelta(records) => vec![encode_peer_set_delta(records)],
            Message::GetBlockHashes(body) => {
                let mut frames: Vec<Vec<u8>> =
                    body.locator_hashes.iter().map(|h| h.0.to_vec()).collect();
                frames.push(body.stop_hash.0.to_vec());
                frames
            }
            Message::BlockHashes(list) | Message::TxIds(list) | Message::GetBlocks(list)
            | Message::GetTxs(list) => vec![encode_hash_list(list)],
            Message::Block(bytes) | Message::Tx(bytes) => vec![bytes.clone()],
        }
    }

    /// Reconstruct a message from its type tag and body frames.
    pub fn from_tag_and_frames(tag: u8, frames: &[Vec<u8>]) -> Result<Self, CodecError> {
        match tag {
            TAG_PING => Ok(Message::Ping),
            TAG_PONG => Ok(Message::Pong),
            TAG_PEER_SET_DELTA => {
                let frame = single_frame(frames)?;
                Ok(Message::PeerSetDelta(decode_peer_set_delta(frame)?))
            }
            TAG_GET_BLOCK_HASHES => Ok(Message::GetBlockHashes(decode_get_block_hashes(frames)?)),
            TAG_BLOCK_HASHES => Ok(Message::BlockHashes(decode_hash_list(single_frame(frames)?)?)),
            TAG_TX_IDS => Ok(Message::TxIds(decode_hash_list(single_frame(frames)?)?)),
            TAG_GET_BLOCKS => Ok(Message::GetBlocks(decode_hash_list(single_frame(frames)?)?)),
            TAG_GET_TXS => Ok(Message::GetTxs(decode_hash_list(single_frame(frames)?)?)),
            TAG_BLOCK => Ok(Message::Block(single_frame(frames)?.clone())),
            TAG_TX => Ok(Message::Tx(single_frame(frames)?.clone())),
            other => Err(CodecError::InvalidMessage(unknown_tag_reason(other))),
        }
    }
}

fn unknown_tag_reason(_tag: u8) -> &'static str {
    "unknown message type tag"
}

fn single_frame(frames: &[Vec<u8>]) -> Result<&Vec<u8>, CodecError> {
    frames
        .first()
        .filter(|_| frames.len() == 1)
        .ok_or(CodecError::InvalidMessage("expected exactly one body frame"))
}

fn encode_hash_list(list: &HashList) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + list.0.len() * 32);
    out.extend_from_slice(&(list.0.len() as u32).to_be_bytes());
    for hash in &list.0 {
        out.extend_from_slice(&hash.0);
    }
    out
}

fn decode_hash_list(frame: &[u8]) -> Result<HashList, CodecError> {
    if frame.len() < 4 {
        return Err(CodecError::InvalidMessage("truncated hash-list count"));
    }
    let count = u32::from_be_bytes(frame[0..4].try_into().unwrap()) as usize;
    let expected_len = 4 + count * 32;
    if frame.len() != expected_len {
        return Err(CodecError::InvalidMessage("truncated hash-list body"));
    }
    let mut hashes = Vec::with_capacity(count);
    for chunk in frame[4..].chunks_exact(32) {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(chunk);
        hashes.push(Hash(bytes));
    }
    Ok(HashList(hashes))
}

fn decode_get_block_hashes(frames: &[Vec<u8>]) -> Result<GetBlockHashes, CodecError> {
    let (stop_frame, locator_frames) = frames
        .split_last()
        .ok_or(CodecError::InvalidMessage("missing stop-hash frame"))?;
    let stop_hash = frame_to_hash(stop_frame)?;
    let mut locator_hashes = Vec::with_capacity(locator_frames.len());
    for frame in locator_frames {
        locator_hashes.push(frame_to_hash(frame)?);
    }
    Ok(GetBlockHashes {
        locator_hashes,
        stop_hash,
    })
}

fn frame_to_hash(frame: &[u8]) -> Result<Hash, CodecError> {
    let bytes: [u8; 32] = frame
        .try_into()
        .map_err(|_| CodecError::InvalidMessage("hash frame is not 32 bytes"))?;
    Ok(Hash(bytes))
}

const HOST_TAG_V4: u8 = 0;
const HOST_TAG_V6: u8 = 1;

fn encode_endpoint(endpoint: &Endpoint, out: &mut Vec<u8>) {
    match endpoint.host {
        IpAddr::V4(addr) => {
            out.push(HOST_TAG_V4);
            out.extend_from_slice(&addr.octets());
        }
        IpAddr::V6(addr) => {
            out.push(HOST_TAG_V6);
            out.extend_from_slice(&addr.octets());
        }
    }
    out.extend_from_slice(&endpoint.port.to_be_bytes());
}

fn decode_endpoint(bytes: &[u8], cursor: &mut usize) -> Result<Endpoint, CodecError> {
    let host_tag = *bytes
        .get(*cursor)
        .ok_or(CodecError::InvalidMessage("truncated peer-set-delta record"))?;
    *cursor += 1;

    let host = match host_tag {
        HOST_TAG_V4 => {
            let slice = bytes
                .get(*cursor..*cursor + 4)
                .ok_or(CodecError::InvalidMessage("truncated ipv4 host"))?;
            *cursor += 4;
            IpAddr::from(<[u8; 4]>::try_from(slice).unwrap())
        }
        HOST_TAG_V6 => {
            let slice = bytes
                .get(*cursor..*cursor + 16)
                .ok_or(CodecError::InvalidMessage("truncated ipv6 host"))?;
            *cursor += 16;
            IpAddr::from(<[u8; 16]>::try_from(slice).unwrap())
        }
        _ => return Err(CodecError::InvalidMessage("unknown host address tag")),
    };

    let port_bytes = bytes
        .get(*cursor..*cursor + 2)
        .ok_or(CodecError::InvalidMessage("truncated port"))?;
    let port = u16::from_be_bytes(port_bytes.try_into().unwrap());
    *cursor += 2;

    Ok(Endpoint::new(host, port))
}

fn encode_peer_set_delta(records: &[PeerSetDeltaRecord]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(records.len() as u32).to_be_bytes());
    for record in records {
        out.extend_from_slice(record.address.as_bytes());
        out.extend_from_slice(record.public_key.as_bytes());
        encode_endpoint(&record.endpoint, &mut out);
    }
    out
}

fn decode_peer_set_delta(frame: &[u8]) -> Result<Vec<PeerSetDeltaRecord>, CodecError> {
    if frame.len() < 4 {
        return Err(CodecError::InvalidMessage("truncated peer-set-delta count"));
    }
    let count = u32::from_be_bytes(frame[0..4].try_into().unwrap()) as usize;
    let mut cursor = 4;
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        let address_bytes = frame
            .get(cursor..cursor + 20)
            .ok_or(CodecError::InvalidMessage("truncated peer-set-delta address"))?;
        let address = Address::new(address_bytes.try_into().unwrap());
        cursor += 20;

        let pubkey_bytes = frame
            .get(cursor..cursor + 33)
            .ok_or(CodecError::InvalidMessage("truncated peer-set-delta pubkey"))?;
        let public_key = PublicKey::from_bytes(pubkey_bytes.try_into().unwrap())
            .map_err(|_| CodecError::InvalidMessage("invalid peer-set-delta pubkey"))?;
        cursor += 33;

        let endpoint = decode_endpoint(frame, &mut cursor)?;

        records.push(PeerSetDeltaRecord {
            address,
            public_key,
            endpoint,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_and_pong_have_no_body_frames() {
        assert!(Message::Ping.to_body_frames().is_empty());
        assert!(Message::Pong.to_body_frames().is_empty());
    }

    #[test]
    fn hash_list_round_trips() {
        let list = HashList(vec![Hash([1u8; 32]), Hash([2u8; 32])]);
        let message = Message::BlockHashes(list.clone());
        let frames = message.to_body_frames();
        let decoded = Message::from_tag_and_frames(TAG_BLOCK_HASHES, &frames).unwrap();
        assert_eq!(decoded, Message::BlockHashes(list));
    }

    #[test]
    fn get_block_hashes_round_trips_with_multiple_locators() {
        let body = GetBlockHashes {
            locator_hashes: vec![Hash([3u8; 32]), Hash([4u8; 32])],
            stop_hash: Hash([5u8; 32]),
        };
        let message = Message::GetBlockHashes(body.clone());
        let frames = message.to_body_frames();
        assert_eq!(frames.len(), 3);
        let decoded = Message::from_tag_and_frames(TAG_GET_BLOCK_HASHES, &frames).unwrap();
        assert_eq!(decoded, Message::GetBlockHashes(body));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = Message::from_tag_and_frames(0x0A, &[]);
        assert!(matches!(err, Err(CodecError::InvalidMessage(_))));
    }

    #[test]
    fn peer_set_delta_round_trips() {
        use crate::crypto::KeyPair;

        let keypair = KeyPair::generate();
        let record = PeerSetDeltaRecord {
            address: keypair.address(),
            public_key: keypair.public_key(),
            endpoint: Endpoint::new(std::net::IpAddr::from([127, 0, 0, 1]), 30303),
        };
        let message = Message::PeerSetDelta(vec![record]);
        let frames = message.to_body_frames();
        let decoded = Message::from_tag_and_frames(TAG_PEER_SET_DELTA, &frames).unwrap();
        assert_eq!(decoded, Message::PeerSetDelta(vec![record]));
    }

    #[test]
    fn block_and_tx_are_raw_single_frame_bodies() {
        let message = Message::Tx(vec![0xAA, 0xBB]);
        let frames = message.to_body_frames();
        assert_eq!(frames, vec![vec![0xAA, 0xBB]]);
        let decoded = Message::from_tag_and_frames(TAG_TX, &frames).unwrap();
        assert_eq!(decoded, message);
    }
}
