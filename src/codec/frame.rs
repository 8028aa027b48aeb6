//! Transport frame layout: signing and parsing a `Message`.
//!
//! Reference: spec.md Section 4.4.

use thiserror::Error;

use crate::crypto::{Address, KeyPair, PublicKey, SignatureBytes};

use super::message::Message;

/// Errors surfaced while decoding a multipart message.
///
/// All variants correspond to spec.md's `InvalidMessage` error kind: the
/// receive loop logs and drops the message rather than propagating this.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("empty frame sequence")]
    EmptyFrameSequence,
    #[error("invalid message: {0}")]
    InvalidMessage(&'static str),
}

/// A successfully decoded message, together with the identity that signed
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub message: Message,
    pub sender_public_key: PublicKey,
    /// Present only when parsed with `reply = false` (router-style socket).
    pub sender_address: Option<Address>,
}

/// Frame and sign `message` for transmission.
///
/// `identity` is prepended as a leading frame when set (the router-style
/// framing); omit it for dealer-style sends where the transport's own
/// addressing carries identity instead.
pub fn to_transport_message(
    message: &Message,
    keypair: &KeyPair,
    identity: Option<Address>,
) -> Vec<Vec<u8>> {
    let body_frames = message.to_body_frames();
    let payload: Vec<u8> = body_frames.concat();
    let signature = keypair.sign(&payload);

    let mut frames = Vec::with_capacity(4 + body_frames.len());
    if let Some(address) = identity {
        frames.push(address.as_bytes().to_vec());
    }
    frames.push(vec![message.type_tag()]);
    frames.push(keypair.public_key().as_bytes().to_vec());
    frames.push(signature.as_bytes().to_vec());
    frames.extend(body_frames);
    frames
}

/// Parse and verify a multipart message.
///
/// `reply` selects the frame shape: `false` expects a leading identity
/// frame (router-style receive), `true` does not.
pub fn parse(frames: &[Vec<u8>], reply: bool) -> Result<ParsedMessage, CodecError> {
    if frames.is_empty() {
        return Err(CodecError::EmptyFrameSequence);
    }

    let mut cursor = 0usize;

    let sender_address = if !reply {
        let frame = frames
            .get(cursor)
            .ok_or(CodecError::InvalidMessage("missing identity frame"))?;
        cursor += 1;
        let bytes: [u8; 20] = frame
            .as_slice()
            .try_into()
            .map_err(|_| CodecError::InvalidMessage("identity frame is not 20 bytes"))?;
        Some(Address::new(bytes))
    } else {
        None
    };

    let tag_frame = frames
        .get(cursor)
        .ok_or(CodecError::InvalidMessage("missing type tag frame"))?;
    cursor += 1;
    let tag = *tag_frame
        .first()
        .ok_or(CodecError::InvalidMessage("empty type tag frame"))?;

    let pubkey_frame = frames
        .get(cursor)
        .ok_or(CodecError::InvalidMessage("missing public key frame"))?;
    cursor += 1;
    let pubkey_bytes: [u8; 33] = pubkey_frame
        .as_slice()
        .try_into()
        .map_err(|_| CodecError::InvalidMessage("public key frame is not 33 bytes"))?;
    let sender_public_key = PublicKey::from_bytes(pubkey_bytes)
        .map_err(|_| CodecError::InvalidMessage("invalid public key"))?;

    let sig_frame = frames
        .get(cursor)
        .ok_or(CodecError::InvalidMessage("missing signature frame"))?;
    cursor += 1;
    let sig_bytes: [u8; 64] = sig_frame
        .as_slice()
        .try_into()
        .map_err(|_| CodecError::InvalidMessage("signature frame is not 64 bytes"))?;
    let signature = SignatureBytes::from_bytes(sig_bytes);

    let body_frames = &frames[cursor..];
    let payload: Vec<u8> = body_frames.concat();
    sender_public_key
        .verify(&payload, &signature)
        .map_err(|_| CodecError::InvalidMessage("signature verification failed"))?;

    let message = Message::from_tag_and_frames(tag, body_frames)?;

    Ok(ParsedMessage {
        message,
        sender_public_key,
        sender_address,
    })
}
