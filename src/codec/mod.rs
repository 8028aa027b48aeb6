//! Signed message codec: message taxonomy plus the transport frame layout.
//!
//! Reference: spec.md Section 4.4, Section 6 (External Interfaces).

mod frame;
mod message;

pub use frame::{parse, to_transport_message, CodecError, ParsedMessage};
pub use message::{GetBlockHashes, Hash, HashList, Message, PeerSetDeltaRecord};
