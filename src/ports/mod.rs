//! Ports: the hexagonal boundary between the Kademlia/codec core and the
//! host application.
//!
//! Reference: SPEC_FULL.md Section 6.
//!
//! - Driving port (inbound): [`inbound::ProtocolDriverApi`], the contract
//!   the protocol driver exposes.
//! - Driven ports (outbound): [`outbound::MessageSocket`],
//!   [`outbound::TimeSource`], [`outbound::ConfigProvider`],
//!   [`outbound::ChainCollaborator`], [`outbound::SyncCollaborator`] — what
//!   the driver requires from the host.

pub mod inbound;
pub mod outbound;

pub use inbound::{DriverError, ProtocolDriverApi};
pub use outbound::{
    ChainCollaborator, ConfigProvider, InboundFrames, MessageSocket, SyncCollaborator, TimeSource,
    TransportError,
};
