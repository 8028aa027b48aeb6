//! # Protocol Driver Service
//!
//! High-level service implementing [`crate::ports::ProtocolDriverApi`] over a
//! [`crate::domain::RoutingTable`], a signed message codec, and the outbound
//! collaborator ports (`MessageSocket`, `TimeSource`, `ChainCollaborator`,
//! `SyncCollaborator`).
//!
//! Reference: spec.md Section 4.5.

mod config;
mod driver;
mod lookup;

pub use config::DriverConfig;
pub use driver::Driver;
