//! Domain layer: pure Kademlia logic, no I/O.
//!
//! - Entities: `Peer`, `Endpoint`, `BoundPeer`, `Timestamp`.
//! - Value objects: `Distance`, `KademliaConfig`.
//! - Services: CPL/XOR-distance arithmetic, distance-based sorting.
//! - Routing table: bounded k-buckets plus the table that owns them.

pub mod entities;
pub mod errors;
pub mod routing_table;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use routing_table::*;
pub use services::*;
pub use value_objects::*;
