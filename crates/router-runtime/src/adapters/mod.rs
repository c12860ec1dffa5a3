//! # Adapter Implementations
//!
//! Concrete collaborators wired in by the container:
//!
//! - `peer_database` - the peer database started during boot
//! - `addresses` - advertised addresses from configuration
//! - `statistics` - options published in the identity record
//! - `transport` - pump from the outbound pool to a transport

pub mod addresses;
pub mod peer_database;
pub mod ports;
pub mod statistics;
pub mod transport;

pub use addresses::StaticAddressSource;
pub use peer_database::InMemoryPeerDatabase;
pub use ports::{PeerDatabaseError, PeerDatabaseFacade, Transport, TransportError};
pub use statistics::RouterStatistics;
pub use transport::{LoggingTransport, OutboundPump};
