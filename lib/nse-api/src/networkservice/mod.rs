//! Connection-side records: requests, connections and their context

pub mod connection;
pub mod mechanism;
pub mod message;

pub use connection::{Connection, ConnectionContext, EthernetContext, NetworkServiceRequest};
pub use mechanism::Mechanism;
pub use message::{EndpointCall, EndpointReply};
