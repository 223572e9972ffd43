//! Network service endpoint API types
//!
//! This library defines the records exchanged with the network service mesh:
//! - Connection: a connection being requested or closed, with its mechanism and context
//! - NetworkServiceRequest: a connection request carrying mechanism preferences
//! - EndpointCall / EndpointReply: the line-delimited JSON messages served on the listen socket
//! - NetworkService: a service advertised to the registry
//! - NetworkServiceEndpoint: the endpoint advertisement naming every served service

pub mod networkservice;
pub mod registry;

pub use networkservice::{
    Connection, ConnectionContext, EndpointCall, EndpointReply, EthernetContext, Mechanism,
    NetworkServiceRequest,
};
pub use registry::{NetworkService, NetworkServiceEndpoint, NetworkServiceLabels};

/// Payload type of services carrying raw Ethernet frames
pub const PAYLOAD_ETHERNET: &str = "ETHERNET";
