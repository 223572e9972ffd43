//! Core service mapping and registration functionality
//!
//! This library provides:
//! - Service descriptor decoding (`name@domain: { addr: ..; vlan: ..; labels: ..; payload: .. }`)
//! - The mapping table applying a service's MAC address and VLAN tag to a connection
//! - Endpoint advertisement building and a service registry

pub mod config;
pub mod endpoint;
pub mod error;
pub mod mapping;
pub mod registry;

pub use config::{Config, ServiceConfig};
pub use error::{CoreError, DescriptorError, Result};
pub use mapping::MappingTable;
pub use registry::{Registry, ServiceRegistry};
