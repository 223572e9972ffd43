//! Registry-side records advertised by an endpoint

pub mod endpoint;

pub use endpoint::{NetworkService, NetworkServiceEndpoint, NetworkServiceLabels};
