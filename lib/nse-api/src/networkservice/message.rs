//! Messages exchanged with the endpoint over its listen socket, one JSON
//! document per line

use serde::{Deserialize, Serialize};

use super::{Connection, NetworkServiceRequest};

/// Call made by a client
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "body", rename_all = "camelCase")]
pub enum EndpointCall {
    Request(NetworkServiceRequest),
    Close(Connection),
}

/// Endpoint's answer to a single call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "body", rename_all = "camelCase")]
pub enum EndpointReply {
    /// Connection established by a request
    Connection(Connection),
    /// Close completed
    Closed,
    Error(String),
}
