use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Mechanism;

/// Connection between a client and a network service endpoint
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Connection identifier
    #[serde(default)]
    pub id: String,

    /// Name of the requested network service
    pub network_service: String,

    /// Mechanism selected for this connection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<Mechanism>,

    /// Protocol-specific attributes filled in along the chain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ConnectionContext>,

    /// Labels supplied by the client
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl Connection {
    /// Create a connection requesting the given network service
    pub fn new(id: impl Into<String>, network_service: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            network_service: network_service.into(),
            ..Default::default()
        }
    }

    /// Ethernet context, if one has been filled in
    pub fn ethernet_context(&self) -> Option<&EthernetContext> {
        self.context.as_ref()?.ethernet_context.as_ref()
    }

    /// Ethernet context, allocating the context and its Ethernet part if absent
    pub fn ethernet_context_mut(&mut self) -> &mut EthernetContext {
        self.context
            .get_or_insert_with(ConnectionContext::default)
            .ethernet_context
            .get_or_insert_with(EthernetContext::default)
    }

    /// Type of the selected mechanism, if any
    pub fn mechanism_type(&self) -> Option<&str> {
        self.mechanism.as_ref().map(|m| m.mechanism_type.as_str())
    }
}

/// Protocol-specific attributes of a connection
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionContext {
    /// Link-layer attributes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethernet_context: Option<EthernetContext>,
}

/// Link-layer attributes of a connection
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthernetContext {
    /// Source MAC address, textual form
    #[serde(default)]
    pub src_mac: String,

    /// Destination MAC address, textual form
    #[serde(default)]
    pub dst_mac: String,

    /// 802.1Q VLAN tag, 0 when untagged
    #[serde(default)]
    pub vlan_tag: i32,
}

/// Request for a connection to a network service
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkServiceRequest {
    /// Connection being requested
    pub connection: Connection,

    /// Mechanisms the client can use, most preferred first
    #[serde(default)]
    pub mechanism_preferences: Vec<Mechanism>,
}

impl NetworkServiceRequest {
    /// Create a request for the given connection with no mechanism preferences
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            mechanism_preferences: Vec::new(),
        }
    }

    /// Add a mechanism preference
    pub fn with_preference(mut self, mechanism: Mechanism) -> Self {
        self.mechanism_preferences.push(mechanism);
        self
    }
}
