use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Network service known to the registry
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkService {
    /// Service name
    pub name: String,

    /// Payload type carried by the service, e.g. ETHERNET
    pub payload: String,
}

/// Labels attached to one network service of an endpoint
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkServiceLabels {
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// Endpoint advertisement: where the endpoint listens and what it serves
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkServiceEndpoint {
    /// Endpoint name
    pub name: String,

    /// Names of every network service served
    #[serde(default)]
    pub network_service_names: Vec<String>,

    /// Labels per served network service, keyed by service name
    #[serde(default)]
    pub network_service_labels: BTreeMap<String, NetworkServiceLabels>,

    /// URL the endpoint is reachable at
    pub url: String,

    /// When the advertisement expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<DateTime<Utc>>,
}

impl NetworkServiceEndpoint {
    /// Labels advertised for one of the served services
    pub fn labels_for(&self, service: &str) -> Option<&BTreeMap<String, String>> {
        self.network_service_labels.get(service).map(|l| &l.labels)
    }
}
