//! Registry advertisement building

use crate::ServiceConfig;
use chrono::{DateTime, Utc};
use nse_api::{NetworkService, NetworkServiceEndpoint, NetworkServiceLabels};
use std::collections::BTreeMap;

/// Label carrying a service's domain in the endpoint advertisement
pub const SERVICE_DOMAIN_LABEL: &str = "serviceDomain";

/// Network services to register, one per configured service
pub fn network_services(services: &[ServiceConfig]) -> Vec<NetworkService> {
    services
        .iter()
        .map(|s| NetworkService {
            name: s.name.clone(),
            payload: s.payload.clone(),
        })
        .collect()
}

/// Endpoint advertisement naming every configured service.
///
/// Each service is advertised with its own labels plus [`SERVICE_DOMAIN_LABEL`].
/// Repeated service names are listed once and keep the labels of the last occurrence.
pub fn registry_endpoint(
    name: &str,
    url: &str,
    expiration_time: DateTime<Utc>,
    services: &[ServiceConfig],
) -> NetworkServiceEndpoint {
    let mut network_service_names = Vec::with_capacity(services.len());
    let mut network_service_labels = BTreeMap::new();

    for service in services {
        let mut labels = service.labels.clone();
        labels.insert(SERVICE_DOMAIN_LABEL.to_string(), service.domain.clone());

        if network_service_labels
            .insert(service.name.clone(), NetworkServiceLabels { labels })
            .is_none()
        {
            network_service_names.push(service.name.clone());
        }
    }

    NetworkServiceEndpoint {
        name: name.to_string(),
        network_service_names,
        network_service_labels,
        url: url.to_string(),
        expiration_time: Some(expiration_time),
    }
}
