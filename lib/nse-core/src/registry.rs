//! Service registry for network services and endpoint advertisements

use crate::{CoreError, Result};
use nse_api::{NetworkService, NetworkServiceEndpoint};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Destination for network service and endpoint registrations
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Register or update a network service
    async fn register_service(&self, service: NetworkService) -> Result<NetworkService>;

    /// Register or refresh an endpoint advertisement
    async fn register_endpoint(&self, endpoint: NetworkServiceEndpoint) -> Result<NetworkServiceEndpoint>;

    /// Remove an endpoint advertisement
    async fn unregister_endpoint(&self, name: &str) -> Result<()>;
}

/// ServiceRegistry keeps registrations in process memory
pub struct ServiceRegistry {
    services: Arc<RwLock<HashMap<String, NetworkService>>>,
    endpoints: Arc<RwLock<HashMap<String, NetworkServiceEndpoint>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            services: Arc::new(RwLock::new(HashMap::new())),
            endpoints: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get a network service
    pub async fn get_service(&self, name: &str) -> Result<NetworkService> {
        let services = self.services.read().await;
        services
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::ServiceNotFound(name.to_string()))
    }

    /// Get an endpoint advertisement
    pub async fn get_endpoint(&self, name: &str) -> Result<NetworkServiceEndpoint> {
        let endpoints = self.endpoints.read().await;
        endpoints
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::EndpointNotFound(name.to_string()))
    }

    /// List all network services
    pub async fn list_services(&self) -> Vec<NetworkService> {
        let services = self.services.read().await;
        services.values().cloned().collect()
    }

    /// Get count of registered network services
    pub async fn service_count(&self) -> usize {
        let services = self.services.read().await;
        services.len()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Registry for ServiceRegistry {
    async fn register_service(&self, service: NetworkService) -> Result<NetworkService> {
        if service.name.is_empty() {
            return Err(CoreError::InvalidConfiguration(
                "network service name is empty".to_string(),
            ));
        }

        let mut services = self.services.write().await;
        services.insert(service.name.clone(), service.clone());

        debug!("Registered network service: {} ({})", service.name, service.payload);
        Ok(service)
    }

    async fn register_endpoint(&self, endpoint: NetworkServiceEndpoint) -> Result<NetworkServiceEndpoint> {
        if endpoint.name.is_empty() {
            return Err(CoreError::InvalidConfiguration("endpoint name is empty".to_string()));
        }

        let mut endpoints = self.endpoints.write().await;
        endpoints.insert(endpoint.name.clone(), endpoint.clone());

        debug!(
            "Registered endpoint: {} serving {} services",
            endpoint.name,
            endpoint.network_service_names.len()
        );
        Ok(endpoint)
    }

    async fn unregister_endpoint(&self, name: &str) -> Result<()> {
        let mut endpoints = self.endpoints.write().await;
        endpoints
            .remove(name)
            .ok_or_else(|| CoreError::EndpointNotFound(name.to_string()))?;
        debug!("Unregistered endpoint: {}", name);
        Ok(())
    }
}
