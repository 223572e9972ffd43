//! Stage implementing the `network service -> { MAC, VLAN }` mapping

use anyhow::Result;
use nse_api::{Connection, NetworkServiceRequest};
use nse_core::MappingTable;
use std::sync::Arc;

use crate::stage::{Next, Stage};

/// Stamps the requested service's MAC address and VLAN tag onto the connection's
/// Ethernet context, then hands the request on. Requests for unknown services
/// are rejected without reaching the rest of the chain.
pub struct MapServer {
    table: Arc<MappingTable>,
}

impl MapServer {
    pub fn new(table: Arc<MappingTable>) -> Self {
        Self { table }
    }
}

#[async_trait::async_trait]
impl Stage for MapServer {
    fn name(&self) -> &'static str {
        "MapServer"
    }

    async fn request(
        &self,
        request: &mut NetworkServiceRequest,
        next: Next<'_>,
    ) -> Result<Connection> {
        let service = request.connection.network_service.clone();
        self.table.apply(&service, &mut request.connection)?;
        next.request(request).await
    }

    async fn close(&self, conn: &Connection, next: Next<'_>) -> Result<()> {
        next.close(conn).await
    }
}
