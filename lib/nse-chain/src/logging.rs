//! Logging stage recording each request and close

use anyhow::Result;
use nse_api::{Connection, NetworkServiceRequest};
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::stage::{Next, Stage};

/// Logs every request and close passing through, with its outcome and duration
pub struct LoggingStage {
    /// Endpoint name attached to every span
    pub endpoint_name: String,
}

impl LoggingStage {
    pub fn new(endpoint_name: impl Into<String>) -> Self {
        Self {
            endpoint_name: endpoint_name.into(),
        }
    }
}

#[async_trait::async_trait]
impl Stage for LoggingStage {
    fn name(&self) -> &'static str {
        "LoggingStage"
    }

    async fn request(
        &self,
        request: &mut NetworkServiceRequest,
        next: Next<'_>,
    ) -> Result<Connection> {
        let span = info_span!(
            "request",
            endpoint = %self.endpoint_name,
            connection = %request.connection.id,
            service = %request.connection.network_service,
        );

        async move {
            debug!(
                "Request started (mechanism preferences: {})",
                request.mechanism_preferences.len()
            );
            let start = Instant::now();
            let result = next.request(request).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(conn) => {
                    let (dst_mac, vlan_tag) = conn
                        .ethernet_context()
                        .map(|e| (e.dst_mac.as_str(), e.vlan_tag))
                        .unwrap_or_default();
                    info!(dst_mac, vlan_tag, elapsed_ms, "Request completed");
                }
                Err(e) => warn!(error = %e, elapsed_ms, "Request rejected"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn close(&self, conn: &Connection, next: Next<'_>) -> Result<()> {
        let span = info_span!(
            "close",
            endpoint = %self.endpoint_name,
            connection = %conn.id,
            service = %conn.network_service,
        );

        async move {
            let result = next.close(conn).await;
            match &result {
                Ok(()) => info!("Connection closed"),
                Err(e) => warn!(error = %e, "Close failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}
