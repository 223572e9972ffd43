//! Endpoint chain assembly

use nse_api::networkservice::mechanism::NOOP;
use nse_core::MappingTable;
use std::sync::Arc;

use crate::{Chain, LoggingStage, MapServer, MechanismsServer};

/// Build the endpoint's request chain: logging, then mechanism selection with
/// the NOOP mechanism served by the mapping stage.
pub fn new_server(name: &str, table: Arc<MappingTable>) -> Chain {
    Chain::new()
        .add(LoggingStage::new(name))
        .add(MechanismsServer::new().with(NOOP, MapServer::new(table)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nse_api::{Connection, Mechanism, NetworkServiceRequest};
    use nse_core::ServiceConfig;

    fn server() -> Chain {
        let services = vec![
            ServiceConfig::parse("pingpong@worker.domain: { addr: 0a:55:44:33:22:11 }").unwrap(),
        ];
        new_server("vfio-server", Arc::new(MappingTable::new(services)))
    }

    #[test]
    fn test_server_stages() {
        assert_eq!(server().stage_names(), vec!["LoggingStage", "MechanismsServer"]);
    }

    #[tokio::test]
    async fn test_server_request_and_close() {
        let server = server();
        let mut request = NetworkServiceRequest::new(Connection::new("conn-1", "pingpong"))
            .with_preference(Mechanism::noop());

        let conn = server.request(&mut request).await.unwrap();
        let eth = conn.ethernet_context().unwrap();
        assert_eq!(eth.dst_mac, "0a:55:44:33:22:11");
        assert_eq!(eth.vlan_tag, 0);

        server.close(&conn).await.unwrap();
    }

    #[tokio::test]
    async fn test_server_rejects_unknown_service() {
        let server = server();
        let mut request = NetworkServiceRequest::new(Connection::new("conn-1", "unknown"))
            .with_preference(Mechanism::noop());

        let err = server.request(&mut request).await.unwrap_err();
        assert_eq!(err.to_string(), "network service is not supported: unknown");
    }
}
