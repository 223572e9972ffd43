//! Mapping from network service name to its MAC address and VLAN tag

use crate::{CoreError, Result, ServiceConfig};
use nse_api::Connection;
use std::collections::HashMap;
use tracing::debug;

/// Immutable `network service -> { MAC, VLAN }` table
///
/// Built once from decoded service configs and shared read-only afterwards;
/// all lookups take `&self` and never block.
#[derive(Clone, Debug, Default)]
pub struct MappingTable {
    entries: HashMap<String, ServiceConfig>,
}

impl MappingTable {
    /// Build the table. A later entry with an already seen name replaces the earlier one.
    pub fn new(services: impl IntoIterator<Item = ServiceConfig>) -> Self {
        let mut entries = HashMap::new();
        for service in services {
            if let Some(previous) = entries.insert(service.name.clone(), service) {
                debug!("Replaced earlier mapping for service: {}", previous.name);
            }
        }
        Self { entries }
    }

    /// Look up a service by name
    pub fn get(&self, service: &str) -> Option<&ServiceConfig> {
        self.entries.get(service)
    }

    /// Apply the mapping for `service` to the connection's Ethernet context.
    ///
    /// On a miss the connection is left untouched.
    pub fn apply(&self, service: &str, conn: &mut Connection) -> Result<()> {
        let entry = self
            .entries
            .get(service)
            .ok_or_else(|| CoreError::ServiceNotSupported(service.to_string()))?;

        let ethernet = conn.ethernet_context_mut();
        ethernet.dst_mac = entry.mac_string();
        ethernet.vlan_tag = entry.vlan_tag;

        debug!(
            "Applied mapping for {}: dst_mac={} vlan={}",
            service, ethernet.dst_mac, ethernet.vlan_tag
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn service(text: &str) -> ServiceConfig {
        ServiceConfig::parse(text).unwrap()
    }

    fn table() -> MappingTable {
        MappingTable::new(vec![
            service("pingpong@worker.domain: { addr: 0a:55:44:33:22:11 }"),
            service("finance@worker.domain: { addr: 0a:55:44:33:22:12; vlan: 1000 }"),
        ])
    }

    #[test]
    fn test_apply_sets_ethernet_context() {
        let table = table();
        let mut conn = Connection::new("conn-1", "pingpong");

        table.apply("pingpong", &mut conn).unwrap();

        let eth = conn.ethernet_context().unwrap();
        assert_eq!(eth.dst_mac, "0a:55:44:33:22:11");
        assert_eq!(eth.vlan_tag, 0);
    }

    #[test]
    fn test_apply_overwrites_existing_values() {
        let table = table();
        let mut conn = Connection::new("conn-1", "finance");
        conn.ethernet_context_mut().dst_mac = "ff:ff:ff:ff:ff:ff".to_string();
        conn.ethernet_context_mut().src_mac = "02:00:00:00:00:01".to_string();

        table.apply("finance", &mut conn).unwrap();

        let eth = conn.ethernet_context().unwrap();
        assert_eq!(eth.dst_mac, "0a:55:44:33:22:12");
        assert_eq!(eth.vlan_tag, 1000);
        assert_eq!(eth.src_mac, "02:00:00:00:00:01");
    }

    #[test]
    fn test_apply_unknown_service() {
        let table = table();
        let mut conn = Connection::new("conn-1", "unknown");
        let before = conn.clone();

        let err = table.apply("unknown", &mut conn).unwrap_err();

        assert!(matches!(err, CoreError::ServiceNotSupported(ref name) if name == "unknown"));
        assert_eq!(err.to_string(), "network service is not supported: unknown");
        assert_eq!(conn, before);
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let table = MappingTable::new(vec![
            service("dup@a: { addr: 0a:00:00:00:00:01; vlan: 1 }"),
            service("other@a: { addr: 0a:00:00:00:00:02 }"),
            service("dup@b: { addr: 0a:00:00:00:00:03; vlan: 3 }"),
        ]);

        assert_eq!(table.len(), 2);
        let entry = table.get("dup").unwrap();
        assert_eq!(entry.domain, "b");
        assert_eq!(entry.vlan_tag, 3);
        assert_eq!(entry.mac_string(), "0a:00:00:00:00:03");
    }

    #[test]
    fn test_empty_table() {
        let table = MappingTable::default();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert!(table.apply("pingpong", &mut Connection::new("c", "pingpong")).is_err());
    }

    #[test]
    fn test_concurrent_apply_from_threads() {
        let table = Arc::new(table());

        std::thread::scope(|scope| {
            let handles: Vec<_> = ["pingpong", "finance"]
                .into_iter()
                .cycle()
                .take(16)
                .enumerate()
                .map(|(i, name)| {
                    let table = Arc::clone(&table);
                    scope.spawn(move || {
                        let mut conn = Connection::new(format!("conn-{}", i), name);
                        table.apply(name, &mut conn).map(|_| conn)
                    })
                })
                .collect();

            for handle in handles {
                let conn = handle.join().unwrap().unwrap();
                let expected = table.get(&conn.network_service).unwrap();
                let eth = conn.ethernet_context().unwrap();
                assert_eq!(eth.dst_mac, expected.mac_string());
                assert_eq!(eth.vlan_tag, expected.vlan_tag);
            }
        });
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_apply_from_tasks() {
        let table = Arc::new(table());

        let first = {
            let table = table.clone();
            tokio::spawn(async move {
                let mut conn = Connection::new("conn-a", "pingpong");
                table.apply("pingpong", &mut conn).map(|_| conn)
            })
        };
        let second = {
            let table = table.clone();
            tokio::spawn(async move {
                let mut conn = Connection::new("conn-b", "finance");
                table.apply("finance", &mut conn).map(|_| conn)
            })
        };

        let (first, second) = tokio::join!(first, second);
        let first = first.unwrap().unwrap();
        let second = second.unwrap().unwrap();
        assert_eq!(first.ethernet_context().unwrap().dst_mac, "0a:55:44:33:22:11");
        assert_eq!(second.ethernet_context().unwrap().vlan_tag, 1000);
    }
}
