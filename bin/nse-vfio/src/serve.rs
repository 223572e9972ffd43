//! Serves the request chain on the endpoint's unix socket.
//!
//! Each line a client writes is one JSON `EndpointCall`; the endpoint answers
//! every line with one JSON `EndpointReply` line.

use anyhow::{Context, Result};
use nse_api::{EndpointCall, EndpointReply};
use nse_chain::Chain;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tracing::{debug, warn};

/// Bind the listen socket, creating its directory and removing a stale socket file
pub async fn bind(path: &Path) -> Result<UnixListener> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed stale socket {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).with_context(|| format!("failed to remove {}", path.display())),
    }
    UnixListener::bind(path).with_context(|| format!("failed to bind {}", path.display()))
}

/// Accept connections until the listener fails, one task per client
pub async fn serve(listener: UnixListener, chain: Arc<Chain>) -> Result<()> {
    loop {
        let (stream, _) = listener.accept().await.context("accept failed")?;
        let chain = chain.clone();
        tokio::task::spawn(async move {
            if let Err(e) = handle_stream(&chain, stream).await {
                warn!("Client connection failed: {:#}", e);
            }
        });
    }
}

/// Answer every call line read from `stream` until the client hangs up
pub async fn handle_stream<S>(chain: &Chain, stream: S) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let mut reply = serde_json::to_string(&handle_line(chain, &line).await)?;
        reply.push('\n');
        writer.write_all(reply.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

/// Run one call through the chain
pub async fn handle_line(chain: &Chain, line: &str) -> EndpointReply {
    let call = match serde_json::from_str::<EndpointCall>(line) {
        Ok(call) => call,
        Err(e) => return EndpointReply::Error(format!("malformed call: {}", e)),
    };

    match call {
        EndpointCall::Request(mut request) => match chain.request(&mut request).await {
            Ok(conn) => EndpointReply::Connection(conn),
            Err(e) => EndpointReply::Error(format!("{:#}", e)),
        },
        EndpointCall::Close(conn) => match chain.close(&conn).await {
            Ok(()) => EndpointReply::Closed,
            Err(e) => EndpointReply::Error(format!("{:#}", e)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nse_api::{Connection, Mechanism, NetworkServiceRequest};
    use nse_chain::new_server;
    use nse_core::{MappingTable, ServiceConfig};
    use tokio::net::UnixStream;

    fn chain() -> Chain {
        let table = MappingTable::new(vec![ServiceConfig::parse(
            "pingpong@worker.domain: { addr: 0a:55:44:33:22:11; vlan: 100 }",
        )
        .unwrap()]);
        new_server("vfio-server", Arc::new(table))
    }

    fn request_line(service: &str) -> String {
        let request = NetworkServiceRequest::new(Connection::new("conn-1", service))
            .with_preference(Mechanism::noop());
        serde_json::to_string(&EndpointCall::Request(request)).unwrap()
    }

    #[tokio::test]
    async fn test_request_line() {
        let reply = handle_line(&chain(), &request_line("pingpong")).await;

        let conn = match reply {
            EndpointReply::Connection(conn) => conn,
            other => panic!("expected a connection, got {:?}", other),
        };
        let eth = conn.ethernet_context().unwrap();
        assert_eq!(eth.dst_mac, "0a:55:44:33:22:11");
        assert_eq!(eth.vlan_tag, 100);
        assert_eq!(conn.mechanism_type(), Some("NOOP"));
    }

    #[tokio::test]
    async fn test_request_line_unknown_service() {
        let reply = handle_line(&chain(), &request_line("unknown")).await;
        assert_eq!(
            reply,
            EndpointReply::Error("network service is not supported: unknown".to_string())
        );
    }

    #[tokio::test]
    async fn test_close_line() {
        let mut conn = Connection::new("conn-1", "pingpong");
        conn.mechanism = Some(Mechanism::noop());
        let line = serde_json::to_string(&EndpointCall::Close(conn)).unwrap();

        assert_eq!(handle_line(&chain(), &line).await, EndpointReply::Closed);
    }

    #[tokio::test]
    async fn test_malformed_line() {
        let reply = handle_line(&chain(), "{not json").await;
        assert!(matches!(reply, EndpointReply::Error(ref m) if m.starts_with("malformed call")));
    }

    #[tokio::test]
    async fn test_serve_on_socket() {
        let path = std::env::temp_dir()
            .join(format!("nse-vfio-serve-{}", std::process::id()))
            .join("listen.on");
        // Leftover file from an earlier run must not stop the bind.
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, b"stale").await.unwrap();

        let listener = bind(&path).await.unwrap();
        let server = tokio::spawn(serve(listener, Arc::new(chain())));

        let stream = UnixStream::connect(&path).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        writer
            .write_all(format!("{}\n\n{}\n", request_line("pingpong"), request_line("unknown")).as_bytes())
            .await
            .unwrap();

        let first: EndpointReply = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        let conn = match first {
            EndpointReply::Connection(conn) => conn,
            other => panic!("expected a connection, got {:?}", other),
        };
        assert_eq!(conn.ethernet_context().unwrap().vlan_tag, 100);

        let second: EndpointReply = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert!(matches!(second, EndpointReply::Error(_)));

        server.abort();
        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
    }
}
