use anyhow::{Context, Result};
use chrono::Utc;
use nse_chain::new_server;
use nse_core::endpoint::{network_services, registry_endpoint};
use nse_core::{Config, MappingTable, Registry, ServiceRegistry};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod listen;
mod serve;

#[tokio::main]
async fn main() -> Result<()> {
    let start = Instant::now();

    let config = Config::from_env().context("Failed to load config from environment")?;
    init_tracing(&config);

    info!("Starting nse-vfio...");
    info!("executing phase 1: get config from environment");
    info!(
        "Config: name={} connect_to={} max_token_lifetime={:?} services={}",
        config.name,
        config.connect_to,
        config.max_token_lifetime,
        config.services.len()
    );
    for service in &config.services {
        info!("  - {}", service);
    }

    info!("executing phase 2: create mapping table and request chain");
    let table = Arc::new(MappingTable::new(config.services.clone()));
    if table.len() < config.services.len() {
        warn!(
            "{} services configured but only {} distinct names; later entries replaced earlier ones",
            config.services.len(),
            table.len()
        );
    }
    let server = Arc::new(new_server(&config.name, table.clone()));
    info!(
        "Request chain initialized with stages: {}",
        server.stage_names().join(" -> ")
    );

    info!("executing phase 3: serve the request chain");
    let listen_path = listen::listen_path(&config.name);
    let listener = serve::bind(&listen_path).await?;
    let listen_on = listen::listen_url(&listen_path);
    info!("Listening on {}", listen_on);
    let serving = tokio::task::spawn(serve::serve(listener, server));

    info!("executing phase 4: register network services and endpoint");
    let registry = ServiceRegistry::new();
    for service in network_services(&config.services) {
        let name = service.name.clone();
        registry
            .register_service(service)
            .await
            .with_context(|| format!("failed to register ns({})", name))?;
    }

    let expiration_time = Utc::now()
        + chrono::Duration::from_std(config.max_token_lifetime)
            .context("max token lifetime out of range")?;
    let nse = registry
        .register_endpoint(registry_endpoint(
            &config.name,
            &listen_on,
            expiration_time,
            &config.services,
        ))
        .await
        .context("unable to register nse")?;
    info!("nse: {}", serde_json::to_string(&nse)?);

    info!("startup completed in {:?}", start.elapsed());

    tokio::select! {
        result = shutdown_signal() => {
            result?;
            info!("Shutdown signal received, exiting...");
        }
        result = serving => {
            warn!("Listener stopped: {:?}", result);
        }
    }

    if let Err(e) = registry.unregister_endpoint(&config.name).await {
        warn!("Failed to unregister nse: {}", e);
    }
    if let Err(e) = tokio::fs::remove_file(&listen_path).await {
        warn!("Failed to remove {}: {}", listen_path.display(), e);
    }
    Ok(())
}

/// Install the tracing subscriber; `RUST_LOG` takes precedence over the configured level
fn init_tracing(config: &Config) {
    let level = config.log_level.to_string().to_lowercase();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

async fn shutdown_signal() -> Result<()> {
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => {}
    }
    Ok(())
}
