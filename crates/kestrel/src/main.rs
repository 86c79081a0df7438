//! Kestrel
//!
//! A federated log-query gateway for Elasticsearch clusters.

use std::sync::Arc;

use clap::Parser;
use kestrel_gateway::backends::elasticsearch::connect_all;
use kestrel_gateway::observability::{DynObserver, TracingObserver};
use kestrel_gateway::service::LogSearchService;
use kestrel_rest::{ServerConfig, build_service, create_app, init_logging};
use tracing::{info, warn};

/// Starts the Axum HTTP server and serves until Ctrl-C.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Connects to every configured cluster and assembles the service.
fn create_service(config: &ServerConfig) -> anyhow::Result<Arc<LogSearchService>> {
    let backends = connect_all(&config.cluster_config())?;
    info!(clusters = backends.len(), "Cluster connections configured");

    let observer: DynObserver = Arc::new(TracingObserver);
    Ok(build_service(config, backends, observer)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        es_hosts = ?config.es_hosts,
        discovery = config.discovery_enabled,
        "Starting Kestrel"
    );

    let service = create_service(&config)?;
    let catalog = service.catalog().clone();
    catalog.startup();

    let app = create_app(service, config.clone());
    let result = serve(app, &config).await;

    catalog.shutdown().await;
    info!("Kestrel stopped");
    result
}
