//! Patient identity index server.
//!
//! Serves the FHIR Patient API and the HL7v3 PIX query endpoint over one
//! in-memory store.

use clap::Parser;
use patient_index_persistence::backends::memory::{InMemoryBackend, InMemoryBackendConfig};
use patient_index_persistence::core::{ChangeFeed, ChangeKind};
use patient_index_rest::{ServerConfig, create_app_with_config, init_logging};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

/// Starts the Axum HTTP server and runs until Ctrl-C.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, pix_path = %config.pix_path, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// Logs every committed change until the backend goes away.
fn spawn_change_logger(backend: &InMemoryBackend) {
    let mut changes = backend.subscribe();
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) => match &change.kind {
                    ChangeKind::Merged { target } => info!(
                        id = %change.id,
                        version = change.version,
                        merged_into = %target,
                        "Patient merged"
                    ),
                    kind => info!(
                        id = %change.id,
                        version = change.version,
                        kind = ?kind,
                        "Patient changed"
                    ),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Change logger lagged")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        anyhow::bail!("invalid configuration ({} errors)", errors.len());
    }

    info!(
        port = config.port,
        host = %config.host,
        pid_domain = %config.pid_domain,
        audit_capacity = config.audit_capacity,
        "Starting patient index"
    );

    let backend = InMemoryBackend::with_config(InMemoryBackendConfig {
        audit_capacity: config.audit_capacity,
        ..Default::default()
    });
    spawn_change_logger(&backend);

    let app = create_app_with_config(backend, config.clone());
    serve(app, &config).await
}
