//! # patient-index-rest - HTTP surface of the patient identity index
//!
//! This crate serves a patient identity index over two protocols:
//!
//! - a FHIR REST API for Patient records: create, read, version read, update,
//!   search, history and the `$merge` operation
//! - an HL7v3 PIX query endpoint (`PRPA_IN201309UV02` over SOAP 1.2) that
//!   cross-references a patient's identifiers between assigning authorities
//!
//! Both read the same store, so a record written over REST is visible to the
//! next PIX query.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use patient_index_persistence::backends::memory::InMemoryBackend;
//! use patient_index_rest::{ServerConfig, create_app_with_config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::default();
//!     let app = create_app_with_config(InMemoryBackend::new(), config.clone());
//!
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Interaction | HTTP Method | URL Pattern |
//! |------------|-------------|-------------|
//! | create | POST | `/Patient` |
//! | read | GET | `/Patient/[id]` |
//! | vread | GET | `/Patient/[id]/_history/[vid]` |
//! | update | PUT | `/Patient/[id]` |
//! | search | GET | `/Patient?identifier=&_lastUpdated=&_sort=` |
//! | history | GET | `/Patient/[id]/_history` |
//! | merge | POST | `/Patient/$merge` |
//! | audit trail | GET | `/AuditEvent?patient=Patient/[id]` |
//! | PIX query | POST | `/ws/pix` (configurable) |
//! | health | GET | `/health` |
//!
//! ## Error Handling
//!
//! REST errors are FHIR [OperationOutcome](https://hl7.org/fhir/operationoutcome.html)
//! resources; see [`error`] for the status mapping. The PIX endpoint answers
//! with HL7v3 acknowledgements or SOAP faults.
//!
//! ## Configuration
//!
//! See [`ServerConfig`]. Every option can be set by flag or by a
//! `PATIENT_INDEX_*` environment variable.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod resources;
pub mod responses;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use state::{AppState, PatientIndexBackend};

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit};
use http::StatusCode;
use patient_index_persistence::core::PatientStorage;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Creates the Axum application with default configuration.
///
/// For more control, use [`create_app_with_config`].
pub fn create_app<S>(storage: S) -> Router
where
    S: PatientIndexBackend,
{
    create_app_with_config(storage, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// # Arguments
///
/// * `storage` - The storage backend to use
/// * `config` - Server configuration
///
/// # Example
///
/// ```rust
/// use patient_index_persistence::backends::memory::InMemoryBackend;
/// use patient_index_rest::{ServerConfig, create_app_with_config};
///
/// let config = ServerConfig {
///     pid_domain: "1.2.840.114350".to_string(),
///     ..Default::default()
/// };
/// let app = create_app_with_config(InMemoryBackend::new(), config);
/// ```
pub fn create_app_with_config<S>(storage: S, config: ServerConfig) -> Router
where
    S: PatientIndexBackend,
{
    info!(
        backend = storage.backend_name(),
        pid_domain = %config.pid_domain,
        pix_path = %config.pix_path,
        "Creating patient index server"
    );

    let state = AppState::new(Arc::new(storage), config.clone());
    let router = routing::create_routes(state).layer(DefaultBodyLimit::max(config.max_body_size));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    let router = router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.request_timeout),
            )),
    );

    // Outermost, so the trace span and the response both see the id
    if config.enable_request_id {
        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
    } else {
        router
    }
}

/// Builds the CORS layer from comma-separated configuration lists.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        cors = cors.allow_origin(parse_list(&config.cors_origins));
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        cors = cors.allow_methods(parse_list(&config.cors_methods));
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        cors = cors.allow_headers(parse_list(&config.cors_headers));
    }

    cors
}

/// Parses a comma-separated list, skipping entries that do not parse.
fn parse_list<T: std::str::FromStr>(list: &str) -> Vec<T> {
    list.split(',').filter_map(|s| s.trim().parse().ok()).collect()
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `level` when set. Call once at startup.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "patient_index_rest={level},patient_index_persistence={level},patient_index={level},audit={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
