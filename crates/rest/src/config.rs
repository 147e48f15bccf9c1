//! Server configuration for the patient index.
//!
//! This module provides configuration types for the server, supporting both
//! programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PATIENT_INDEX_PORT` | 8080 | Server port |
//! | `PATIENT_INDEX_HOST` | 127.0.0.1 | Host to bind |
//! | `PATIENT_INDEX_LOG_LEVEL` | info | Log level |
//! | `PATIENT_INDEX_MAX_BODY_SIZE` | 1048576 | Max request body (bytes) |
//! | `PATIENT_INDEX_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `PATIENT_INDEX_ENABLE_CORS` | true | Enable CORS |
//! | `PATIENT_INDEX_CORS_ORIGINS` | * | Allowed origins |
//! | `PATIENT_INDEX_CORS_METHODS` | GET,POST,PUT,OPTIONS | Allowed methods |
//! | `PATIENT_INDEX_CORS_HEADERS` | Content-Type,Accept,Authorization,SOAPAction | Allowed headers |
//! | `PATIENT_INDEX_BASE_URL` | http://localhost:8080 | Server base URL |
//! | `PATIENT_INDEX_PID_DOMAIN` | 0.0.0 | Domain of record ids in PIX queries |
//! | `PATIENT_INDEX_PIX_PATH` | /ws/pix | Path of the PIX SOAP endpoint |
//! | `PATIENT_INDEX_AUDIT_CAPACITY` | 10000 | Audit entries kept in memory |
//! | `PATIENT_INDEX_ENABLE_REQUEST_ID` | true | Tag requests with `x-request-id` |
//!
//! # Example
//!
//! ```rust
//! use patient_index_rest::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     pid_domain: "1.2.840.114350.1.13.99999".to_string(),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use clap::Parser;

/// Server configuration for the patient index.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "patient-index")]
#[command(about = "Patient identity index with FHIR REST and HL7v3 PIX query endpoints")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "PATIENT_INDEX_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "PATIENT_INDEX_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "PATIENT_INDEX_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "PATIENT_INDEX_MAX_BODY_SIZE", default_value = "1048576")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "PATIENT_INDEX_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "PATIENT_INDEX_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "PATIENT_INDEX_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(long, env = "PATIENT_INDEX_CORS_METHODS", default_value = "GET,POST,PUT,OPTIONS")]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "PATIENT_INDEX_CORS_HEADERS",
        default_value = "Content-Type,Accept,Authorization,SOAPAction"
    )]
    pub cors_headers: String,

    /// Base URL for the server (used in Location headers and Bundle links).
    #[arg(long, env = "PATIENT_INDEX_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Identifier domain under which record ids are queried over PIX.
    #[arg(long, env = "PATIENT_INDEX_PID_DOMAIN", default_value = "0.0.0")]
    pub pid_domain: String,

    /// Path of the PIX SOAP endpoint.
    #[arg(long, env = "PATIENT_INDEX_PIX_PATH", default_value = "/ws/pix")]
    pub pix_path: String,

    /// Number of audit entries retained in memory.
    #[arg(long, env = "PATIENT_INDEX_AUDIT_CAPACITY", default_value = "10000")]
    pub audit_capacity: usize,

    /// Enable request ID tracking.
    #[arg(long, env = "PATIENT_INDEX_ENABLE_REQUEST_ID", default_value = "true")]
    pub enable_request_id: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: 1024 * 1024,
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,PUT,OPTIONS".to_string(),
            cors_headers: "Content-Type,Accept,Authorization,SOAPAction".to_string(),
            base_url: "http://localhost:8080".to_string(),
            pid_domain: "0.0.0".to_string(),
            pix_path: "/ws/pix".to_string(),
            audit_capacity: 10_000,
            enable_request_id: true,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// Parses environment variables without requiring command line arguments,
    /// falling back to defaults when they do not parse.
    pub fn from_env() -> Self {
        Self::try_parse_from(["patient-index"]).unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.pid_domain.trim().is_empty() {
            errors.push("PID domain cannot be empty".to_string());
        }

        if !self.pix_path.starts_with('/') {
            errors.push("PIX path must start with '/'".to_string());
        }

        if self.audit_capacity == 0 {
            errors.push("Audit capacity cannot be 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0 and disables CORS and request ids.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            base_url: "http://localhost:8080".to_string(),
            enable_request_id: false,
            ..Default::default()
        }
    }
}
