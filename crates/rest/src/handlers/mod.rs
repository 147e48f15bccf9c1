//! HTTP request handlers.
//!
//! FHIR Patient interactions:
//!
//! - [`create`] - Create a record with a server-assigned id
//! - [`read`] - Read the current version
//! - [`vread`] - Read a specific version
//! - [`update`] - Update a record, or create it with a client id
//! - [`search`] - Search by identifier and last-updated time
//! - [`history`] - List every version of a record
//! - [`merge`] - The `$merge` operation
//!
//! Other endpoints:
//!
//! - [`pix`] - HL7v3 PIX query over SOAP
//! - [`audit`] - Audit trail as AuditEvent resources
//! - [`health`] - Health, liveness and readiness probes

pub mod audit;
pub mod create;
pub mod health;
pub mod history;
pub mod merge;
pub mod pix;
pub mod read;
pub mod search;
pub mod update;
pub mod vread;

pub use audit::audit_handler;
pub use create::create_handler;
pub use health::{health_handler, liveness_handler, readiness_handler};
pub use history::history_handler;
pub use merge::merge_handler;
pub use pix::pix_query_handler;
pub use read::read_handler;
pub use search::search_handler;
pub use update::update_handler;
pub use vread::vread_handler;
