//! Patient search parameters extractor.
//!
//! Supported parameters:
//!
//! | Parameter | Form | Notes |
//! |-----------|------|-------|
//! | `identifier` | `system\|value` | exact match, at most once |
//! | `_lastUpdated` | `[eq\|gt\|ge\|lt\|le]date` | repeatable, all must hold |
//! | `_sort` | `_lastUpdated` or `-_lastUpdated` | |
//!
//! Other parameters are ignored.

use axum::{extract::FromRequestParts, http::request::Parts};
use patient_index_persistence::Identifier;
use patient_index_persistence::types::{DateBound, PatientQuery, SortOrder};
use tracing::debug;

use crate::error::RestError;

/// Axum extractor turning a query string into a [`PatientQuery`].
#[derive(Debug, Clone, Default)]
pub struct PatientSearchParams {
    query: PatientQuery,
    raw: String,
}

impl PatientSearchParams {
    /// Parses a raw (percent-encoded) query string.
    ///
    /// # Errors
    ///
    /// * `RestError::BadRequest` - If a supported parameter has an invalid value
    pub fn parse(raw: &str) -> Result<Self, RestError> {
        let mut query = PatientQuery::new();

        for (name, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match name.as_ref() {
                "identifier" => {
                    if query.identifier.is_some() {
                        return Err(RestError::bad_request(
                            "identifier may appear only once",
                        ));
                    }
                    let identifier = Identifier::parse_token(&value).ok_or_else(|| {
                        RestError::bad_request(format!(
                            "identifier must have the form system|value, got '{}'",
                            value
                        ))
                    })?;
                    query = query.with_identifier(identifier);
                }
                "_lastUpdated" => {
                    query = query.with_last_updated(DateBound::parse(&value)?);
                }
                "_sort" => {
                    let order = match value.as_ref() {
                        "_lastUpdated" => SortOrder::Ascending,
                        "-_lastUpdated" => SortOrder::Descending,
                        other => {
                            return Err(RestError::bad_request(format!(
                                "unsupported _sort '{}'",
                                other
                            )));
                        }
                    };
                    query = query.sorted(order);
                }
                other => debug!(parameter = %other, "Ignoring unsupported search parameter"),
            }
        }

        Ok(Self {
            query,
            raw: raw.to_string(),
        })
    }

    /// Returns the parsed query.
    pub fn query(&self) -> &PatientQuery {
        &self.query
    }

    /// Returns the original query string.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl<S> FromRequestParts<S> for PatientSearchParams
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::parse(parts.uri.query().unwrap_or_default())
    }
}
