//! Patient search types.
//!
//! A [`PatientQuery`] combines an optional exact identifier match with any
//! number of `_lastUpdated` bounds and an optional sort order.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::{StorageError, StorageResult};

use super::identifier::Identifier;
use super::patient::PatientRecord;

/// Comparison prefix of a date search value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePrefix {
    /// Within the range implied by the value's precision.
    Eq,
    /// After the range.
    Gt,
    /// At or after the start of the range.
    Ge,
    /// Before the range.
    Lt,
    /// Before the end of the range.
    Le,
}

impl DatePrefix {
    fn split(raw: &str) -> (Self, &str) {
        let prefixes = [
            ("eq", DatePrefix::Eq),
            ("gt", DatePrefix::Gt),
            ("ge", DatePrefix::Ge),
            ("lt", DatePrefix::Lt),
            ("le", DatePrefix::Le),
        ];
        for (code, prefix) in prefixes {
            if let Some(rest) = raw.strip_prefix(code) {
                return (prefix, rest);
            }
        }
        (DatePrefix::Eq, raw)
    }
}

/// A single `_lastUpdated` constraint.
///
/// The supplied value defines a half-open range `[start, end)` whose width is
/// its precision: a whole day for `YYYY-MM-DD`, one second for a full instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBound {
    prefix: DatePrefix,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateBound {
    /// Parses a search value such as `gt2024-01-01T10:00:00Z` or `le2024-02-03`.
    pub fn parse(raw: &str) -> StorageResult<Self> {
        let (prefix, value) = DatePrefix::split(raw.trim());

        if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
            let start = instant.with_timezone(&Utc);
            return Ok(Self {
                prefix,
                start,
                end: start + Duration::seconds(1),
            });
        }

        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            let start = date
                .and_hms_opt(0, 0, 0)
                .map(|naive| naive.and_utc())
                .ok_or_else(|| invalid_date(raw))?;
            return Ok(Self {
                prefix,
                start,
                end: start + Duration::days(1),
            });
        }

        Err(invalid_date(raw))
    }

    /// Returns the prefix.
    pub fn prefix(&self) -> DatePrefix {
        self.prefix
    }

    /// Returns true if `instant` satisfies this bound.
    pub fn matches(&self, instant: DateTime<Utc>) -> bool {
        match self.prefix {
            DatePrefix::Eq => instant >= self.start && instant < self.end,
            DatePrefix::Gt => instant >= self.end,
            DatePrefix::Ge => instant >= self.start,
            DatePrefix::Lt => instant < self.start,
            DatePrefix::Le => instant < self.end,
        }
    }
}

fn invalid_date(raw: &str) -> StorageError {
    StorageError::validation(format!("invalid _lastUpdated value '{}'", raw))
}

/// Sort order on `_lastUpdated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first.
    Ascending,
    /// Newest first.
    Descending,
}

/// A patient search.
///
/// An identifier criterion restricts results to active records. Without one,
/// inactive records are included so that change consumers can observe merges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientQuery {
    /// Exact identifier to match.
    pub identifier: Option<Identifier>,
    /// `_lastUpdated` bounds; all must hold.
    pub last_updated: Vec<DateBound>,
    /// Sort order; unsorted results come back in id order.
    pub sort: Option<SortOrder>,
}

impl PatientQuery {
    /// Creates an empty query matching every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the query to active holders of `identifier`.
    pub fn with_identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Adds a `_lastUpdated` bound.
    pub fn with_last_updated(mut self, bound: DateBound) -> Self {
        self.last_updated.push(bound);
        self
    }

    /// Sets the sort order.
    pub fn sorted(mut self, order: SortOrder) -> Self {
        self.sort = Some(order);
        self
    }

    /// Returns true if `record` satisfies every criterion of this query.
    pub fn matches(&self, record: &PatientRecord) -> bool {
        if let Some(identifier) = &self.identifier {
            if !record.is_active() || !record.identifiers().contains(identifier) {
                return false;
            }
        }
        self.last_updated
            .iter()
            .all(|bound| bound.matches(record.last_updated()))
    }

    /// Sorts `records` in place according to this query.
    pub fn sort(&self, records: &mut [PatientRecord]) {
        match self.sort {
            Some(SortOrder::Ascending) => records.sort_by_key(|r| r.last_updated()),
            Some(SortOrder::Descending) => {
                records.sort_by_key(|r| std::cmp::Reverse(r.last_updated()))
            }
            None => records.sort_by(|a, b| a.id().cmp(b.id())),
        }
    }
}
