use chrono::{DateTime, Timelike, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{ErrorText, FieldName};

/// Timestamp precision used by [`RecordMeta::is_newer_than`].
///
/// Comparing at a coarser precision truncates both timestamps to that level;
/// nothing is rounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimePrecision {
    /// Full (sub-second) precision.
    Full,
    /// Second precision.
    Seconds,
    /// Minute precision.
    Minutes,
    /// Hour precision.
    Hours,
    /// Calendar-date precision.
    Days,
}

/// Shared base fields of every versioned record, embedded by composition.
///
/// The parsing-error ledger is filled exactly once at admission and read-only
/// afterward: a field listed there holds its declared default, not the raw
/// invalid value. That keeps "defaulted because extraction failed"
/// distinguishable from "intentionally set to the default".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// When the data behind this record was observed.
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    parsing_errors: IndexMap<FieldName, ErrorText>,
}

impl RecordMeta {
    /// Metadata observed at the given time with a clean ledger.
    pub fn new(recorded_at: DateTime<Utc>) -> Self {
        Self {
            recorded_at,
            parsing_errors: IndexMap::new(),
        }
    }

    /// Metadata with a prefilled ledger; only admission builds these.
    pub(crate) fn with_errors(
        recorded_at: DateTime<Utc>,
        parsing_errors: IndexMap<FieldName, ErrorText>,
    ) -> Self {
        Self {
            recorded_at,
            parsing_errors,
        }
    }

    /// Read-only view of the per-field admission failures.
    pub fn parsing_errors(&self) -> &IndexMap<FieldName, ErrorText> {
        &self.parsing_errors
    }

    /// Whether any field fell back to its default during admission.
    pub fn has_parsing_errors(&self) -> bool {
        !self.parsing_errors.is_empty()
    }

    /// Compare two observation times at the requested precision.
    ///
    /// Returns `None` when the truncated timestamps are equal, otherwise
    /// `Some(true)` when this record is strictly newer than `other`.
    pub fn is_newer_than(&self, other: &RecordMeta, precision: TimePrecision) -> Option<bool> {
        let own = truncate(self.recorded_at, precision);
        let theirs = truncate(other.recorded_at, precision);
        if own == theirs {
            None
        } else {
            Some(own > theirs)
        }
    }
}

/// Truncate a timestamp to the requested precision.
fn truncate(ts: DateTime<Utc>, precision: TimePrecision) -> DateTime<Utc> {
    let truncated = match precision {
        TimePrecision::Full => Some(ts),
        TimePrecision::Seconds => ts.with_nanosecond(0),
        TimePrecision::Minutes => ts.with_second(0).and_then(|t| t.with_nanosecond(0)),
        TimePrecision::Hours => ts
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0)),
        TimePrecision::Days => ts
            .with_hour(0)
            .and_then(|t| t.with_minute(0))
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0)),
    };
    truncated.unwrap_or(ts)
}
