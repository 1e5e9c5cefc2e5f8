// src/filter.rs
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::Record;

/// Closed display interval; a missing bound is unbounded on that side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl DisplayRange {
    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, n: i64) -> bool {
        self.start.map_or(true, |s| n >= s) && self.end.map_or(true, |e| n <= e)
    }
}

/// What a bounded filter does with a sequence value that is not an integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonNumericPolicy {
    Include,
    #[default]
    Exclude,
}

/// The number a record is filtered by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SequenceNumber<'a> {
    /// Parsed from the sequence column.
    Explicit(i64),
    /// No sequence value; the record's position stands in.
    Positional(i64),
    Invalid(&'a str),
}

pub fn sequence_number<'a>(record: &'a Record, candidates: &[String]) -> SequenceNumber<'a> {
    match record.first_of(candidates) {
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) => SequenceNumber::Explicit(n),
            Err(_) => SequenceNumber::Invalid(raw),
        },
        None => SequenceNumber::Positional(record.index as i64),
    }
}

/// Keep the records whose sequence number falls inside `range`, in order.
/// With both bounds absent the input is returned as is.
pub fn filter_range(
    records: Vec<Record>,
    range: &DisplayRange,
    sequence: &[String],
    policy: NonNumericPolicy,
) -> Vec<Record> {
    if range.is_unbounded() {
        return records;
    }
    let before = records.len();
    let kept: Vec<Record> = records
        .into_iter()
        .filter(|r| match sequence_number(r, sequence) {
            SequenceNumber::Explicit(n) | SequenceNumber::Positional(n) => range.contains(n),
            SequenceNumber::Invalid(raw) => {
                debug!(line = r.line, value = raw, ?policy, "non-numeric sequence value");
                policy == NonNumericPolicy::Include
            }
        })
        .collect();
    debug!(before, after = kept.len(), ?range, "applied display range");
    kept
}
