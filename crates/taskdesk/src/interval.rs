//! Approved leave intervals and their JSON wire format.
//!
//! The backend returns approved leave as an array of objects with inclusive
//! `start_date` / `end_date` strings in `YYYY-MM-DD` form. Parsing is
//! skip-and-continue: a bad entry becomes a [`ValidationError`] and the
//! remaining entries are still usable.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError, ValidationReason};

/// Date format used on the wire for leave bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An approved absence, both bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaveInterval {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl LeaveInterval {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// A single-day interval.
    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    /// `false` when `start_date > end_date`.
    pub fn is_well_formed(&self) -> bool {
        self.start_date <= self.end_date
    }

    /// Check the `start_date <= end_date` invariant for an interval built in
    /// code. `index` names the interval in the returned error.
    pub fn validate(&self, index: usize) -> std::result::Result<(), ValidationError> {
        if self.is_well_formed() {
            Ok(())
        } else {
            Err(ValidationError {
                index,
                start_date: self.start_date.format(DATE_FORMAT).to_string(),
                end_date: self.end_date.format(DATE_FORMAT).to_string(),
                reason: ValidationReason::EndBeforeStart,
            })
        }
    }

    /// Whether `date` falls inside the interval. Always `false` for an
    /// inverted interval.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Every calendar day in the interval, in order.
    ///
    /// An inverted interval yields nothing; the iterator is bounded by
    /// `end_date` and always terminates.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end_date;
        let first = self.is_well_formed().then_some(self.start_date);
        std::iter::successors(first, move |d| d.succ_opt().filter(|next| *next <= end))
    }

    /// Number of days covered (0 for an inverted interval).
    pub fn len_days(&self) -> i64 {
        if self.is_well_formed() {
            (self.end_date - self.start_date).num_days() + 1
        } else {
            0
        }
    }
}

/// A leave entry exactly as received from the backend.
///
/// Fields other than the two bounds (`id`, `leave_type`, `status`, ...) are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLeaveInterval {
    pub start_date: String,
    pub end_date: String,
}

impl RawLeaveInterval {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// Parse and validate both bounds. `index` is the entry's position in
    /// the source list and is carried into any error.
    pub fn parse(&self, index: usize) -> std::result::Result<LeaveInterval, ValidationError> {
        let reject = |reason| ValidationError {
            index,
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            reason,
        };

        let start = parse_wire_date(&self.start_date)
            .ok_or_else(|| reject(ValidationReason::UnparseableStart))?;
        let end = parse_wire_date(&self.end_date)
            .ok_or_else(|| reject(ValidationReason::UnparseableEnd))?;
        if start > end {
            return Err(reject(ValidationReason::EndBeforeStart));
        }

        Ok(LeaveInterval::new(start, end))
    }
}

impl From<LeaveInterval> for RawLeaveInterval {
    fn from(interval: LeaveInterval) -> Self {
        Self {
            start_date: interval.start_date.format(DATE_FORMAT).to_string(),
            end_date: interval.end_date.format(DATE_FORMAT).to_string(),
        }
    }
}

/// Leave bounds are calendar dates. A complete RFC 3339 or naive
/// `YYYY-MM-DDTHH:MM:SS` timestamp is also accepted and its date part kept;
/// anything else, including trailing garbage after a date, is rejected.
fn parse_wire_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(day) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(day);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ndt| ndt.date())
}

/// The usable intervals of one leave listing, plus whatever was rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalSet {
    pub intervals: Vec<LeaveInterval>,
    pub rejected: Vec<ValidationError>,
}

impl IntervalSet {
    /// Validate raw entries one by one, keeping the good ones.
    pub fn from_raw(raw: &[RawLeaveInterval]) -> Self {
        let mut set = IntervalSet::default();

        for (index, entry) in raw.iter().enumerate() {
            match entry.parse(index) {
                Ok(interval) => set.intervals.push(interval),
                Err(err) => {
                    tracing::warn!("skipping leave interval: {err}");
                    set.rejected.push(err);
                }
            }
        }

        set
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Parse the backend's approved-leave JSON array.
///
/// # Errors
/// Returns `TaskdeskError::Json` only when the document itself is not an
/// array of `{start_date, end_date}` objects. Bad dates inside individual
/// entries land in [`IntervalSet::rejected`] instead.
pub fn parse_intervals(json: &str) -> Result<IntervalSet> {
    let raw: Vec<RawLeaveInterval> = serde_json::from_str(json)?;
    Ok(IntervalSet::from_raw(&raw))
}
