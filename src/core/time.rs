use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A half-open interval `[start, end)` of wall-clock time.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    /// Creates a new range.
    #[must_use]
    pub const fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Returns whether the two ranges share any instant.
    /// Touching endpoints do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.end > other.start && other.end > self.start
    }

    /// Expands the range by `amount` on both ends.
    #[must_use]
    pub fn pad(&self, amount: Duration) -> Self {
        Self::new(self.start - amount, self.end + amount)
    }

    /// Returns the length of the range in whole minutes.
    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Returns whether the range is empty or reversed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// An interval during which a person is unavailable.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct BusyTime {
    pub person: String,
    pub range: TimeRange,
}

impl BusyTime {
    /// Creates a new busy entry for the given person.
    #[must_use]
    pub fn new(person: impl Into<String>, range: TimeRange) -> Self {
        Self {
            person: person.into(),
            range,
        }
    }
}

/// Merges the given ranges into a minimal sorted list of disjoint ranges.
/// Ranges that touch are merged as well.
#[must_use]
pub fn merge_ranges(mut ranges: Vec<TimeRange>) -> Vec<TimeRange> {
    ranges.sort_unstable_by_key(|range| (range.start, range.end));

    let mut merged: Vec<TimeRange> = Vec::with_capacity(ranges.len());

    for range in ranges {
        match merged.last_mut() {
            Some(last) if last.end >= range.start => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }

    merged
}
