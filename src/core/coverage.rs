use super::TimeRange;
use ahash::{HashMap, HashMapExt};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Width of a coverage bucket in minutes.
pub const BUCKET_MINUTES: i64 = 30;

const BUCKET_SECONDS: i64 = BUCKET_MINUTES * 60;

/// Buckets of the planning horizon that are touched by some working range.
/// Buckets are keyed by the number of whole periods since the earliest working start.
#[derive(Clone, Debug)]
pub struct CoverageLayout {
    origin: Option<NaiveDateTime>,
    index: HashMap<i64, usize>,
    target: u32,
}

impl CoverageLayout {
    /// Creates the bucket index of the working ranges.
    #[must_use]
    pub fn new(working: &[TimeRange], target: u32) -> Self {
        let origin = working.iter().map(|range| range.start).min();
        let mut layout = Self {
            origin,
            index: HashMap::new(),
            target,
        };

        for range in working {
            for key in layout.periods(range) {
                let next = layout.index.len();
                layout.index.entry(key).or_insert(next);
            }
        }

        layout
    }

    /// Returns the number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns whether there are no buckets at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the desired number of simultaneous sessions per bucket.
    #[must_use]
    pub const fn target(&self) -> u32 {
        self.target
    }

    /// Returns the keys of every period the range touches.
    fn periods(&self, range: &TimeRange) -> impl Iterator<Item = i64> {
        let range = *range;

        self.origin
            .filter(|_| !range.is_empty())
            .into_iter()
            .flat_map(move |origin| {
                let start = (range.start - origin).num_seconds();
                let end = (range.end - origin).num_seconds();
                start.div_euclid(BUCKET_SECONDS)..=(end - 1).div_euclid(BUCKET_SECONDS)
            })
    }

    /// Returns a coverage with every bucket at zero.
    #[must_use]
    pub fn empty(&self) -> Coverage {
        Coverage {
            counts: vec![0; self.index.len()],
            max: 0,
        }
    }

    /// Measures the coverage of the given session ranges.
    #[must_use]
    pub fn measure<'r>(&self, ranges: impl IntoIterator<Item = &'r TimeRange>) -> Coverage {
        let mut coverage = self.empty();
        for range in ranges {
            coverage.add(self, range);
        }
        coverage
    }

    /// Returns the summed shortfall of the coverage against the target.
    #[must_use]
    pub fn missing(&self, coverage: &Coverage) -> u64 {
        coverage
            .counts
            .iter()
            .map(|&count| u64::from(self.target.saturating_sub(count)))
            .sum()
    }

    /// Returns the shortfall of a schedule without sessions.
    #[must_use]
    pub fn worst(&self) -> u64 {
        u64::from(self.target) * crate::cast_u64(self.index.len())
    }

    /// Summarizes the coverage for reporting.
    #[must_use]
    pub fn summary(&self, coverage: &Coverage) -> CoverageSummary {
        CoverageSummary {
            missing: self.missing(coverage),
            max: coverage.max,
            worst: self.worst(),
            buckets: self.index.len(),
        }
    }
}

/// Number of sessions in every bucket of a layout.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Coverage {
    counts: Vec<u32>,
    max: u32,
}

impl Coverage {
    /// Adds a session range to every bucket it touches.
    pub fn add(&mut self, layout: &CoverageLayout, range: &TimeRange) {
        for key in layout.periods(range) {
            if let Some(&bucket) = layout.index.get(&key) {
                self.counts[bucket] += 1;
                self.max = self.max.max(self.counts[bucket]);
            }
        }
    }

    /// Returns a copy with the session range added.
    #[must_use]
    pub fn with(&self, layout: &CoverageLayout, range: &TimeRange) -> Self {
        let mut coverage = self.clone();
        coverage.add(layout, range);
        coverage
    }

    /// Returns the highest bucket value seen.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }
}

/// Coverage figures of a finished plan.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Serialize, PartialEq)]
pub struct CoverageSummary {
    /// Shortfall of the plan.
    pub missing: u64,
    /// Highest number of simultaneous sessions.
    pub max: u32,
    /// Shortfall of an empty plan.
    pub worst: u64,
    pub buckets: usize,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::time::test::range;

    #[test]
    fn buckets_cover_every_touched_period() {
        let layout = CoverageLayout::new(
            &[range(8, (9, 0), (11, 0)), range(8, (13, 0), (14, 15))],
            1,
        );
        assert_eq!(layout.len(), 4 + 3);

        let layout = CoverageLayout::new(&[range(9, (9, 0), (10, 0)), range(8, (9, 0), (10, 0))], 2);
        assert_eq!(layout.len(), 4);
        assert_eq!(layout.worst(), 8);
    }

    #[test]
    fn empty_schedule_misses_everything() {
        let layout = CoverageLayout::new(&[range(8, (9, 0), (17, 0))], 2);
        let coverage = layout.empty();

        assert_eq!(layout.missing(&coverage), 2 * 16);
        assert_eq!(layout.missing(&coverage), layout.worst());
        assert_eq!(coverage.max(), 0);
    }

    #[test]
    fn sessions_fill_touched_buckets() {
        let layout = CoverageLayout::new(&[range(8, (9, 0), (12, 0))], 1);

        let coverage = layout.measure(&[range(8, (9, 0), (10, 0))]);
        assert_eq!(layout.missing(&coverage), 4);
        assert_eq!(coverage.max(), 1);

        let coverage = coverage.with(&layout, &range(8, (9, 15), (9, 45)));
        assert_eq!(layout.missing(&coverage), 4);
        assert_eq!(coverage.max(), 2);

        let coverage = coverage.with(&layout, &range(8, (10, 0), (12, 0)));
        assert_eq!(layout.missing(&coverage), 0);
        assert_eq!(coverage.max(), 2);
    }

    #[test]
    fn adding_sessions_is_monotonic() {
        let layout = CoverageLayout::new(&[range(8, (9, 0), (17, 0))], 2);
        let sessions = [
            range(8, (9, 0), (10, 0)),
            range(8, (9, 0), (10, 0)),
            range(8, (9, 30), (10, 30)),
            range(8, (16, 0), (17, 0)),
            range(8, (12, 0), (12, 30)),
        ];

        let mut coverage = layout.empty();
        for session in &sessions {
            let before = (layout.missing(&coverage), coverage.max());
            coverage.add(&layout, session);
            let after = (layout.missing(&coverage), coverage.max());

            let touched = crate::cast_u64(layout.periods(session).count());
            assert!(after.0 <= before.0);
            assert!(before.0 - after.0 <= touched);
            assert!(after.1 >= before.1);
        }

        assert_eq!(coverage.max(), 3);
    }

    #[test]
    fn sessions_outside_working_time_are_ignored() {
        let layout = CoverageLayout::new(&[range(8, (9, 0), (10, 0))], 1);
        let coverage = layout.measure(&[range(8, (12, 0), (13, 0))]);
        assert_eq!(layout.missing(&coverage), 2);
        assert_eq!(coverage.max(), 0);
    }

    #[test]
    fn no_working_time_means_no_buckets() {
        let layout = CoverageLayout::new(&[], 3);
        assert!(layout.is_empty());
        assert_eq!(layout.worst(), 0);
        assert_eq!(layout.summary(&layout.empty()), CoverageSummary::default());
    }
}
