use super::{CoverageSummary, Pair, Pool, Session, TimeRange};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An accepted session with its members resolved to identities.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct Assignment {
    pub members: Pair,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Assignment {
    /// Returns the time range of the assignment.
    #[must_use]
    pub const fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}

/// Accepted sessions ordered by start.
#[derive(Clone, Debug, Default, Deserialize, Eq, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Solution {
    sessions: Vec<Assignment>,
}

impl Solution {
    /// Resolves the accepted sessions against the pool and orders them by start.
    #[must_use]
    pub fn new(pool: &Pool, accepted: &[&Session]) -> Self {
        let mut sessions: Vec<_> = accepted
            .iter()
            .map(|session| Assignment {
                members: pool.members(session).map(|person| person.id.clone()),
                start: session.range.start,
                end: session.range.end,
            })
            .collect();

        sessions.sort_by_key(|assignment| (assignment.start, assignment.end));

        Self { sessions }
    }

    /// Returns the sessions ordered by start.
    #[must_use]
    pub fn sessions(&self) -> &[Assignment] {
        &self.sessions
    }

    /// Returns the number of sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns whether no session was accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Checks that the sessions are ordered by start and that every session has two distinct members.
    #[must_use]
    pub fn verify(&self) -> bool {
        self.sessions
            .windows(2)
            .all(|pair| pair[0].start <= pair[1].start)
            && self
                .sessions
                .iter()
                .all(|session| session.members[0] != session.members[1] && !session.range().is_empty())
    }
}

/// Result of one scheduler run.
#[non_exhaustive]
#[derive(Clone, Debug, Default, Deserialize, Eq, Serialize, PartialEq)]
pub struct Plan {
    pub solution: Solution,
    pub coverage: CoverageSummary,
    /// Fixed pairs for which no slot was found.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmatched: Vec<Pair>,
}

impl Plan {
    /// Creates a plan without unmatched pairs.
    #[must_use]
    pub const fn new(solution: Solution, coverage: CoverageSummary) -> Self {
        Self {
            solution,
            coverage,
            unmatched: Vec::new(),
        }
    }

    /// Sets the unmatched pairs.
    #[must_use]
    pub fn with_unmatched(mut self, unmatched: Vec<Pair>) -> Self {
        self.unmatched = unmatched;
        self
    }
}
