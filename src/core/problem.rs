use super::{BusyTime, Error, Result, TimeRange};
use ahash::{HashSet, HashSetExt};
use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

/// A participant that can be paired into squads.
#[derive(Clone, Debug, Deserialize, Eq, Serialize, PartialEq)]
pub struct Person {
    /// Unique identity, usually an email address.
    pub id: String,
    /// Experienced people may pair with anyone, standard people only with experienced ones.
    #[serde(default)]
    pub experienced: bool,
    /// Explicit weekly cap. `None` falls back to [`Settings::default_max_sessions`],
    /// `Some(0)` makes the person ineligible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sessions_per_week: Option<u32>,
    /// Skills of the person. An empty set is compatible with everyone.
    #[serde(default)]
    pub skills: HashSet<String>,
}

impl Person {
    /// Creates a person without skills and with the default cap.
    #[must_use]
    pub fn new(id: impl Into<String>, experienced: bool) -> Self {
        Self {
            id: id.into(),
            experienced,
            max_sessions_per_week: None,
            skills: HashSet::new(),
        }
    }

    /// Sets the explicit weekly cap.
    #[must_use]
    pub const fn with_cap(mut self, cap: u32) -> Self {
        self.max_sessions_per_week = Some(cap);
        self
    }

    /// Replaces the skill set.
    #[must_use]
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the weekly cap that applies to this person.
    #[must_use]
    pub fn effective_cap(&self, settings: &Settings) -> u32 {
        self.max_sessions_per_week
            .unwrap_or(settings.default_max_sessions)
    }

    /// Returns whether the two people can work together skill-wise.
    #[must_use]
    pub fn shares_skill(&self, other: &Self) -> bool {
        self.skills.is_empty()
            || other.skills.is_empty()
            || !self.skills.is_disjoint(&other.skills)
    }
}

/// A fixed pair of person identities, used by the single-slot selection.
pub type Pair = [String; 2];

/// Tunable parameters shared by every component of a run.
#[derive(Clone, Debug, Deserialize, Eq, Serialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub session_minutes: u32,
    /// Minimum distance between two sessions of the same person.
    pub spacing_minutes: u32,
    pub default_max_sessions: u32,
    /// Number of children explored per node.
    pub branch_width: usize,
    /// Depth after which only the best child is explored.
    pub depth_limit: usize,
    pub day_start: NaiveTime,
    pub day_end: NaiveTime,
    pub lunch_start: NaiveTime,
    pub lunch_end: NaiveTime,
}

impl Settings {
    /// Returns the session duration.
    #[must_use]
    pub fn session_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.session_minutes))
    }

    /// Returns the minimum spacing between sessions of one person.
    #[must_use]
    pub fn spacing(&self) -> Duration {
        Duration::minutes(i64::from(self.spacing_minutes))
    }

    /// Checks that the settings describe a runnable configuration.
    ///
    /// # Errors
    /// - If the session duration or the branch width is zero.
    /// - If the working day or lunch break ends before it starts.
    /// - If a scoring window around the day end or lunch break would cross midnight.
    pub fn validate(&self) -> Result<()> {
        if self.session_minutes == 0 {
            return Err(Error::InvalidSetting {
                name: "session_minutes",
                reason: "must be positive",
            });
        }

        if self.branch_width == 0 {
            return Err(Error::InvalidSetting {
                name: "branch_width",
                reason: "must be positive",
            });
        }

        if self.day_end <= self.day_start {
            return Err(Error::InvalidSetting {
                name: "day_end",
                reason: "must be after day_start",
            });
        }

        if self.lunch_end < self.lunch_start {
            return Err(Error::InvalidSetting {
                name: "lunch_end",
                reason: "must not be before lunch_start",
            });
        }

        // Scoring windows reach one hour before the day end and lunch start,
        // and half an hour past the lunch end, all on the same day.
        let wraps = |(_, overflow): (NaiveTime, i64)| overflow != 0;

        if wraps(self.day_end.overflowing_sub_signed(Duration::hours(1))) {
            return Err(Error::InvalidSetting {
                name: "day_end",
                reason: "must be at least one hour after midnight",
            });
        }

        if wraps(self.lunch_start.overflowing_sub_signed(Duration::hours(1))) {
            return Err(Error::InvalidSetting {
                name: "lunch_start",
                reason: "must be at least one hour after midnight",
            });
        }

        if wraps(self.lunch_end.overflowing_add_signed(Duration::minutes(30))) {
            return Err(Error::InvalidSetting {
                name: "lunch_end",
                reason: "must be more than half an hour before midnight",
            });
        }

        Ok(())
    }
}

fn clock(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_minutes: 60,
            spacing_minutes: 60,
            default_max_sessions: 2,
            branch_width: 3,
            depth_limit: 4,
            day_start: clock(9),
            day_end: clock(17),
            lunch_start: clock(12),
            lunch_end: clock(13),
        }
    }
}

const fn one() -> u32 {
    1
}

const fn unbounded() -> u32 {
    u32::MAX
}

/// An instance of the squad scheduling problem.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Eq, Serialize, PartialEq)]
pub struct Problem {
    /// The order of the roster defines the pair enumeration order.
    pub roster: Vec<Person>,
    /// Disjoint ranges in which sessions may be placed.
    pub working: Vec<TimeRange>,
    #[serde(default)]
    pub busy: Vec<BusyTime>,
    /// Desired number of simultaneous sessions per coverage bucket.
    #[serde(default = "one")]
    pub target_coverage: u32,
    /// Hard ceiling on simultaneous sessions in any bucket.
    #[serde(default = "unbounded")]
    pub max_total_coverage: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pairs: Vec<Pair>,
    #[serde(default)]
    pub settings: Settings,
}

impl Problem {
    /// Creates a new problem with default settings and no fixed pairs.
    #[must_use]
    pub fn new(
        roster: Vec<Person>,
        working: Vec<TimeRange>,
        busy: Vec<BusyTime>,
        target_coverage: u32,
        max_total_coverage: u32,
    ) -> Self {
        Self {
            roster,
            working,
            busy,
            target_coverage,
            max_total_coverage,
            pairs: Vec::new(),
            settings: Settings::default(),
        }
    }

    /// Replaces the fixed pairs.
    #[must_use]
    pub fn with_pairs(mut self, pairs: Vec<Pair>) -> Self {
        self.pairs = pairs;
        self
    }

    /// Replaces the settings.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the roster index of the person with the given identity.
    #[must_use]
    pub fn person_index(&self, id: &str) -> Option<usize> {
        self.roster.iter().position(|person| person.id == id)
    }

    /// Checks the problem for malformed input.
    ///
    /// # Errors
    /// - If an identity appears twice in the roster.
    /// - If a working range is empty.
    /// - If a fixed pair names an unknown person or the same person twice.
    /// - If the settings are invalid.
    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;

        let mut seen = HashSet::with_capacity(self.roster.len());
        for person in &self.roster {
            if !seen.insert(person.id.as_str()) {
                return Err(Error::DuplicatePerson(person.id.clone()));
            }
        }

        if let Some(range) = self.working.iter().find(|range| range.is_empty()) {
            return Err(Error::EmptyWorkingRange {
                start: range.start.to_string(),
                end: range.end.to_string(),
            });
        }

        for [first, second] in &self.pairs {
            if first == second {
                return Err(Error::DuplicateMember(first.clone()));
            }

            for id in [first, second] {
                if !seen.contains(id.as_str()) {
                    return Err(Error::UnknownPerson(id.clone()));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::time::test::range;

    fn problem() -> Problem {
        Problem::new(
            vec![
                Person::new("a@x", true).with_skills(["rust"]),
                Person::new("b@x", false).with_cap(1),
            ],
            vec![range(8, (9, 0), (17, 0))],
            vec![BusyTime::new("a@x", range(8, (9, 0), (10, 0)))],
            1,
            2,
        )
    }

    #[test]
    fn problem_should_serialize() -> anyhow::Result<()> {
        let problem = problem().with_pairs(vec![["a@x".into(), "b@x".into()]]);

        let serialized = crate::data::to_string(&problem)?;
        let mut reader = std::io::Cursor::new(serialized);
        let deserialized: Problem = crate::data::deserialize(&mut reader)?;

        assert_eq!(problem, deserialized);

        Ok(())
    }

    #[test]
    fn missing_fields_take_defaults() -> anyhow::Result<()> {
        let json = r#"{
            "roster": [{"id": "a@x"}],
            "working": [{"start": "2024-01-08T09:00:00", "end": "2024-01-08T11:00:00"}],
            "settings": {"session_minutes": 30}
        }"#;
        let problem: Problem = serde_json::from_str(json)?;

        assert_eq!(problem.target_coverage, 1);
        assert_eq!(problem.max_total_coverage, u32::MAX);
        assert!(problem.busy.is_empty());
        assert!(!problem.roster[0].experienced);
        assert_eq!(problem.settings.session_minutes, 30);
        assert_eq!(problem.settings.spacing_minutes, 60);

        Ok(())
    }

    #[test]
    fn effective_cap_falls_back_to_default() {
        let settings = Settings::default();
        assert_eq!(Person::new("a", true).effective_cap(&settings), 2);
        assert_eq!(Person::new("a", true).with_cap(5).effective_cap(&settings), 5);
        assert_eq!(Person::new("a", true).with_cap(0).effective_cap(&settings), 0);
    }

    #[test]
    fn empty_skills_are_a_wildcard() {
        let rust = Person::new("a", true).with_skills(["rust"]);
        let go = Person::new("b", true).with_skills(["go"]);
        let both = Person::new("c", true).with_skills(["go", "rust"]);
        let none = Person::new("d", true);

        assert!(!rust.shares_skill(&go));
        assert!(rust.shares_skill(&both));
        assert!(go.shares_skill(&both));
        assert!(rust.shares_skill(&none));
        assert!(none.shares_skill(&go));
    }

    #[test]
    fn settings_near_midnight_are_rejected() {
        let at = |hour, minute| NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
        let rejected = |settings: Settings| match settings.validate() {
            Err(Error::InvalidSetting { name, .. }) => Some(name),
            _ => None,
        };

        let early_day = Settings {
            day_start: at(0, 0),
            day_end: at(0, 30),
            lunch_start: at(12, 0),
            lunch_end: at(13, 0),
            ..Settings::default()
        };
        assert_eq!(rejected(early_day), Some("day_end"));

        let early_lunch = Settings {
            day_start: at(0, 0),
            lunch_start: at(0, 30),
            lunch_end: at(1, 0),
            ..Settings::default()
        };
        assert_eq!(rejected(early_lunch), Some("lunch_start"));

        let late_lunch = Settings {
            day_end: at(23, 59),
            lunch_start: at(23, 0),
            lunch_end: at(23, 45),
            ..Settings::default()
        };
        assert_eq!(rejected(late_lunch), Some("lunch_end"));

        let edge = Settings {
            day_start: at(0, 0),
            day_end: at(1, 0),
            lunch_start: at(1, 0),
            lunch_end: at(23, 29),
            ..Settings::default()
        };
        assert_eq!(edge.validate(), Ok(()));
    }

    #[test]
    fn validation_rejects_malformed_input() {
        assert_eq!(problem().validate(), Ok(()));

        let mut duplicate = problem();
        duplicate.roster.push(Person::new("a@x", false));
        assert_eq!(
            duplicate.validate(),
            Err(Error::DuplicatePerson("a@x".into()))
        );

        let same = problem().with_pairs(vec![["a@x".into(), "a@x".into()]]);
        assert_eq!(same.validate(), Err(Error::DuplicateMember("a@x".into())));

        let unknown = problem().with_pairs(vec![["a@x".into(), "z@x".into()]]);
        assert_eq!(unknown.validate(), Err(Error::UnknownPerson("z@x".into())));

        let mut empty = problem();
        empty.working.push(range(9, (10, 0), (10, 0)));
        assert!(matches!(
            empty.validate(),
            Err(Error::EmptyWorkingRange { .. })
        ));

        let settings = Settings {
            session_minutes: 0,
            ..Settings::default()
        };
        assert!(matches!(
            problem().with_settings(settings).validate(),
            Err(Error::InvalidSetting { name: "session_minutes", .. })
        ));
    }
}
