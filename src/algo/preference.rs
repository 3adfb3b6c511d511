use crate::core::{generate_slots, CancellationToken, CoverageLayout, Pair, Plan, Pool, Problem};
use crate::core::{Error, Result, Scheduler, Session, Settings, Solution, Squad, TimeRange};
use chrono::{Datelike, Duration, NaiveTime, Weekday};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Score of a start in the last hour of the working day.
pub const LAST_HOUR_SCORE: i32 = -50;
/// Score of a start in the short windows right before and right after lunch.
pub const LUNCH_WINDOW_SCORE: i32 = 20;
/// Score of any other start inside working hours.
pub const IN_HOURS_SCORE: i32 = 5;
/// Score of Mondays and Fridays.
pub const EDGE_DAY_SCORE: i32 = -10;
/// Score of Tuesdays to Thursdays.
pub const CORE_DAY_SCORE: i32 = 10;
/// Extra score of Wednesdays.
pub const MIDWEEK_SCORE: i32 = 5;

fn within(time: NaiveTime, from: NaiveTime, to: NaiveTime) -> bool {
    from <= time && time <= to
}

/// Scores the clock time a session starts at.
#[must_use]
pub fn time_of_day_score(start: NaiveTime, settings: &Settings) -> i32 {
    let hour = Duration::hours(1);
    let half = Duration::minutes(30);

    let in_hours = settings.day_start <= start && start < settings.day_end;
    let pre_lunch = within(start, settings.lunch_start - hour, settings.lunch_start - half);
    let post_lunch = within(start, settings.lunch_end, settings.lunch_end + half);

    if in_hours && start >= settings.day_end - hour {
        LAST_HOUR_SCORE
    } else if pre_lunch || post_lunch {
        LUNCH_WINDOW_SCORE
    } else if in_hours {
        IN_HOURS_SCORE
    } else {
        0
    }
}

/// Scores the day of the week a session is held on.
#[must_use]
pub const fn day_of_week_score(day: Weekday) -> i32 {
    match day {
        Weekday::Mon | Weekday::Fri => EDGE_DAY_SCORE,
        Weekday::Tue | Weekday::Thu => CORE_DAY_SCORE,
        Weekday::Wed => CORE_DAY_SCORE + MIDWEEK_SCORE,
        Weekday::Sat | Weekday::Sun => 0,
    }
}

/// Scores a candidate range by its start.
#[must_use]
pub fn score(range: &TimeRange, settings: &Settings) -> i32 {
    time_of_day_score(range.start.time(), settings) + day_of_week_score(range.start.weekday())
}

/// Picks the highest scoring slot the squad is free for.
/// The first slot wins ties. Returns `None` when no slot is free.
#[must_use]
pub fn best_slot(squad: &Squad, slots: &[TimeRange], settings: &Settings) -> Option<(TimeRange, i32)> {
    let mut best: Option<(TimeRange, i32)> = None;

    for slot in slots.iter().filter(|slot| squad.is_free(slot)) {
        let score = score(slot, settings);
        if best.map_or(true, |(_, best)| score > best) {
            best = Some((*slot, score));
        }
    }

    best
}

/// Finds the single best slot for each fixed pair of the problem.
/// Pairs are handled independently of each other.
#[derive(Clone, Debug)]
pub struct Preference {
    rng: StdRng,
}

impl Preference {
    /// Creates a new instance of `Preference`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for Preference {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Scheduler for Preference {
    fn schedule(&mut self, problem: &Problem, token: &CancellationToken) -> Result<Plan> {
        problem.validate()?;

        let settings = &problem.settings;
        let slots = generate_slots(&problem.working, settings.session_duration(), &mut self.rng);

        let mut squads = Vec::with_capacity(problem.pairs.len());
        let mut sessions = Vec::with_capacity(problem.pairs.len());
        let mut unmatched: Vec<Pair> = Vec::new();

        for pair in &problem.pairs {
            if token.is_cancelled() {
                unmatched.push(pair.clone());
                continue;
            }

            let index = |id: &String| {
                problem
                    .person_index(id)
                    .ok_or_else(|| Error::UnknownPerson(id.clone()))
            };
            let members = [index(&pair[0])?, index(&pair[1])?];

            let eligible = |person: usize| problem.roster[person].effective_cap(settings) > 0;
            if !members.into_iter().all(eligible) {
                warn!("Pair {} / {} has a member with no weekly capacity", pair[0], pair[1]);
                unmatched.push(pair.clone());
                continue;
            }

            let squad = Squad::new(problem, squads.len(), members[0], members[1])?;

            match best_slot(&squad, &slots, settings) {
                Some((range, score)) => {
                    debug!("Pair {} / {} gets {range:?} with score {score}", pair[0], pair[1]);
                    sessions.push(Session {
                        id: sessions.len(),
                        squad: squad.id,
                        range,
                    });
                }
                None => {
                    warn!("No free slot for pair {} / {}", pair[0], pair[1]);
                    unmatched.push(pair.clone());
                }
            }

            squads.push(squad);
        }

        let pool = Pool {
            problem,
            squads,
            slots,
            sessions,
        };
        let accepted: Vec<_> = pool.sessions.iter().collect();

        let layout = CoverageLayout::new(&problem.working, problem.target_coverage);
        let coverage = layout.measure(accepted.iter().map(|session| &session.range));

        info!(
            "Matched {} of {} pairs",
            accepted.len(),
            problem.pairs.len()
        );

        let plan = Plan::new(Solution::new(&pool, &accepted), layout.summary(&coverage));
        Ok(plan.with_unmatched(unmatched))
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn name(&self) -> &'static str {
        "Preference"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SCHEDULERS)]
static INSTANCE: fn() -> Box<dyn Scheduler> = || Box::new(Preference::default());
