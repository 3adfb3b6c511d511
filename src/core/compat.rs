use super::{Pool, Session};
use ahash::{HashMap, HashMapExt};

/// Number of accepted sessions per person, keyed by roster index.
pub type Tally = HashMap<usize, u32>;

/// Counts the sessions of every person in the accepted set.
#[must_use]
pub fn tally(pool: &Pool, accepted: &[&Session]) -> Tally {
    let mut tally = Tally::with_capacity(accepted.len() * 2);

    for session in accepted {
        for person in pool.squad(session).members() {
            *tally.entry(person).or_default() += 1;
        }
    }

    tally
}

/// Returns whether the candidate can be added to the accepted set.
/// The tally is computed from `accepted` on every call.
#[must_use]
pub fn is_compatible(pool: &Pool, candidate: &Session, accepted: &[&Session]) -> bool {
    is_compatible_with(pool, candidate, accepted, &tally(pool, accepted))
}

/// Same as [`is_compatible`], with the tally of `accepted` supplied by the caller.
/// The tally must have been computed from the same accepted set.
#[must_use]
pub fn is_compatible_with(
    pool: &Pool,
    candidate: &Session,
    accepted: &[&Session],
    tally: &Tally,
) -> bool {
    let settings = pool.settings();
    let squad = pool.squad(candidate);
    let [first, second] = pool.members(candidate);

    if !first.shares_skill(second) {
        return false;
    }

    let caps = [first.effective_cap(settings), second.effective_cap(settings)];
    if caps == [0, 0] {
        return false;
    }

    let over_cap = squad
        .members()
        .into_iter()
        .zip(caps)
        .any(|(person, cap)| tally.get(&person).copied().unwrap_or_default() >= cap);
    if over_cap {
        return false;
    }

    // Only the candidate is padded.
    let padded = candidate.range.pad(settings.spacing());

    accepted.iter().all(|other| {
        other.id != candidate.id
            && other.squad != candidate.squad
            && !(squad.shares_member(pool.squad(other)) && padded.overlaps(&other.range))
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::time::test::range;
    use crate::core::{Person, Problem, Squad, TimeRange};

    /// Pool with hand-made squads `(e0, s0)`, `(e0, s1)`, `(e1, s1)`, `(e1, s2)` and `(e0, s2)`.
    fn pool(problem: &Problem) -> Pool {
        let pairs = [(0, 2), (0, 3), (1, 3), (1, 4), (0, 4)];
        let squads = pairs
            .iter()
            .enumerate()
            .map(|(id, &(first, second))| Squad::new(problem, id, first, second))
            .collect::<crate::core::Result<Vec<_>>>()
            .unwrap_or_else(|_| unreachable!("Squads are valid"));

        Pool {
            problem,
            squads,
            slots: Vec::new(),
            sessions: Vec::new(),
        }
    }

    fn problem(roster: Vec<Person>) -> Problem {
        Problem::new(roster, vec![range(8, (9, 0), (17, 0))], Vec::new(), 1, 2)
    }

    fn roster() -> Vec<Person> {
        vec![
            Person::new("e0", true),
            Person::new("e1", true),
            Person::new("s0", false),
            Person::new("s1", false),
            Person::new("s2", false),
        ]
    }

    const fn session(id: usize, squad: usize, range: TimeRange) -> Session {
        Session { id, squad, range }
    }

    #[test]
    fn empty_schedule_accepts_anything() {
        let problem = problem(roster());
        let pool = pool(&problem);
        assert!(is_compatible(&pool, &session(0, 0, range(8, (9, 0), (10, 0))), &[]));
    }

    #[test]
    fn same_session_is_rejected() {
        let problem = problem(roster());
        let pool = pool(&problem);
        let accepted = session(0, 0, range(8, (9, 0), (10, 0)));

        assert!(!is_compatible(&pool, &accepted, &[&accepted]));
    }

    #[test]
    fn same_squad_is_rejected() {
        let problem = problem(roster());
        let pool = pool(&problem);
        let accepted = session(0, 0, range(8, (9, 0), (10, 0)));
        let candidate = session(1, 0, range(8, (15, 0), (16, 0)));

        assert!(!is_compatible(&pool, &candidate, &[&accepted]));
    }

    #[test]
    fn shared_member_needs_spacing() {
        let problem = problem(roster());
        let pool = pool(&problem);
        let accepted = session(0, 0, range(8, (9, 0), (10, 0)));

        let adjacent = session(1, 1, range(8, (10, 0), (11, 0)));
        let spaced = session(2, 1, range(8, (11, 0), (12, 0)));
        let within = session(3, 1, range(8, (10, 30), (11, 30)));

        assert!(!is_compatible(&pool, &adjacent, &[&accepted]));
        assert!(!is_compatible(&pool, &within, &[&accepted]));
        assert!(is_compatible(&pool, &spaced, &[&accepted]));
    }

    #[test]
    fn disjoint_squads_may_overlap_in_time() {
        let problem = problem(roster());
        let pool = pool(&problem);
        let accepted = session(0, 0, range(8, (9, 0), (10, 0)));
        let candidate = session(1, 2, range(8, (9, 0), (10, 0)));

        assert!(is_compatible(&pool, &candidate, &[&accepted]));
    }

    #[test]
    fn disjoint_skills_are_rejected() {
        let mut roster = roster();
        roster[0] = Person::new("e0", true).with_skills(["rust"]);
        roster[2] = Person::new("s0", false).with_skills(["go"]);
        roster[3] = Person::new("s1", false).with_skills(["go", "rust"]);
        let problem = problem(roster);
        let pool = pool(&problem);

        assert!(!is_compatible(&pool, &session(0, 0, range(8, (9, 0), (10, 0))), &[]));
        assert!(is_compatible(&pool, &session(1, 1, range(8, (9, 0), (10, 0))), &[]));
    }

    #[test]
    fn empty_skills_match_anyone() {
        let mut roster = roster();
        roster[0] = Person::new("e0", true).with_skills(["rust", "sql"]);
        let problem = problem(roster);
        let pool = pool(&problem);

        assert!(is_compatible(&pool, &session(0, 0, range(8, (9, 0), (10, 0))), &[]));
    }

    #[test]
    fn weekly_cap_is_respected() {
        let mut roster = roster();
        roster[0] = Person::new("e0", true).with_cap(1);
        let problem = problem(roster);
        let pool = pool(&problem);
        let accepted = session(0, 0, range(8, (9, 0), (10, 0)));
        let candidate = session(1, 1, range(8, (14, 0), (15, 0)));

        assert!(is_compatible(&pool, &candidate, &[]));
        assert!(!is_compatible(&pool, &candidate, &[&accepted]));
    }

    #[test]
    fn default_cap_applies_without_explicit_cap() {
        let problem = problem(roster());
        let pool = pool(&problem);
        let first = session(0, 0, range(8, (9, 0), (10, 0)));
        let second = session(1, 1, range(8, (12, 0), (13, 0)));
        let third = session(2, 0, range(8, (15, 0), (16, 0)));
        let fourth = session(3, 4, range(8, (15, 0), (16, 0)));

        assert!(is_compatible(&pool, &second, &[&first]));
        assert!(is_compatible(&pool, &fourth, &[&first]));
        assert!(!is_compatible(&pool, &third, &[&first, &second]));
        assert!(!is_compatible(&pool, &fourth, &[&first, &second]));
    }

    #[test]
    fn zero_caps_on_both_sides_are_rejected() {
        let mut roster = roster();
        roster[1] = Person::new("e1", true).with_cap(0);
        roster[3] = Person::new("s1", false).with_cap(0);
        let problem = problem(roster);
        let pool = pool(&problem);

        assert!(!is_compatible(&pool, &session(0, 2, range(8, (9, 0), (10, 0))), &[]));
    }

    #[test]
    fn tally_counts_both_members() {
        let problem = problem(roster());
        let pool = pool(&problem);
        let first = session(0, 0, range(8, (9, 0), (10, 0)));
        let second = session(1, 1, range(8, (12, 0), (13, 0)));

        let tally = tally(&pool, &[&first, &second]);

        assert_eq!(tally.get(&0), Some(&2));
        assert_eq!(tally.get(&2), Some(&1));
        assert_eq!(tally.get(&3), Some(&1));
        assert_eq!(tally.get(&1), None);
    }
}
