use super::{merge_ranges, Error, Problem, Result, TimeRange};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

/// Two distinct people who may hold a session together.
/// Members are indices into the roster of the problem.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Squad {
    pub id: usize,
    members: [usize; 2],
    busy: Vec<TimeRange>,
}

impl Squad {
    /// Creates a squad and merges the busy ranges of both members.
    ///
    /// # Errors
    /// - If a member is not in the roster.
    /// - If both members are the same person.
    pub fn new(problem: &Problem, id: usize, first: usize, second: usize) -> Result<Self> {
        let person = |index: usize| problem.roster.get(index).ok_or(Error::UnknownIndex(index));
        let first_id = person(first)?.id.as_str();
        let second_id = person(second)?.id.as_str();

        if first == second {
            return Err(Error::DuplicateMember(first_id.to_owned()));
        }

        let busy = problem
            .busy
            .iter()
            .filter(|busy| busy.person == first_id || busy.person == second_id)
            .map(|busy| busy.range)
            .collect();

        Ok(Self {
            id,
            members: [first, second],
            busy: merge_ranges(busy),
        })
    }

    /// Returns the roster indices of both members.
    #[must_use]
    pub const fn members(&self) -> [usize; 2] {
        self.members
    }

    /// Returns whether the given person is a member.
    #[must_use]
    pub fn contains(&self, person: usize) -> bool {
        self.members.contains(&person)
    }

    /// Returns whether the squad shares a member with the other one.
    #[must_use]
    pub fn shares_member(&self, other: &Self) -> bool {
        self.members.iter().any(|&person| other.contains(person))
    }

    /// Returns the merged busy ranges of both members, sorted by start.
    #[must_use]
    pub fn busy(&self) -> &[TimeRange] {
        &self.busy
    }

    /// Returns whether both members are free during the whole range.
    #[must_use]
    pub fn is_free(&self, range: &TimeRange) -> bool {
        !self.busy.iter().any(|busy| busy.overlaps(range))
    }
}

/// Builds every eligible squad of the roster.
/// Experienced people pair with everyone, standard people only with experienced ones.
/// People whose weekly cap resolves to zero are left out.
/// The squads are shuffled, ids follow the shuffled order.
///
/// # Errors
/// - If a generated squad does not consist of two distinct people.
pub fn generate_squads(problem: &Problem, rng: &mut impl Rng) -> Result<Vec<Squad>> {
    let eligible = |&(_, person): &(usize, &super::Person)| {
        person.effective_cap(&problem.settings) > 0
    };

    let (experienced, standard): (Vec<_>, Vec<_>) = problem
        .roster
        .iter()
        .enumerate()
        .filter(eligible)
        .partition(|(_, person)| person.experienced);

    let mut pairs = Vec::with_capacity(
        experienced.len() * standard.len() + experienced.len() * experienced.len() / 2,
    );

    for &(first, _) in &experienced {
        for &(second, _) in &standard {
            pairs.push((first, second));
        }
    }

    for (i, &(first, _)) in experienced.iter().enumerate() {
        for &(second, _) in &experienced[i + 1..] {
            pairs.push((first, second));
        }
    }

    pairs.shuffle(rng);

    let squads = pairs
        .into_iter()
        .enumerate()
        .map(|(id, (first, second))| Squad::new(problem, id, first, second))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Generated {} squads from {} experienced and {} standard people",
        squads.len(),
        experienced.len(),
        standard.len()
    );

    Ok(squads)
}
