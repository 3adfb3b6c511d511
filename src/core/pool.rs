use super::{generate_sessions, generate_slots, generate_squads};
use super::{Person, Problem, Result, Session, Settings, Squad, TimeRange};
use log::info;
use rand::Rng;

/// Read-only option set of one run: squads, slots and the sessions built from them.
#[derive(Clone, Debug)]
pub struct Pool<'a> {
    pub problem: &'a Problem,
    pub squads: Vec<Squad>,
    pub slots: Vec<TimeRange>,
    pub sessions: Vec<Session>,
}

impl<'a> Pool<'a> {
    /// Validates the problem and generates every squad, slot and session of it.
    ///
    /// # Errors
    /// - If the problem is malformed.
    pub fn build(problem: &'a Problem, rng: &mut impl Rng) -> Result<Self> {
        problem.validate()?;

        let squads = generate_squads(problem, rng)?;
        let slots = generate_slots(&problem.working, problem.settings.session_duration(), rng);
        let sessions = generate_sessions(&squads, &slots);

        info!(
            "Pool built: {} people, {} squads, {} slots, {} sessions",
            problem.roster.len(),
            squads.len(),
            slots.len(),
            sessions.len()
        );

        Ok(Self {
            problem,
            squads,
            slots,
            sessions,
        })
    }

    /// Returns the settings of the run.
    #[must_use]
    pub fn settings(&self) -> &'a Settings {
        &self.problem.settings
    }

    /// Returns the squad holding the session.
    #[must_use]
    pub fn squad(&self, session: &Session) -> &Squad {
        &self.squads[session.squad]
    }

    /// Returns the two people of the session.
    #[must_use]
    pub fn members(&self, session: &Session) -> [&'a Person; 2] {
        let problem = self.problem;
        self.squad(session)
            .members()
            .map(|person| &problem.roster[person])
    }
}
