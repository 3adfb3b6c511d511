mod cancel;
mod compat;
mod coverage;
mod error;
mod pool;
mod problem;
mod session;
mod slot;
mod solution;
mod squad;
pub(crate) mod time;

pub use cancel::*;
pub use compat::*;
pub use coverage::*;
pub use error::*;
pub use pool::*;
pub use problem::*;
pub use session::*;
pub use slot::*;
pub use solution::*;
pub use squad::*;
pub use time::{merge_ranges, BusyTime, TimeRange};

/// Assigns squads to sessions for a problem.
pub trait Scheduler {
    /// Schedules the given problem. The search stops early once the token is cancelled
    /// and returns the best plan found so far.
    ///
    /// # Errors
    /// - If the problem is malformed.
    fn schedule(&mut self, problem: &Problem, token: &CancellationToken) -> Result<Plan>;

    /// Replaces the random source used for tie-breaking.
    fn reseed(&mut self, _seed: u64) {}

    /// Returns the name of the scheduler.
    fn name(&self) -> &'static str;
}
