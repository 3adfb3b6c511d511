mod branch_bound;
mod preference;

use crate::core::Scheduler;

pub use branch_bound::{branch_and_bound, BranchAndBound};
pub use preference::*;

/// Constructors of every available scheduler.
#[allow(unsafe_code)]
#[linkme::distributed_slice]
pub static SCHEDULERS: [fn() -> Box<dyn Scheduler>];
