#![deny(clippy::all, clippy::cargo, clippy::expect_used, clippy::unwrap_used)]
#![deny(clippy::pedantic, clippy::nursery, unsafe_code)]
#![warn(clippy::unimplemented, clippy::redundant_type_annotations)]

use anyhow::Result;
use std::io::BufRead;

pub mod algo;
pub mod core;
pub mod data;
pub mod logger;

/// Runs the given scheduler on the problem read from reader and writes the plan to stdout.
/// Also writes the missing coverage to stdout.
/// Settings found in the problem are replaced by the output of `configure`.
///
/// # Errors
/// - If the problem could not be read from the reader.
/// - If the problem is malformed.
/// - If the plan could not be written to stdout.
///
/// # Panics
///  - If the plan is invalid in debug mode.
pub fn run_reader(
    scheduler: &mut dyn core::Scheduler,
    reader: &mut impl BufRead,
    configure: impl FnOnce(&mut core::Settings),
    token: &core::CancellationToken,
) -> Result<()> {
    let mut problem: core::Problem = data::deserialize(reader)?;
    configure(&mut problem.settings);

    let plan = scheduler.schedule(&problem, token)?;

    debug_assert!(plan.solution.verify(), "Plan is invalid: {plan:?}");

    println!("{}", data::to_string(&plan)?);
    println!("{}", plan.coverage.missing);

    Ok(())
}

#[cfg(not(target_pointer_width = "64"))]
compile_error!("Must be 64-bit system!");

/// Casts the given value to `u64`.
/// It should never fail on 64-bit systems.
///
/// # Panics
/// - If the value cannot be cast to `u64`.
#[must_use]
pub fn cast_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or_else(|_| unreachable!("Must be 64-bit system!"))
}
