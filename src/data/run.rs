use crate::core::{CancellationToken, Problem, Scheduler};
use crate::data::deserialize;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Report of running a directory of samples.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    scheduler: String,
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Create a new report.
    fn new(scheduler: String) -> Self {
        let entries = Vec::new();
        Self { scheduler, entries }
    }

    /// Get the scheduler name.
    #[must_use]
    pub fn scheduler_name(&self) -> &str {
        &self.scheduler
    }

    /// Get the entries.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Scheduler: {}", self.scheduler)?;
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        writeln!(f, "-------------------")
    }
}

/// Report of running a single sample.
#[non_exhaustive]
#[derive(Debug, Deserialize, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub sessions: usize,
    pub missing: u64,
    pub worst: u64,
    pub unmatched: usize,
    pub time: f64,
}

impl Display for ReportEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "{}: {} sessions, missing {}/{}, {} unmatched in {:.2} sec",
            self.name, self.sessions, self.missing, self.worst, self.unmatched, self.time
        )
    }
}

/// Run all samples in the `samples` directory.
/// Print the report to stdout.
///
/// # Errors
/// - If a file cannot be read.
/// - If no samples are found.
///
/// # Panics
/// - If the plan is invalid.
pub fn samples(solver: &mut dyn Scheduler) -> anyhow::Result<()> {
    run("samples", solver).and_then(|report| {
        if report.entries.is_empty() {
            Err(anyhow!("No samples found"))
        } else {
            println!("{report}");
            Ok(())
        }
    })
}

/// Run all `.json` problems in the `dir` directory, in file name order.
///
/// # Errors
/// - If a file cannot be read or parsed.
/// - If a problem is malformed.
///
/// # Panics
/// - If the plan is invalid.
pub fn run(dir: impl AsRef<Path>, solver: &mut dyn Scheduler) -> anyhow::Result<Report> {
    let mut report = Report::new(solver.name().into());

    let mut files = Vec::new();
    for file in std::fs::read_dir(dir)? {
        let path = file?.path();
        if path.extension().is_some_and(|extension| extension == "json") {
            files.push(path);
        }
    }
    files.sort();

    for path in files {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("Cannot read filename"))?
            .to_owned();

        let problem: Problem = deserialize(&mut BufReader::new(File::open(&path)?))?;

        let time = std::time::Instant::now();
        let plan = solver.schedule(&problem, &CancellationToken::new())?;
        let time = time.elapsed().as_secs_f64();

        assert!(plan.solution.verify(), "Invalid plan created");
        assert!(plan.coverage.missing <= plan.coverage.worst, "Invalid coverage {name}");

        report.entries.push(ReportEntry {
            name,
            sessions: plan.solution.len(),
            missing: plan.coverage.missing,
            worst: plan.coverage.worst,
            unmatched: plan.unmatched.len(),
            time,
        });
    }

    Ok(report)
}
