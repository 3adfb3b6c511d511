use crate::core::{is_compatible_with, tally, CancellationToken, Coverage, CoverageLayout};
use crate::core::{Plan, Pool, Problem, Result, Scheduler, Session, Solution};
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Compatible extension of a node together with its coverage.
struct Child<'p> {
    session: &'p Session,
    coverage: Coverage,
    missing: u64,
}

struct Search<'p, 'a, 'r> {
    pool: &'p Pool<'a>,
    layout: &'r CoverageLayout,
    token: &'r CancellationToken,
    best: Vec<&'p Session>,
    best_missing: u64,
    nodes: u64,
}

impl<'p, 'a, 'r> Search<'p, 'a, 'r> {
    fn new(pool: &'p Pool<'a>, layout: &'r CoverageLayout, token: &'r CancellationToken) -> Self {
        Self {
            pool,
            layout,
            token,
            best: Vec::new(),
            best_missing: layout.worst(),
            nodes: 0,
        }
    }

    /// Collects every compatible session that keeps coverage under the ceiling,
    /// best first. Returns `None` when cancelled during the scan.
    fn children(&self, accepted: &[&'p Session], coverage: &Coverage) -> Option<Vec<Child<'p>>> {
        let pool = self.pool;
        let ceiling = pool.problem.max_total_coverage;
        let tally = tally(pool, accepted);
        let mut children = Vec::new();

        for session in &pool.sessions {
            if self.token.is_cancelled() {
                return None;
            }

            if !is_compatible_with(pool, session, accepted, &tally) {
                continue;
            }

            let coverage = coverage.with(self.layout, &session.range);
            if coverage.max() > ceiling {
                continue;
            }

            let missing = self.layout.missing(&coverage);
            children.push(Child {
                session,
                coverage,
                missing,
            });
        }

        children.sort_by_key(|child| child.missing);

        Some(children)
    }

    fn explore(&mut self, accepted: &[&'p Session], coverage: &Coverage, path: &str) {
        self.nodes += 1;

        let Some(children) = self.children(accepted, coverage) else {
            return;
        };

        let Some(first) = children.first() else {
            trace!("Leaf {path} with {} sessions", accepted.len());
            return;
        };

        if first.missing <= self.best_missing {
            self.best_missing = first.missing;
            self.best = accepted.iter().copied().chain([first.session]).collect();
            debug!(
                "New best at {path}: {} sessions, missing coverage {}",
                self.best.len(),
                self.best_missing
            );
        }

        let settings = self.pool.settings();

        for (i, child) in children.iter().take(settings.branch_width).enumerate() {
            if self.token.is_cancelled() {
                return;
            }

            // Past the depth limit only the best child is followed.
            if i > 0 && accepted.len() > settings.depth_limit {
                break;
            }

            let mut derived = Vec::with_capacity(accepted.len() + 1);
            derived.extend_from_slice(accepted);
            derived.push(child.session);

            self.explore(&derived, &child.coverage, &format!("{path}.{i}"));
        }
    }
}

/// Bounded branch-and-bound over the session pool minimizing missing coverage.
/// Returns the best accepted sessions and their missing coverage.
/// A cancelled search returns the best result found so far.
#[must_use]
pub fn branch_and_bound<'p>(
    pool: &'p Pool,
    layout: &CoverageLayout,
    token: &CancellationToken,
) -> (Vec<&'p Session>, u64) {
    let mut search = Search::new(pool, layout, token);
    search.explore(&[], &layout.empty(), "root");

    if token.is_cancelled() {
        info!("Search cancelled after {} nodes", search.nodes);
    } else {
        debug!("Search finished after {} nodes", search.nodes);
    }

    (search.best, search.best_missing)
}

/// Schedules the whole roster, maximizing coverage of the working time.
#[derive(Clone, Debug)]
pub struct BranchAndBound {
    rng: StdRng,
}

impl BranchAndBound {
    /// Creates a new instance of `BranchAndBound`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for BranchAndBound {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Scheduler for BranchAndBound {
    fn schedule(&mut self, problem: &Problem, token: &CancellationToken) -> Result<Plan> {
        let pool = Pool::build(problem, &mut self.rng)?;
        let layout = CoverageLayout::new(&problem.working, problem.target_coverage);

        let (best, missing) = branch_and_bound(&pool, &layout, token);

        let coverage = layout.measure(best.iter().map(|session| &session.range));
        let summary = layout.summary(&coverage);
        debug_assert_eq!(summary.missing, missing);

        info!(
            "Scheduled {} sessions, missing coverage {} of {}, max coverage {}",
            best.len(),
            summary.missing,
            summary.worst,
            summary.max
        );

        Ok(Plan::new(Solution::new(&pool, &best), summary))
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn name(&self) -> &'static str {
        "BranchAndBound"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SCHEDULERS)]
static INSTANCE: fn() -> Box<dyn Scheduler> = || Box::new(BranchAndBound::default());
