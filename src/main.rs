use chrono::{Datelike, Duration, NaiveDate, Weekday};
use clap::{Args, Parser, ValueEnum};
use rand::prelude::*;
use squad_scheduling::core::{
    BusyTime, CancellationToken, Pair, Person, Problem, Scheduler, Settings, TimeRange,
};
use squad_scheduling::{algo, data, logger, run_reader};
use std::io::Write;
use std::num::NonZero;

#[derive(Copy, Clone, Debug)]
struct Algorithm(usize, &'static str);

impl From<Algorithm> for Box<dyn Scheduler> {
    fn from(value: Algorithm) -> Box<dyn Scheduler> {
        algo::SCHEDULERS[value.0]()
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.1)
    }
}

impl ValueEnum for Algorithm {
    fn value_variants<'a>() -> &'a [Self] {
        static ALGORITHMS: std::sync::LazyLock<Vec<Algorithm>> = std::sync::LazyLock::new(|| {
            let iter = algo::SCHEDULERS.iter().enumerate();
            iter.map(|(i, init)| Algorithm(i, init().name())).collect()
        });

        ALGORITHMS.as_slice()
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.1))
    }
}

/// Settings that override the ones found in the problem.
#[derive(Debug, Args)]
struct Overrides {
    /// Session length in minutes.
    #[clap(long)]
    session_minutes: Option<u32>,
    /// Minimum spacing between two sessions of one person, in minutes.
    #[clap(long)]
    spacing_minutes: Option<u32>,
    /// Weekly cap of people without an explicit one.
    #[clap(long)]
    default_max_sessions: Option<u32>,
    /// Number of children explored per search node.
    #[clap(long)]
    branch_width: Option<usize>,
    /// Depth after which only the best child is explored.
    #[clap(long)]
    depth_limit: Option<usize>,
}

impl Overrides {
    fn apply(&self, settings: &mut Settings) {
        if let Some(value) = self.session_minutes {
            settings.session_minutes = value;
        }
        if let Some(value) = self.spacing_minutes {
            settings.spacing_minutes = value;
        }
        if let Some(value) = self.default_max_sessions {
            settings.default_max_sessions = value;
        }
        if let Some(value) = self.branch_width {
            settings.branch_width = value;
        }
        if let Some(value) = self.depth_limit {
            settings.depth_limit = value;
        }
    }
}

/// Application assigning reviewer squads to working-time sessions.
#[derive(Debug, Parser)]
enum Application {
    /// Run one of the implemented algorithms on a problem read from stdin.
    Run {
        algorithm: Algorithm,
        /// Seed of the tie-breaking shuffles.
        #[clap(short, long)]
        seed: Option<u64>,
        /// Stop the search after this many seconds and print the best plan so far.
        #[clap(short, long)]
        time_limit: Option<f64>,
        #[clap(flatten)]
        overrides: Overrides,
    },
    /// Run benchmarks on a directory of problems.
    Bench {
        /// The input directory.
        input: String,
        /// Exclude scheduling algorithms.
        #[clap(short, long, value_delimiter = ',')]
        exclude: Vec<Algorithm>,
    },
    /// Generate random problems.
    Gen {
        /// The number of people.
        people: NonZero<usize>,
        /// The number of working days.
        days: NonZero<usize>,
        /// Share of experienced people.
        #[clap(short, long, default_value = "0.3")]
        experienced_ratio: f64,
        /// Chance of a person being busy in any given hour.
        #[clap(short, long, default_value = "0.2")]
        busy_ratio: f64,
        /// First day of the planning period. Weekends are skipped.
        #[clap(long, default_value = "2024-01-08")]
        start: NaiveDate,
        /// Number of problems to generate.
        #[clap(short, long, default_value = "1")]
        amount: NonZero<u64>,
        /// Path to output the generated problems. If the directory does not exist, it will be created.
        #[clap(short, long, default_value = "output")]
        output: String,
    },
}

fn schedulers(exclude: &[Algorithm]) -> impl Iterator<Item = Box<dyn Scheduler>> + '_ {
    let iter = algo::SCHEDULERS.iter().map(|init| init());
    iter.filter(|scheduler| !exclude.iter().any(|name| name.1 == scheduler.name()))
}

/// Cancels the token once the limit elapses.
fn start_watchdog(token: &CancellationToken, seconds: f64) {
    let token = token.clone();
    let limit = std::time::Duration::from_secs_f64(seconds.max(0.0));
    std::thread::spawn(move || {
        std::thread::sleep(limit);
        log::warn!("Time limit of {seconds} s reached, stopping the search");
        token.cancel();
    });
}

fn working_days(start: NaiveDate, days: usize) -> Vec<NaiveDate> {
    start
        .iter_days()
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .take(days)
        .collect()
}

fn gen_roster(people: usize, experienced_ratio: f64, rng: &mut impl Rng) -> Vec<Person> {
    (0..people)
        .map(|i| {
            let experienced = rng.gen_bool(experienced_ratio.clamp(0.0, 1.0));
            Person::new(format!("person{i}@example.com"), experienced)
        })
        .collect()
}

fn gen_working(days: &[NaiveDate]) -> Vec<TimeRange> {
    let mut working = Vec::with_capacity(days.len() * 2);
    for day in days {
        let at = |hour| day.and_time(chrono::NaiveTime::MIN) + Duration::hours(hour);
        working.push(TimeRange::new(at(9), at(12)));
        working.push(TimeRange::new(at(13), at(17)));
    }
    working
}

fn gen_busy(roster: &[Person], days: &[NaiveDate], ratio: f64, rng: &mut impl Rng) -> Vec<BusyTime> {
    let mut busy = Vec::new();
    for person in roster {
        for day in days {
            for hour in 9..17 {
                if rng.gen_bool(ratio.clamp(0.0, 1.0)) {
                    let start = day.and_time(chrono::NaiveTime::MIN) + Duration::hours(hour);
                    let range = TimeRange::new(start, start + Duration::hours(1));
                    busy.push(BusyTime::new(person.id.clone(), range));
                }
            }
        }
    }
    busy
}

fn gen_pairs(roster: &[Person], rng: &mut impl Rng) -> Vec<Pair> {
    let experienced: Vec<_> = roster.iter().filter(|person| person.experienced).collect();
    roster
        .iter()
        .filter(|person| !person.experienced)
        .filter_map(|person| {
            let lead = experienced.choose(&mut *rng)?;
            Some([lead.id.clone(), person.id.clone()])
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    logger::init()?;

    match Application::parse() {
        Application::Run {
            algorithm,
            seed,
            time_limit,
            overrides,
        } => {
            let mut scheduler = Box::<dyn Scheduler>::from(algorithm);
            if let Some(seed) = seed {
                scheduler.reseed(seed);
            }

            let token = CancellationToken::new();
            if let Some(seconds) = time_limit {
                start_watchdog(&token, seconds);
            }

            run_reader(
                scheduler.as_mut(),
                &mut std::io::stdin().lock(),
                |settings| overrides.apply(settings),
                &token,
            )
        }
        Application::Bench { input, exclude } => {
            for mut scheduler in schedulers(&exclude) {
                println!("{}", data::run(&input, scheduler.as_mut())?);
            }
            Ok(())
        }
        Application::Gen {
            people,
            days,
            experienced_ratio,
            busy_ratio,
            start,
            amount,
            output,
        } => {
            let mut rng = thread_rng();
            let days = working_days(start, days.get());

            let output = std::path::Path::new(&output);
            if !output.try_exists()? {
                std::fs::create_dir_all(output)?;
            }

            for i in 0..amount.get() {
                let roster = gen_roster(people.get(), experienced_ratio, &mut rng);
                let busy = gen_busy(&roster, &days, busy_ratio, &mut rng);
                let pairs = gen_pairs(&roster, &mut rng);
                let problem = Problem::new(roster, gen_working(&days), busy, 1, 2).with_pairs(pairs);

                let filename = format!("{}_{}_{i}.json", people, days.len());
                std::fs::File::create(output.join(filename))?
                    .write_all(data::to_string(&problem)?.as_bytes())?;
            }
            Ok(())
        }
    }
}
