use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use lib::counter::AtomicCounter;
use lib::flag::VisibleFlag;
use lib::scenario::{self, CounterReport, HandoffReport};

fn make_cli() -> Command {
    Command::new("shared-state")
        .about("Demonstrates lost updates and stale reads on state shared between threads")
        .subcommand_required(true)
        .subcommand(
            Command::new("counter")
                .about("Several threads increment one shared counter")
                .arg(
                    Arg::new("threads")
                        .long("threads")
                        .value_parser(value_parser!(usize))
                        .default_value("2"),
                )
                .arg(
                    Arg::new("increments")
                        .long("increments")
                        .help("Increments issued by each thread")
                        .value_parser(value_parser!(u64))
                        .default_value("50000"),
                )
                .arg(
                    Arg::new("strategy")
                        .long("strategy")
                        .value_parser(counter_strategies())
                        .default_value("fetch-add"),
                ),
        )
        .subcommand(
            Command::new("flag")
                .about("One thread sets a flag that another thread is polling")
                .arg(
                    Arg::new("delay-ms")
                        .long("delay-ms")
                        .help("How long the writer sleeps before setting the flag")
                        .value_parser(value_parser!(u64))
                        .default_value("1000"),
                )
                .arg(
                    Arg::new("timeout-ms")
                        .long("timeout-ms")
                        .help("How long the reader waits before giving up")
                        .value_parser(value_parser!(u64))
                        .default_value("5000"),
                )
                .arg(
                    Arg::new("strategy")
                        .long("strategy")
                        .value_parser(["atomic", "lock", "notify"])
                        .default_value("atomic"),
                )
                .arg(
                    Arg::new("blocking")
                        .long("blocking")
                        .help("Park on a condition variable instead of spinning (notify only)")
                        .action(ArgAction::SetTrue),
                ),
        )
}

#[cfg(feature = "testing")]
fn counter_strategies() -> [&'static str; 4] {
    ["fetch-add", "lock", "cas", "racy"]
}

#[cfg(not(feature = "testing"))]
fn counter_strategies() -> [&'static str; 3] {
    ["fetch-add", "lock", "cas"]
}

fn run_counter(args: &ArgMatches) -> anyhow::Result<()> {
    let threads = *args.get_one::<usize>("threads").unwrap_or(&scenario::DEFAULT_THREADS);
    let increments = *args
        .get_one::<u64>("increments")
        .unwrap_or(&scenario::DEFAULT_INCREMENTS);
    let strategy = args
        .get_one::<String>("strategy")
        .map(String::as_str)
        .unwrap_or("fetch-add");

    log::info!(
        "{} threads x {} increments, strategy {}",
        threads,
        increments,
        strategy
    );

    let report: CounterReport = match strategy {
        "fetch-add" => scenario::run_counter(Arc::new(AtomicCounter::new()), threads, increments)?,
        "lock" => scenario::run_counter(Arc::new(AtomicCounter::new_lock()), threads, increments)?,
        "cas" => scenario::run_counter(Arc::new(AtomicCounter::new_cas()), threads, increments)?,
        #[cfg(feature = "testing")]
        "racy" => scenario::run_counter(
            Arc::new(lib::tests::RacyCounter::new()),
            threads,
            increments,
        )?,
        other => bail!("unknown counter strategy {}", other),
    };

    log::info!(
        "final count: {} (expected {}, lost {})",
        report.observed,
        report.expected,
        report.lost()
    );

    Ok(())
}

fn run_flag(args: &ArgMatches) -> anyhow::Result<()> {
    let delay = args
        .get_one::<u64>("delay-ms")
        .map_or(scenario::DEFAULT_HANDOFF_DELAY, |ms| Duration::from_millis(*ms));
    let timeout = args
        .get_one::<u64>("timeout-ms")
        .map_or(scenario::DEFAULT_HANDOFF_TIMEOUT, |ms| Duration::from_millis(*ms));
    let blocking = args.get_flag("blocking");
    let strategy = args
        .get_one::<String>("strategy")
        .map(String::as_str)
        .unwrap_or("atomic");

    if blocking && strategy != "notify" {
        bail!("--blocking requires --strategy notify");
    }

    log::info!("writer sets the flag after {:?}, strategy {}", delay, strategy);

    let report: HandoffReport = match strategy {
        "atomic" => scenario::run_handoff(Arc::new(VisibleFlag::new()), delay, timeout)?,
        "lock" => scenario::run_handoff(Arc::new(VisibleFlag::new_lock()), delay, timeout)?,
        "notify" if blocking => {
            scenario::run_blocking_handoff(Arc::new(VisibleFlag::new_notify()), delay, timeout)?
        }
        "notify" => scenario::run_handoff(Arc::new(VisibleFlag::new_notify()), delay, timeout)?,
        other => bail!("unknown flag strategy {}", other),
    };

    log::info!(
        "reader saw the flag after {} polls, {:?} after start",
        report.polls,
        report.elapsed
    );

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let env = env_logger::Env::new()
        .filter_or("SHARED_STATE_LOG", "info")
        .write_style("SHARED_STATE_LOG_STYLE");
    env_logger::init_from_env(env);

    let matches = make_cli().get_matches();

    match matches.subcommand() {
        Some(("counter", args)) => run_counter(args),
        Some(("flag", args)) => run_flag(args),
        _ => bail!("a subcommand is required"),
    }
}
