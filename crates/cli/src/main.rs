//! Elision CLI: shared-counter workload under the budgeted executor.
//!
//! `elision [flags]` spawns worker threads that all increment one counter
//! inside critical sections, then reports the final counter, how each
//! section ended, and (with `--stats`) why transactions aborted.
//!
//! Exits 1 when an update was lost or the executor failed.

mod commands;
mod format;
mod parse;
mod workload;

use std::process;

use elision::{ExecutorBuilder, HardwareHtm, RawStatus, SimulatedHtm, Unsupported};
use rand::Rng;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_report, OutputMode};
use parse::{matches_to_workload, AdapterChoice, Workload};
use workload::Report;

fn main() {
    let matches = build_cli().get_matches();

    init_tracing(matches.get_count("verbose"));

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let workload = match matches_to_workload(&matches) {
        Ok(workload) => workload,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    match execute(&workload) {
        Ok(report) => {
            tracing::info!(
                adapter = report.adapter,
                counter = report.counter,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "run finished"
            );
            println!("{}", format_report(&report, output_mode));
            if report.lost_updates() {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn execute(workload: &Workload) -> Result<Report, String> {
    let builder = ExecutorBuilder::from_config(workload.config.clone());
    tracing::info!(
        threads = workload.threads,
        iterations = workload.iterations,
        budget = workload.config.initial_budget,
        "starting workload"
    );

    match workload.adapter {
        AdapterChoice::Auto => {
            let htm = HardwareHtm::detect();
            if !htm.is_transactional() {
                tracing::warn!("RTM not available, every critical section takes the fallback lock");
            }
            workload::run(builder.build(htm).map_err(|e| e.to_string())?, workload)
        }
        AdapterChoice::None => {
            workload::run(builder.build(Unsupported).map_err(|e| e.to_string())?, workload)
        }
        AdapterChoice::Simulated { conflict_rate } => {
            let htm = SimulatedHtm::with_injector(move |_| {
                rand::thread_rng()
                    .gen_bool(conflict_rate)
                    .then_some(RawStatus::conflict())
            });
            workload::run(builder.build(htm).map_err(|e| e.to_string())?, workload)
        }
    }
}
