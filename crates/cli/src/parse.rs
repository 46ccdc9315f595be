//! ArgMatches → Workload conversion.
//!
//! Loads the optional configuration file first, then lets individual flags
//! override its fields.

use clap::ArgMatches;
use elision::{ExecutorConfig, RetryPolicy};

/// Which transactional memory the workers run on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdapterChoice {
    /// RTM when the CPU has it, no HTM otherwise
    Auto,
    /// Every critical section through the fallback lock
    None,
    /// Software simulator with a random conflict rate
    Simulated { conflict_rate: f64 },
}

/// Everything a run needs.
#[derive(Debug, Clone)]
pub struct Workload {
    pub threads: usize,
    pub iterations: usize,
    pub escape_every: Option<usize>,
    pub adapter: AdapterChoice,
    pub config: ExecutorConfig,
}

/// Convert clap ArgMatches into a Workload.
pub fn matches_to_workload(matches: &ArgMatches) -> Result<Workload, String> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => ExecutorConfig::from_file(path).map_err(|e| e.to_string())?,
        None => ExecutorConfig::default(),
    };

    if let Some(&budget) = matches.get_one::<u32>("budget") {
        config = config.initial_budget(budget);
    }
    if let Some(&code) = matches.get_one::<u8>("escape-code") {
        config = config.escape_code(code);
    }
    if matches.get_flag("stats") {
        config = config.statistics(true);
    }
    if let Some(policy) = matches.get_one::<String>("policy") {
        config = config.retry_policy(parse_policy(policy)?);
    }
    config.validate().map_err(|e| e.to_string())?;

    let threads = *matches.get_one::<usize>("threads").unwrap_or(&4);
    if threads == 0 {
        return Err("--threads must be at least 1".to_string());
    }

    let escape_every = matches.get_one::<usize>("escape-every").copied();
    if escape_every == Some(0) {
        return Err("--escape-every must be at least 1".to_string());
    }
    if escape_every.is_some() && config.escape_code.is_none() {
        return Err(
            "--escape-every needs an escape code (--escape-code or escape_code in --config)"
                .to_string(),
        );
    }

    let conflict_rate = *matches.get_one::<f64>("conflict-rate").unwrap_or(&0.0);
    if !(0.0..=1.0).contains(&conflict_rate) {
        return Err(format!(
            "--conflict-rate must be between 0 and 1, got {}",
            conflict_rate
        ));
    }

    let adapter = match matches.get_one::<String>("adapter").map(String::as_str) {
        Some("none") => AdapterChoice::None,
        Some("sim") => AdapterChoice::Simulated { conflict_rate },
        _ => AdapterChoice::Auto,
    };
    if conflict_rate > 0.0 && !matches!(adapter, AdapterChoice::Simulated { .. }) {
        return Err("--conflict-rate only applies to --adapter sim".to_string());
    }

    Ok(Workload {
        threads,
        iterations: *matches.get_one::<usize>("iterations").unwrap_or(&0),
        escape_every,
        adapter,
        config,
    })
}

fn parse_policy(s: &str) -> Result<RetryPolicy, String> {
    match s {
        "uniform" => Ok(RetryPolicy::Uniform),
        "reason-aware" => Ok(RetryPolicy::ReasonAware),
        other => Err(format!("unknown retry policy '{}'", other)),
    }
}
