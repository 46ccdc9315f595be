//! Clap command tree for the `elision` binary.

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the top-level command.
pub fn build_cli() -> Command {
    Command::new("elision")
        .about("Run a shared-counter workload under the budgeted HTM executor")
        .arg(
            Arg::new("threads")
                .long("threads")
                .short('t')
                .value_parser(value_parser!(usize))
                .default_value("4")
                .help("Worker threads"),
        )
        .arg(
            Arg::new("iterations")
                .long("iterations")
                .short('n')
                .value_parser(value_parser!(usize))
                .default_value("100000")
                .help("Critical sections per thread"),
        )
        .arg(
            Arg::new("budget")
                .long("budget")
                .short('b')
                .value_parser(value_parser!(u32))
                .help("Transactional attempts per critical section"),
        )
        .arg(
            Arg::new("escape-code")
                .long("escape-code")
                .value_parser(parse_code)
                .help("Explicit abort code that ends a critical section (0-255 or 0x..)"),
        )
        .arg(
            Arg::new("escape-every")
                .long("escape-every")
                .value_parser(value_parser!(usize))
                .help("Signal the escape code on every Nth critical section"),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .action(ArgAction::SetTrue)
                .help("Collect per-thread abort statistics"),
        )
        .arg(
            Arg::new("policy")
                .long("policy")
                .value_parser(["uniform", "reason-aware"])
                .help("How abort reasons influence retries"),
        )
        .arg(
            Arg::new("adapter")
                .long("adapter")
                .value_parser(["auto", "none", "sim"])
                .default_value("auto")
                .help("Transactional memory: detected hardware, none, or simulated"),
        )
        .arg(
            Arg::new("conflict-rate")
                .long("conflict-rate")
                .value_parser(value_parser!(f64))
                .default_value("0.0")
                .help("Probability of an injected conflict per attempt (sim only)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML executor configuration; flags override it"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the report as JSON"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("More log output (repeat for more)"),
        )
}

fn parse_code(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid abort code '{}': {}", s, e))
}
