//! `diffstress` command line.
//!
//! Runs several solutions to the same problem on generated or listed inputs
//! and stops at the first input on which their outputs differ.

use clap::Parser;
use diffstress::{Candidate, Compile, Config, Error, LogDiagnostics, Toolchain};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "diffstress")]
#[command(about = "Differential stress testing of competing solutions", long_about = None)]
#[command(version)]
struct Cli {
    /// Number of generated inputs (unbounded if omitted)
    #[arg(long)]
    iterations: Option<usize>,

    /// Whitespace-separated solution executables; append `@nosan` to judge a
    /// solution on its uninstrumented build without measuring it
    #[arg(long)]
    solutions: String,

    /// Token expression (`[1, 10]; {a, b}`) or a file with one input per line
    #[arg(long)]
    input: String,

    /// Time limit in seconds
    #[arg(long, default_value = "1", value_parser = seconds)]
    timeout: Duration,

    /// Memory limit in kilobytes
    #[arg(long = "memory-limit", default_value_t = 1)]
    memory_limit: u64,

    /// Log level, overridden by `RUST_LOG`
    #[arg(long, default_value = "info")]
    log: log::LevelFilter,

    /// Seed for token generation
    #[arg(long)]
    seed: Option<u64>,

    /// Kill a solution after this many seconds (default: five times the timeout)
    #[arg(long = "kill-after", value_parser = seconds)]
    kill_after: Option<Duration>,

    /// Time program to measure with instead of the platform's GNU time
    #[arg(long = "time-program")]
    time_program: Option<PathBuf>,

    /// Suffix naming each solution's uninstrumented build
    #[arg(long = "fallback-suffix", default_value = diffstress::config::DEFAULT_FALLBACK_SUFFIX)]
    fallback_suffix: String,

    /// Treat solutions as C++ sources and build them first
    #[arg(long)]
    compile: bool,
}

fn seconds(text: &str) -> Result<Duration, String> {
    let secs: f64 = text.parse().map_err(|e| format!("{e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{e}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log)
        .parse_default_env()
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_divergence() => {
            eprintln!("{e}");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> diffstress::Result<()> {
    let compile = cli.compile;
    let config = Config {
        iterations: cli.iterations,
        timeout: cli.timeout,
        memory_limit_kb: cli.memory_limit,
        candidates: cli.solutions.split_whitespace().map(String::from).collect(),
        input: Some(cli.input),
        seed: cli.seed,
        kill_after: cli.kill_after,
        time_program: cli.time_program,
        fallback_suffix: cli.fallback_suffix,
    };

    let candidates = if compile {
        build(&config)?
    } else {
        config.candidates()
    };

    let checked = config
        .suite()
        .run(&candidates, config.source()?, &mut LogDiagnostics::new())?;
    log::info!(target: diffstress::LOG_TARGET, "{checked} inputs, all solutions agree");
    Ok(())
}

fn build(config: &Config) -> Result<Vec<Candidate>, Error> {
    let toolchain = Toolchain::default();
    config
        .candidates
        .iter()
        .map(|arg| {
            let candidate = Candidate::parse(arg);
            let out_dir = candidate
                .path()
                .parent()
                .unwrap_or(Path::new("."))
                .to_path_buf();
            toolchain.build(&candidate, &out_dir, &config.fallback_suffix)
        })
        .collect()
}
