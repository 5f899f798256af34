//! decode-autotune - concurrency tuner for decode-time targets
//!
//! Repeatedly runs an external serving benchmark, reads the average decode
//! time from its report and walks concurrency toward the target band.

use anyhow::Result;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use decode_autotune::benchmark::ProcessRunner;
use decode_autotune::config::{CliArgs, TunerConfig};
use decode_autotune::session::{SessionDriver, SessionSummary};
use decode_autotune::utils::TunerError;

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn print_banner(config: &TunerConfig) {
    if config.quiet {
        return;
    }

    println!("decode-autotune v{}", env!("CARGO_PKG_VERSION"));
    println!("====================================");
    println!("Model: {}", config.model_path.display());
    println!("Benchmark: {}", config.command.program.display());
    println!("Target decode time: {}", config.band);
    println!(
        "Initial concurrency: {}, Step: {}, Max retries: {}",
        config.initial_concurrency, config.step, config.max_retries
    );
    println!("Logs: {}", config.log_dir.display());
    println!("====================================\n");
}

fn run() -> Result<()> {
    let args = CliArgs::parse_args();

    setup_logging(args.verbose, args.quiet);

    let config = TunerConfig::from_cli(&args).map_err(TunerError::Config)?;

    print_banner(&config);

    let runner = ProcessRunner::new(config.command.clone()).with_mirror(!config.quiet);
    let mut driver = SessionDriver::new(config.clone(), runner);
    let result = driver.run()?;

    let summary = SessionSummary::new(&config, &result);
    if let Some(ref path) = config.summary_path {
        info!("Writing session summary to: {:?}", path);
        summary.write_json(path)?;
    }
    summary.print();

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
