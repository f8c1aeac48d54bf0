use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgGroup, Parser};
use mcuctl_link::{Board, CommandChannel, LinkConfig};
use mcuctl_runner::{logging, BatchOptions, BatchRunner, RunnerError, SelfTest};
use tracing::{error, info};

/// Drive the TM4C1294 hardware demo firmware over its serial shell
#[derive(Parser, Debug)]
#[command(name = "mcuctl", version, author, long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["batch", "test"])))]
struct Args {
    /// Serial device of the board
    #[arg(short, long)]
    device: Option<String>,

    /// Use simulated hardware instead of a serial device
    #[arg(long, default_value_t = false)]
    simulate: bool,

    /// YAML link configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Execute the commands of a batch file
    #[arg(short = 'f', long)]
    batch: Option<PathBuf>,

    /// Stop batch execution at the first error
    #[arg(short, long, default_value_t = false)]
    stop_on_error: bool,

    /// Run the board self-test
    #[arg(short, long, default_value_t = false)]
    test: bool,

    /// Pause between self-test steps in milliseconds
    #[arg(long, default_value_t = 100)]
    pause_ms: u64,

    /// Verbosity: 0 = errors only .. 4 = everything
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=4))]
    verbosity: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbosity);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<bool, RunnerError> {
    let mut config = match &args.config {
        Some(path) => LinkConfig::load(path)?,
        None => LinkConfig::default(),
    };
    if args.simulate {
        config.device = None;
    } else if let Some(device) = &args.device {
        config.device = Some(device.clone());
    }
    config.channel.verbosity = args.verbosity;

    if let Some(path) = &args.batch {
        config.channel = config.channel.for_batch();
        let mut channel = CommandChannel::open(&config)?;
        channel.clear()?;

        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;

        let runner = BatchRunner::new(BatchOptions {
            stop_on_error: args.stop_on_error,
        })
        .with_stop_flag(stop);
        let summary = runner.run_file(&mut channel, path)?;
        if args.verbosity >= 1 {
            println!("{}", summary);
        }
        info!("{}", channel.details());
        return Ok(summary.is_success());
    }

    let channel = CommandChannel::open(&config)?;
    let board = Board::new(channel.into_shared());
    let mut test = SelfTest::new(board).with_pause(Duration::from_millis(args.pause_ms));
    let report = test.run();
    println!("{}", report);
    Ok(report.is_success())
}
