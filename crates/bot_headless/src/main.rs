//! Headless engine runner.
//!
//! This binary plays the engine against the sandbox world, writing one JSON
//! line per frame to stdout. Designed for CI runs and replay verification.
//!
//! # Usage
//!
//! ```bash
//! # Built-in opening scenario
//! cargo run -p bot_headless -- run
//!
//! # Custom scenario, engine config and objective
//! cargo run -p bot_headless -- run --scenario opening.ron --config bot.ron --objective 3200,3200
//!
//! # Record, then verify
//! cargo run -p bot_headless -- run --record opening.replay
//! cargo run -p bot_headless -- replay --file opening.replay
//! ```

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bot_core::config::EngineConfig;
use bot_core::math::Position;
use bot_headless::{CommandLog, HeadlessRunner, Result, Scenario};

#[derive(Parser)]
#[command(name = "bot_headless")]
#[command(about = "Headless runner for the frame-driven bot engine")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scenario
    Run {
        /// Scenario file (RON); the built-in opening when omitted
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Frames to play; the scenario's limit when omitted
        #[arg(short, long)]
        frames: Option<u32>,

        /// Army objective as X,Y in pixels, overriding the scenario
        #[arg(long, value_parser = parse_position)]
        objective: Option<Position>,

        /// Engine configuration file (RON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the command log to this file
        #[arg(long)]
        record: Option<PathBuf>,

        /// Print only the final summary
        #[arg(long)]
        summary_only: bool,
    },

    /// Replay a recorded command log and check it is reproduced
    Replay {
        /// Replay file path
        #[arg(short, long)]
        file: PathBuf,

        /// Scenario the log was recorded on; the built-in opening when omitted
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Engine configuration file (RON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn parse_position(s: &str) -> std::result::Result<Position, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x = x.trim().parse().map_err(|e| format!("bad X '{x}': {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad Y '{y}': {e}"))?;
    Ok(Position::new(x, y))
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr, stdout is for JSON
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Some(Commands::Run {
            scenario,
            frames,
            objective,
            config,
            record,
            summary_only,
        }) => cmd_run(scenario, frames, objective, config, record, summary_only),
        Some(Commands::Replay {
            file,
            scenario,
            config,
        }) => cmd_replay(file, scenario, config),
        None => cmd_run(None, None, None, None, None, false),
    };

    if let Err(err) = result {
        tracing::error!(%err, "Headless run failed");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn load_scenario(path: Option<PathBuf>) -> Result<Scenario> {
    match path {
        Some(path) => Ok(Scenario::load(path)?),
        None => Ok(Scenario::default_opening()),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => Ok(EngineConfig::default()),
    }
}

/// Play a scenario, streaming frames to stdout.
fn cmd_run(
    scenario: Option<PathBuf>,
    frames: Option<u32>,
    objective: Option<Position>,
    config: Option<PathBuf>,
    record: Option<PathBuf>,
    summary_only: bool,
) -> Result<()> {
    let mut scenario = load_scenario(scenario)?;
    if objective.is_some() {
        scenario.objective = objective;
    }
    let frames = frames.unwrap_or(scenario.max_frames);
    let config = load_config(config)?;

    tracing::info!(scenario = %scenario.name, frames, "Starting run");
    let mut runner = HeadlessRunner::new(scenario, config);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if summary_only {
        runner.run(frames, &mut io::sink())?;
    } else {
        runner.run(frames, &mut out)?;
    }
    let report = runner.finish();
    serde_json::to_writer(&mut out, &report)?;
    out.write_all(b"\n")?;
    out.flush()?;

    if let Some(path) = record {
        runner.log().save(&path)?;
        tracing::info!(
            path = %path.display(),
            commands = runner.log().command_count(),
            "Command log saved"
        );
    }
    Ok(())
}

/// Re-run a recorded game and compare command streams.
fn cmd_replay(file: PathBuf, scenario: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    tracing::info!("Verifying replay: {}", file.display());
    let log = CommandLog::load(&file)?;

    eprintln!("Loaded replay:");
    eprintln!("  Scenario: {}", log.scenario);
    eprintln!("  Commands: {}", log.command_count());
    eprintln!("  Duration: {} frames", log.duration);

    let scenario = load_scenario(scenario)?;
    let check = log.verify(&scenario, load_config(config)?)?;
    match check.first_divergence {
        None => {
            eprintln!("✓ Replay verified: {} frames reproduced", check.frames);
            Ok(())
        }
        Some(frame) => {
            eprintln!("✗ Replay diverged at frame {frame}");
            std::process::exit(1);
        }
    }
}
