//! Terminal front end for the Monopoly probabilities simulation.
//!
//! Wires configuration, logging, the board, and the simulation engine
//! together, then runs in one of two modes:
//!
//! - **Interactive** (default): Enter starts and pauses the simulation, the
//!   board is reprinted on every resume, pause, and completed batch.
//! - **Headless** (`--rounds N`): run exactly `N` rolls, print the board (or
//!   a JSON report with `--json`), and exit.
//!
//! # Startup Sequence
//!
//! 1. Parse command-line arguments
//! 2. Load configuration from `monopoly-config.yaml`
//! 3. Initialize structured logging (tracing)
//! 4. Build the standard board and the engine
//! 5. Start the engine worker
//! 6. Run the selected mode

mod console;
mod error;
mod render;
mod report;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use clap::Parser;
use monopoly_board::Board;
use monopoly_core::{MonopolyConfig, SimulationEngine};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::console::{Command, ConsoleObserver, UiEvent};
use crate::error::CliError;
use crate::render::RenderOptions;
use crate::report::SimulationReport;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "monopoly-sim",
    version,
    about = "Simulate a token on a Monopoly board and show per-field visit probabilities"
)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "monopoly-config.yaml")]
    config: PathBuf,

    /// Run this many rolls without interaction, print the result, and exit.
    #[arg(long)]
    rounds: Option<u64>,

    /// Print the headless result as a JSON report.
    #[arg(long, requires = "rounds")]
    json: bool,

    /// Override `engine.seed` for reproducible dice.
    #[arg(long)]
    seed: Option<u64>,

    /// Override `engine.batch_size`.
    #[arg(long)]
    batch_size: Option<u64>,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, engine startup, or terminal output
/// fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Parse arguments.
    let args = Args::parse();

    // 2. Load configuration.
    let (mut config, found) = load_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.engine.seed = Some(seed);
    }
    if let Some(batch_size) = args.batch_size {
        config.engine.batch_size = batch_size;
    }

    // 3. Initialize structured logging. Logs go to stderr so the board
    //    output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("monopoly-sim starting");
    if !found {
        info!(path = %args.config.display(), "Config file not found, using defaults");
    }
    info!(
        batch_size = config.engine.batch_size,
        post_step_delay_ms = config.engine.post_step_delay_ms,
        map_low = config.engine.probability_map_range[0],
        map_high = config.engine.probability_map_range[1],
        seed = ?config.engine.seed,
        "Configuration loaded"
    );

    match args.rounds {
        Some(rounds) => run_headless(config, rounds, args.json)?,
        None => run_interactive(&config)?,
    }

    info!("monopoly-sim shutdown complete");
    Ok(())
}

/// Load the configuration file, falling back to defaults when it does not
/// exist. The flag reports whether the file was found.
fn load_config(path: &Path) -> Result<(MonopolyConfig, bool), CliError> {
    if path.exists() {
        Ok((MonopolyConfig::from_file(path)?, true))
    } else {
        Ok((MonopolyConfig::default(), false))
    }
}

/// A started engine together with the channel its observer feeds.
struct Session {
    engine: SimulationEngine,
    observer: Arc<ConsoleObserver>,
    events: Receiver<UiEvent>,
    events_tx: Sender<UiEvent>,
}

/// Build the engine with a console observer and start its worker.
fn launch(config: &MonopolyConfig, round_limit: Option<u64>) -> Result<Session, CliError> {
    let board = Arc::new(Board::standard());
    let (events_tx, events) = mpsc::channel();
    let observer = Arc::new(ConsoleObserver::new(events_tx.clone(), round_limit));

    let engine = SimulationEngine::new(board, &config.engine, observer.clone())?;
    observer.attach(&engine);
    engine.start()?;

    Ok(Session {
        engine,
        observer,
        events,
        events_tx,
    })
}

/// Key bindings, written the same way as the board.
fn write_help(out: &mut impl Write) -> Result<(), CliError> {
    writeln!(out, "{}", render::HELP)?;
    out.flush()?;
    Ok(())
}

fn render_options(config: &MonopolyConfig, engine: &SimulationEngine) -> RenderOptions {
    RenderOptions {
        precision: config.display.precision,
        color: config.display.color,
        map_range: engine.map_range(),
    }
}

fn print_board(engine: &SimulationEngine, options: &RenderOptions) -> Result<(), CliError> {
    let text = render::render_board(&engine.snapshot(), engine.is_running(), options);
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    stdout.flush()?;
    Ok(())
}

/// Toggle the simulation from standard input until the user quits.
fn run_interactive(config: &MonopolyConfig) -> Result<(), CliError> {
    let Session {
        engine,
        observer,
        events,
        events_tx,
    } = launch(config, None)?;
    let options = render_options(config, &engine);

    {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", render::TITLE)?;
        writeln!(stdout, "{}", render::PROMPT_START)?;
        write_help(&mut stdout)?;
    }
    console::spawn_input_reader(events_tx)?;

    for event in &events {
        match event {
            UiEvent::Input(line) => match Command::parse(&line) {
                Command::Toggle => {
                    if engine.is_running() {
                        engine.pause();
                    } else {
                        engine.resume();
                    }
                }
                Command::Show => print_board(&engine, &options)?,
                Command::Quit => break,
                Command::Unknown => write_help(&mut std::io::stdout().lock())?,
            },
            UiEvent::InputClosed => break,
            UiEvent::BatchComplete => {
                // Cleared before drawing so batches finished meanwhile queue
                // one more redraw.
                observer.batch_handled();
                print_board(&engine, &options)?;
            }
            UiEvent::Resumed | UiEvent::Paused => print_board(&engine, &options)?,
        }
    }

    engine.shutdown();
    Ok(())
}

/// Run exactly `rounds` rolls and print the outcome.
fn run_headless(mut config: MonopolyConfig, rounds: u64, json: bool) -> Result<(), CliError> {
    // Batch boundaries must land on `rounds` for the observer to stop there.
    if rounds > 0 {
        config.engine.batch_size = gcd(config.engine.batch_size, rounds);
    }
    let Session { engine, events, .. } = launch(&config, Some(rounds))?;

    if rounds > 0 {
        engine.resume();
        loop {
            match events.recv() {
                Ok(UiEvent::Paused) => break,
                Ok(_) => {}
                Err(_) => return Err(CliError::EventChannelClosed),
            }
        }
    }
    engine.shutdown();

    info!(
        roll_count = engine.roll_count(),
        uptime_seconds = engine.status().uptime_seconds,
        "Headless run finished"
    );

    if json {
        let report = SimulationReport::capture(&engine);
        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
    } else {
        let options = render_options(&config, &engine);
        print_board(&engine, &options)?;
    }
    Ok(())
}

/// Greatest common divisor; `gcd(0, n) == n`.
const fn gcd(mut a: u64, mut b: u64) -> u64 {
    while let Some(rem) = a.checked_rem(b) {
        a = b;
        b = rem;
    }
    a
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn gcd_lands_batches_on_round_limit() {
        assert_eq!(gcd(100_000, 1_000_000), 100_000);
        assert_eq!(gcd(100_000, 250_000), 50_000);
        assert_eq!(gcd(100_000, 12_345), 5);
        assert_eq!(gcd(0, 42), 42);
    }

    #[test]
    fn missing_config_uses_defaults() {
        let (config, found) = load_config(Path::new("/nonexistent/monopoly-config.yaml")).unwrap();
        assert!(!found);
        assert_eq!(config, MonopolyConfig::default());
    }

    #[test]
    fn args_parse_headless_flags() {
        let args =
            Args::try_parse_from(["monopoly-sim", "--rounds", "500", "--json", "--seed", "3"])
                .unwrap();
        assert_eq!(args.rounds, Some(500));
        assert!(args.json);
        assert_eq!(args.seed, Some(3));
        assert_eq!(args.config, PathBuf::from("monopoly-config.yaml"));
    }

    #[test]
    fn help_goes_through_the_writer() {
        let mut out = Vec::new();
        write_help(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", render::HELP));
    }

    #[test]
    fn json_requires_rounds() {
        assert!(Args::try_parse_from(["monopoly-sim", "--json"]).is_err());
    }
}
