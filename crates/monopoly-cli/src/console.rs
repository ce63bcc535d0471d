//! Bridge between engine hooks and the terminal loop.
//!
//! [`ConsoleObserver`] turns engine notifications into [`UiEvent`]s on a
//! channel so that all printing happens on the main thread. At most one
//! [`UiEvent::BatchComplete`] is queued at a time: further batches are folded
//! into it until the main loop calls [`ConsoleObserver::batch_handled`]. In
//! headless mode the observer also pauses the engine from inside the batch
//! hook once a round limit is reached, which stops the worker at an exact
//! roll count.

use std::io::BufRead;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread;

use monopoly_core::{SimulationEngine, SimulationObserver, WeakSimulationEngine};
use tracing::{debug, warn};

/// Something the main loop has to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The engine was resumed.
    Resumed,
    /// The engine was paused.
    Paused,
    /// A batch of rolls completed.
    BatchComplete,
    /// The user typed a line.
    Input(String),
    /// Standard input reached end of file.
    InputClosed,
}

/// A parsed line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start or pause the simulation.
    Toggle,
    /// Print the board now.
    Show,
    /// Leave the program.
    Quit,
    /// Anything else.
    Unknown,
}

impl Command {
    /// Parse one line of input. An empty line toggles.
    pub fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "t" | "toggle" => Self::Toggle,
            "p" | "print" => Self::Show,
            "q" | "quit" | "exit" => Self::Quit,
            _ => Self::Unknown,
        }
    }
}

/// Observer forwarding engine hooks to the main loop.
#[derive(Debug)]
pub struct ConsoleObserver {
    events: Sender<UiEvent>,
    round_limit: Option<u64>,
    engine: OnceLock<WeakSimulationEngine>,
    batch_queued: AtomicBool,
}

impl ConsoleObserver {
    /// Forward hooks to `events`. With a `round_limit`, pause the engine at
    /// the first batch boundary at or past that many rolls.
    pub const fn new(events: Sender<UiEvent>, round_limit: Option<u64>) -> Self {
        Self {
            events,
            round_limit,
            engine: OnceLock::new(),
            batch_queued: AtomicBool::new(false),
        }
    }

    /// Give the observer a non-owning handle to the engine it observes.
    pub fn attach(&self, engine: &SimulationEngine) {
        if self.engine.set(engine.downgrade()).is_err() {
            warn!("Console observer already attached to an engine");
        }
    }

    /// Mark the queued [`UiEvent::BatchComplete`] as consumed so the next
    /// batch queues a fresh one.
    pub fn batch_handled(&self) {
        self.batch_queued.store(false, Ordering::Release);
    }

    fn send(&self, event: UiEvent) {
        if self.events.send(event).is_err() {
            debug!("UI event dropped, main loop is gone");
        }
    }
}

impl SimulationObserver for ConsoleObserver {
    fn on_resumed(&self) {
        self.send(UiEvent::Resumed);
    }

    fn on_paused(&self) {
        self.send(UiEvent::Paused);
    }

    fn on_batch_complete(&self) {
        let engine = self.engine.get().and_then(WeakSimulationEngine::upgrade);
        if let (Some(limit), Some(engine)) = (self.round_limit, engine) {
            if engine.roll_count() >= limit && engine.is_running() {
                engine.pause();
            }
        }
        if !self.batch_queued.swap(true, Ordering::AcqRel) {
            self.send(UiEvent::BatchComplete);
        }
    }
}

/// Forward every line of standard input as [`UiEvent::Input`] from a
/// background thread, followed by [`UiEvent::InputClosed`].
///
/// # Errors
///
/// Returns an error if the reader thread cannot be spawned.
pub fn spawn_input_reader(events: Sender<UiEvent>) -> std::io::Result<()> {
    let _ = thread::Builder::new()
        .name("monopoly-input".to_owned())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if events.send(UiEvent::Input(line)).is_err() {
                    return;
                }
            }
            let _ = events.send(UiEvent::InputClosed);
        })?;
    Ok(())
}
