//! The simulation engine: a background walk that can be paused and resumed.
//!
//! [`SimulationEngine`] owns a [`BoardWalk`] and a dedicated worker thread
//! that steps it. The handle is cheap to clone; every clone controls and
//! observes the same simulation.
//!
//! # Lifecycle
//!
//! 1. Build with [`SimulationEngine::new`] (random dice) or
//!    [`SimulationEngine::with_dice`]. The engine starts suspended.
//! 2. Call [`start`](SimulationEngine::start) once to spawn the worker.
//! 3. Toggle with [`resume`](SimulationEngine::resume) and
//!    [`pause`](SimulationEngine::pause) for as long as the process lives.
//!
//! The worker never ends on its own. [`shutdown`](SimulationEngine::shutdown)
//! stops it for callers that need a clean exit.
//!
//! # Locking
//!
//! The run flag sits behind the `RunControl` mutex; the walk sits behind a
//! separate `RwLock` written once per step by the worker. Queries take a read
//! lock for the duration of one calculation and observe the walk between two
//! steps. Hooks and the post-step sleep run with no lock held.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock, RwLockReadGuard, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use monopoly_board::Board;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::config::EngineConfig;
use crate::control::{RunControl, WorkerSignal};
use crate::dice::{DiceSource, RandomDice};
use crate::observer::SimulationObserver;
use crate::walk::{BoardSnapshot, BoardWalk, MapRange};

/// Name given to the worker thread.
const WORKER_THREAD_NAME: &str = "monopoly-sim";

/// Errors raised while building or starting an engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine configuration cannot be run.
    #[error("invalid engine configuration: {reason}")]
    InvalidConfiguration {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },

    /// `start()` was called on an engine that was already started.
    #[error("simulation engine already started")]
    AlreadyStarted,

    /// The operating system refused to spawn the worker thread.
    #[error("failed to spawn simulation worker: {source}")]
    Spawn {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

/// Point-in-time view of the engine for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStatus {
    /// Whether the worker is allowed to step.
    pub running: bool,
    /// Total steps taken.
    pub roll_count: u64,
    /// Current token position.
    pub position: usize,
    /// Wall-clock time of `start()`, if it has been called.
    pub started_at: Option<DateTime<Utc>>,
    /// Whole seconds since `start()`, 0 before it.
    pub uptime_seconds: u64,
}

/// Handle to a running or suspended simulation.
#[derive(Clone)]
pub struct SimulationEngine {
    shared: Arc<Shared>,
}

/// Non-owning handle to a [`SimulationEngine`].
///
/// Observers that need to call back into their engine keep one of these so
/// the engine and its observer do not keep each other alive.
#[derive(Clone)]
pub struct WeakSimulationEngine {
    shared: Weak<Shared>,
}

impl WeakSimulationEngine {
    /// The engine, if any strong handle or its worker is still alive.
    pub fn upgrade(&self) -> Option<SimulationEngine> {
        self.shared.upgrade().map(|shared| SimulationEngine { shared })
    }
}

impl fmt::Debug for WeakSimulationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakSimulationEngine")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}

struct Shared {
    board: Arc<Board>,
    control: RunControl,
    walk: RwLock<BoardWalk>,
    observer: Arc<dyn SimulationObserver>,
    batch_size: NonZeroU64,
    post_step_delay: Duration,
    map_range: MapRange,
    dice: Mutex<Option<Box<dyn DiceSource>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    started_at: OnceLock<DateTime<Utc>>,
}

impl SimulationEngine {
    /// Build a suspended engine with random dice.
    ///
    /// The dice use `config.seed` when present and OS entropy otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] if the configuration
    /// fails [`EngineConfig::validate`].
    pub fn new(
        board: Arc<Board>,
        config: &EngineConfig,
        observer: Arc<dyn SimulationObserver>,
    ) -> Result<Self, EngineError> {
        let dice = RandomDice::from_seed(config.seed);
        Self::with_dice(board, config, observer, Box::new(dice))
    }

    /// Build a suspended engine that draws its rolls from `dice`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] if the configuration
    /// fails [`EngineConfig::validate`].
    pub fn with_dice(
        board: Arc<Board>,
        config: &EngineConfig,
        observer: Arc<dyn SimulationObserver>,
        dice: Box<dyn DiceSource>,
    ) -> Result<Self, EngineError> {
        config
            .validate()
            .map_err(|reason| EngineError::InvalidConfiguration { reason })?;
        let batch_size =
            NonZeroU64::new(config.batch_size).ok_or_else(|| EngineError::InvalidConfiguration {
                reason: "batch_size must be at least 1".to_owned(),
            })?;

        let shared = Shared {
            walk: RwLock::new(BoardWalk::new(Arc::clone(&board))),
            board,
            control: RunControl::new(),
            observer,
            batch_size,
            post_step_delay: config.post_step_delay(),
            map_range: MapRange::from(config.probability_map_range),
            dice: Mutex::new(Some(dice)),
            worker: Mutex::new(None),
            started_at: OnceLock::new(),
        };

        Ok(Self {
            shared: Arc::new(shared),
        })
    }

    /// Spawn the worker thread. The simulation stays suspended until
    /// [`resume`](Self::resume).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyStarted`] on a second call, or
    /// [`EngineError::Spawn`] if the thread cannot be created.
    pub fn start(&self) -> Result<(), EngineError> {
        // The worker slot lock serializes concurrent starts. The dice stay in
        // `Shared` until the worker takes them.
        let mut worker = self
            .shared
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.shared.started_at.get().is_some() {
            return Err(EngineError::AlreadyStarted);
        }

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_owned())
            .spawn(move || run_worker(&shared))?;

        let _ = self.shared.started_at.set(Utc::now());
        *worker = Some(handle);
        drop(worker);

        info!(
            field_count = self.shared.board.field_count(),
            jail_field = self.shared.board.jail_field(),
            batch_size = self.shared.batch_size.get(),
            post_step_delay = ?self.shared.post_step_delay,
            "Simulation engine started"
        );
        Ok(())
    }

    /// Let the worker step. Fires `on_resumed` even when already running.
    pub fn resume(&self) {
        self.shared.observer.on_resumed();
        self.shared.control.set_running(true);
        info!(roll_count = self.roll_count(), "Simulation resumed");
    }

    /// Suspend the worker. Fires `on_paused` even when already suspended.
    pub fn pause(&self) {
        self.shared.observer.on_paused();
        self.shared.control.set_running(false);
        info!(roll_count = self.roll_count(), "Simulation paused");
    }

    /// Whether the worker is allowed to step.
    pub fn is_running(&self) -> bool {
        self.shared.control.is_running()
    }

    /// Stop the worker thread and wait for it to exit.
    ///
    /// Safe to call more than once and from inside a hook; a call made on
    /// the worker thread itself does not wait.
    pub fn shutdown(&self) {
        self.shared.control.request_shutdown();

        let handle = self
            .shared
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(handle) = handle else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            warn!("Simulation worker panicked before shutdown");
        }
        info!(roll_count = self.roll_count(), "Simulation engine shut down");
    }

    /// A handle that does not keep the engine alive.
    pub fn downgrade(&self) -> WeakSimulationEngine {
        WeakSimulationEngine {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// The board being simulated.
    pub fn board(&self) -> &Board {
        &self.shared.board
    }

    /// Target interval used by [`mapped_probability`](Self::mapped_probability).
    pub fn map_range(&self) -> MapRange {
        self.shared.map_range
    }

    /// Steps between two batch notifications.
    pub fn batch_size(&self) -> u64 {
        self.shared.batch_size.get()
    }

    /// Total steps taken.
    pub fn roll_count(&self) -> u64 {
        self.read_walk().roll_count()
    }

    /// Current token position.
    pub fn position(&self) -> usize {
        self.read_walk().position()
    }

    /// Copy of every visit counter, in field order.
    pub fn visit_counts(&self) -> Vec<u64> {
        self.read_walk().visits().to_vec()
    }

    /// Share of rolls that tallied `field`, in `[0, 1]`.
    ///
    /// Returns 0 for fields outside the board and before the first roll.
    pub fn probability(&self, field: usize) -> f64 {
        self.read_walk().probability(field)
    }

    /// Visits of `field` min-max mapped onto the configured range.
    ///
    /// Returns 0 for fields outside the board and before the first roll;
    /// returns the low end of the range while all fields are equal.
    pub fn mapped_probability(&self, field: usize) -> f64 {
        self.read_walk().mapped_probability(field, self.shared.map_range)
    }

    /// All counters and derived values, taken between two steps.
    pub fn snapshot(&self) -> BoardSnapshot {
        self.read_walk().snapshot(self.shared.map_range)
    }

    /// Run flag, counters, and timing in one value.
    pub fn status(&self) -> EngineStatus {
        let (roll_count, position) = {
            let walk = self.read_walk();
            (walk.roll_count(), walk.position())
        };
        let started_at = self.shared.started_at.get().copied();
        let uptime_seconds = started_at.map_or(0, |start| {
            let elapsed = Utc::now().signed_duration_since(start).num_seconds();
            // Clock adjustments can make the difference negative.
            u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
        });

        EngineStatus {
            running: self.is_running(),
            roll_count,
            position,
            started_at,
            uptime_seconds,
        }
    }

    fn read_walk(&self) -> RwLockReadGuard<'_, BoardWalk> {
        self.shared
            .walk
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SimulationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationEngine")
            .field("board", &self.shared.board)
            .field("running", &self.is_running())
            .field("batch_size", &self.shared.batch_size)
            .field("post_step_delay", &self.shared.post_step_delay)
            .field("map_range", &self.shared.map_range)
            .finish_non_exhaustive()
    }
}

/// Worker loop: wait while suspended, step, notify on batch boundaries,
/// sleep if configured, repeat until shutdown.
fn run_worker(shared: &Shared) {
    let dice = shared
        .dice
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    let Some(mut dice) = dice else {
        warn!("Simulation worker started without dice");
        return;
    };
    debug!("Simulation worker waiting for resume");

    while shared.control.wait_until_running() == WorkerSignal::Step {
        let roll = dice.roll();
        let outcome = shared
            .walk
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .step(roll);

        trace!(
            first = roll.first(),
            second = roll.second(),
            position = outcome.position,
            "Dice rolled"
        );
        if outcome.jailed {
            trace!(from = outcome.landed, to = outcome.position, "Going to jail");
        }

        if outcome.roll_count % shared.batch_size == 0 {
            debug!(roll_count = outcome.roll_count, "Batch complete");
            shared.observer.on_batch_complete();
        }

        if !shared.post_step_delay.is_zero() {
            thread::sleep(shared.post_step_delay);
        }
    }

    debug!("Simulation worker exiting");
}
