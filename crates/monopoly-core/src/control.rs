//! Run/suspend gate shared between the engine handle and its worker.
//!
//! One mutex guards the run flag and the shutdown request; a condition
//! variable parks the worker while the simulation is suspended. The worker
//! never polls.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// What the worker should do after [`RunControl::wait_until_running`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerSignal {
    /// Take the next step.
    Step,
    /// Leave the loop for good.
    Shutdown,
}

#[derive(Debug, Default)]
struct RunState {
    running: bool,
    shutdown: bool,
}

/// Shared run flag with a blocking wait for the worker.
#[derive(Debug, Default)]
pub(crate) struct RunControl {
    state: Mutex<RunState>,
    wake: Condvar,
}

impl RunControl {
    /// A suspended gate.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Whether the worker is allowed to step.
    pub(crate) fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Set the run flag, waking the worker when it becomes `true`.
    pub(crate) fn set_running(&self, running: bool) {
        let mut state = self.lock();
        state.running = running;
        if running {
            self.wake.notify_all();
        }
    }

    /// Ask the worker to exit at its next loop head.
    pub(crate) fn request_shutdown(&self) {
        let mut state = self.lock();
        state.shutdown = true;
        self.wake.notify_all();
    }

    /// Whether shutdown was requested.
    pub(crate) fn is_shutdown_requested(&self) -> bool {
        self.lock().shutdown
    }

    /// Block while suspended. Returns once running or shutting down.
    pub(crate) fn wait_until_running(&self) -> WorkerSignal {
        let mut state = self.lock();
        while !state.running && !state.shutdown {
            state = self
                .wake
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if state.shutdown {
            WorkerSignal::Shutdown
        } else {
            WorkerSignal::Step
        }
    }

    // Every critical section leaves RunState valid.
    fn lock(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
