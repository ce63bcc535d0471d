//! Notification hooks fired by the simulation engine.
//!
//! A front end registers one [`SimulationObserver`] when it builds the
//! engine. Every method has an empty default body, so an implementation only
//! overrides the hooks it cares about and [`NoOpObserver`] stands in when
//! nothing needs to be told.
//!
//! Hooks run synchronously. `on_resumed` and `on_paused` run on the thread
//! that called [`resume`]/[`pause`]; `on_batch_complete` runs on the
//! simulation worker, so a slow implementation slows the simulation down.
//! No engine lock is held while a hook runs, which means hooks may query the
//! engine or toggle it.
//!
//! [`resume`]: crate::engine::SimulationEngine::resume
//! [`pause`]: crate::engine::SimulationEngine::pause

/// Receiver of engine state transitions and progress signals.
pub trait SimulationObserver: Send + Sync {
    /// Called on every `resume()`, before the worker is woken.
    fn on_resumed(&self) {}

    /// Called on every `pause()`, before the run flag is cleared.
    fn on_paused(&self) {}

    /// Called from the worker each time the roll count reaches a multiple
    /// of the batch size.
    fn on_batch_complete(&self) {}
}

/// An observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl SimulationObserver for NoOpObserver {}
