//! Simulation engine, dice, and configuration for the Monopoly probabilities
//! simulation.
//!
//! This crate owns the stochastic walk around the board and the background
//! worker that drives it. Front ends build a [`SimulationEngine`], register a
//! [`SimulationObserver`], and read probabilities back while the worker runs.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `monopoly-config.yaml` into
//!   strongly-typed structs.
//! - [`dice`] -- [`DiceSource`] trait with random and scripted dice.
//! - [`engine`] -- The pausable background simulation.
//! - [`observer`] -- [`SimulationObserver`] hooks and [`NoOpObserver`].
//! - [`walk`] -- Single-threaded step rule, visit tally, and snapshots.
//!
//! [`DiceSource`]: dice::DiceSource
//! [`NoOpObserver`]: observer::NoOpObserver
//! [`SimulationEngine`]: engine::SimulationEngine
//! [`SimulationObserver`]: observer::SimulationObserver

pub mod config;
mod control;
pub mod dice;
pub mod engine;
pub mod observer;
pub mod walk;

pub use config::{ConfigError, EngineConfig, MonopolyConfig};
pub use dice::{DiceRoll, DiceSource, RandomDice, ScriptedDice};
pub use engine::{EngineError, EngineStatus, SimulationEngine, WeakSimulationEngine};
pub use observer::{NoOpObserver, SimulationObserver};
pub use walk::{BoardSnapshot, BoardWalk, FieldStats, MapRange, StepOutcome};
