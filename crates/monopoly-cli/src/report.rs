//! JSON report of a finished headless run.

use chrono::{DateTime, Utc};
use monopoly_board::Board;
use monopoly_core::{BoardSnapshot, EngineStatus, MapRange, SimulationEngine};
use serde::Serialize;

/// Everything a headless run prints with `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Topology that was simulated.
    pub board: Board,
    /// Range the mapped values were scaled into.
    pub map_range: MapRange,
    /// Engine state at report time.
    pub status: EngineStatus,
    /// Per-field counters and probabilities.
    pub snapshot: BoardSnapshot,
}

impl SimulationReport {
    /// Capture the current state of `engine`.
    pub fn capture(engine: &SimulationEngine) -> Self {
        Self {
            generated_at: Utc::now(),
            board: engine.board().clone(),
            map_range: engine.map_range(),
            status: engine.status(),
            snapshot: engine.snapshot(),
        }
    }
}
