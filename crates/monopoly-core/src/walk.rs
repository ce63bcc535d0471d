//! The token walk: position, visit tally, and the single-step rule.
//!
//! [`BoardWalk`] is plain single-threaded state. The engine keeps one behind
//! a lock and drives it from its worker thread; tests drive it directly with
//! hand-picked rolls.
//!
//! # Step rule
//!
//! 1. Count the roll.
//! 2. Advance by the dice total, modulo the field count.
//! 3. Landing on the jail field tallies the jail field and moves the token
//!    to [`JAIL_LANDING_FIELD`].
//! 4. Tally the field the token now stands on.
//!
//! A jail step therefore adds two visits, so the visit total equals the roll
//! count plus the number of jail entries.

use std::sync::Arc;

use monopoly_board::{Board, JAIL_LANDING_FIELD};
use serde::Serialize;

use crate::dice::DiceRoll;

/// Target interval for mapped probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapRange {
    /// Value assigned to the least visited field.
    pub low: f64,
    /// Value assigned to the most visited field.
    pub high: f64,
}

impl MapRange {
    /// Create a range. `low` may exceed `high` to invert the mapping.
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Linearly map `value` from `[min, max]` onto this range.
    ///
    /// A zero-width domain cannot be interpolated and maps to `low`.
    #[allow(clippy::cast_precision_loss)]
    pub fn interpolate(&self, value: u64, min: u64, max: u64) -> f64 {
        if max <= min {
            return self.low;
        }
        let offset = value.saturating_sub(min) as f64;
        let width = max.saturating_sub(min) as f64;
        let fraction = (offset / width).clamp(0.0, 1.0);
        // Weighted sum of the endpoints; `high - low` overflows on wide ranges.
        self.high.mul_add(fraction, self.low * (1.0 - fraction))
    }
}

impl Default for MapRange {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl From<[f64; 2]> for MapRange {
    fn from([low, high]: [f64; 2]) -> Self {
        Self::new(low, high)
    }
}

/// What a single step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// The dice that were thrown.
    pub roll: DiceRoll,
    /// Roll count after this step.
    pub roll_count: u64,
    /// Field reached by the dice, before any jail transfer.
    pub landed: usize,
    /// Whether the jail rule fired.
    pub jailed: bool,
    /// Field the token stands on after the step.
    pub position: usize,
}

/// Per-field statistics inside a [`BoardSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldStats {
    /// Field index.
    pub field: usize,
    /// Times the field was tallied.
    pub visits: u64,
    /// `visits / roll_count`, or 0 before the first roll.
    pub probability: f64,
    /// Visits mapped onto the configured [`MapRange`].
    pub mapped: f64,
}

/// Consistent copy of the walk at one point between two steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardSnapshot {
    /// Total steps taken.
    pub roll_count: u64,
    /// Current token position.
    pub position: usize,
    /// One entry per field, in field order.
    pub fields: Vec<FieldStats>,
}

impl BoardSnapshot {
    /// Statistics of one field, if it exists.
    pub fn field(&self, field: usize) -> Option<&FieldStats> {
        self.fields.get(field)
    }

    /// Sum of all visit counters.
    pub fn total_visits(&self) -> u64 {
        self.fields
            .iter()
            .fold(0_u64, |acc, stats| acc.saturating_add(stats.visits))
    }
}

/// Token position and visit tally on a [`Board`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardWalk {
    board: Arc<Board>,
    position: usize,
    visits: Vec<u64>,
    roll_count: u64,
}

impl BoardWalk {
    /// A fresh walk with the token on field 0.
    pub fn new(board: Arc<Board>) -> Self {
        Self::starting_at(board, 0)
    }

    /// A fresh walk with the token on `position` (wrapped onto the board).
    pub fn starting_at(board: Arc<Board>, position: usize) -> Self {
        let field_count = board.field_count();
        Self {
            position: position.checked_rem(field_count).unwrap_or(0),
            visits: vec![0; field_count],
            roll_count: 0,
            board,
        }
    }

    /// The board being walked.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Current token position.
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Total steps taken.
    pub const fn roll_count(&self) -> u64 {
        self.roll_count
    }

    /// Visit counters in field order.
    pub fn visits(&self) -> &[u64] {
        &self.visits
    }

    /// Visit counter of one field, 0 when out of range.
    pub fn visits_of(&self, field: usize) -> u64 {
        self.visits.get(field).copied().unwrap_or(0)
    }

    /// Apply one dice roll.
    pub fn step(&mut self, roll: DiceRoll) -> StepOutcome {
        self.roll_count = self.roll_count.saturating_add(1);

        let field_count = self.board.field_count();
        let landed = self
            .position
            .saturating_add(usize::from(roll.total()))
            .checked_rem(field_count)
            .unwrap_or(0);

        let jailed = landed == self.board.jail_field();
        let position = if jailed {
            self.tally(landed);
            // Only wraps on boards smaller than the standard one.
            JAIL_LANDING_FIELD.checked_rem(field_count).unwrap_or(0)
        } else {
            landed
        };
        self.tally(position);
        self.position = position;

        StepOutcome {
            roll,
            roll_count: self.roll_count,
            landed,
            jailed,
            position,
        }
    }

    /// Share of rolls that tallied `field`.
    ///
    /// Returns 0 for fields outside the board and before the first roll.
    #[allow(clippy::cast_precision_loss)]
    pub fn probability(&self, field: usize) -> f64 {
        if self.roll_count == 0 {
            return 0.0;
        }
        self.visits
            .get(field)
            .map_or(0.0, |&visits| visits as f64 / self.roll_count as f64)
    }

    /// Visits of `field` mapped from the observed `[min, max]` onto `range`.
    ///
    /// Returns 0 for fields outside the board and before the first roll.
    pub fn mapped_probability(&self, field: usize, range: MapRange) -> f64 {
        if self.roll_count == 0 {
            return 0.0;
        }
        let Some(&visits) = self.visits.get(field) else {
            return 0.0;
        };
        let (min, max) = self.visit_bounds();
        range.interpolate(visits, min, max)
    }

    /// Copy every counter and derived value at once.
    pub fn snapshot(&self, range: MapRange) -> BoardSnapshot {
        let (min, max) = self.visit_bounds();
        let fields = self
            .visits
            .iter()
            .enumerate()
            .map(|(field, &visits)| FieldStats {
                field,
                visits,
                probability: self.probability(field),
                mapped: if self.roll_count == 0 {
                    0.0
                } else {
                    range.interpolate(visits, min, max)
                },
            })
            .collect();

        BoardSnapshot {
            roll_count: self.roll_count,
            position: self.position,
            fields,
        }
    }

    fn visit_bounds(&self) -> (u64, u64) {
        let min = self.visits.iter().copied().min().unwrap_or(0);
        let max = self.visits.iter().copied().max().unwrap_or(0);
        (min, max)
    }

    fn tally(&mut self, field: usize) {
        if let Some(count) = self.visits.get_mut(field) {
            *count = count.saturating_add(1);
        }
    }
}
