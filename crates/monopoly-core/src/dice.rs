//! Dice sources feeding the simulation.
//!
//! The engine never calls an RNG directly. It pulls [`DiceRoll`] values
//! from a [`DiceSource`], which lets production runs use [`RandomDice`]
//! while tests and reference runs replay a fixed [`ScriptedDice`] sequence.
//!
//! Each die yields an integer in `[0, 6]` inclusive. That is seven
//! outcomes, not a standard six-sided die, and the stationary distribution
//! of the board depends on it.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Lowest face of a single die.
pub const DIE_MIN: u8 = 0;

/// Highest face of a single die.
pub const DIE_MAX: u8 = 6;

/// Outcome of throwing both dice once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DiceRoll {
    first: u8,
    second: u8,
}

impl DiceRoll {
    /// Create a roll from the two die faces.
    pub const fn new(first: u8, second: u8) -> Self {
        Self { first, second }
    }

    /// Face of the first die.
    pub const fn first(&self) -> u8 {
        self.first
    }

    /// Face of the second die.
    pub const fn second(&self) -> u8 {
        self.second
    }

    /// Number of fields the token advances.
    pub const fn total(&self) -> u8 {
        self.first.saturating_add(self.second)
    }
}

impl From<(u8, u8)> for DiceRoll {
    fn from((first, second): (u8, u8)) -> Self {
        Self::new(first, second)
    }
}

/// A source of dice rolls.
///
/// The simulation worker owns its source exclusively, so implementations
/// only need to be [`Send`].
pub trait DiceSource: Send {
    /// Throw both dice once.
    fn roll(&mut self) -> DiceRoll;
}

/// Uniform random dice backed by a [`SmallRng`].
#[derive(Debug, Clone)]
pub struct RandomDice {
    rng: SmallRng,
}

impl RandomDice {
    /// Dice seeded from operating-system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Dice with a fixed seed, producing the same sequence on every run.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seeded dice when a seed is configured, entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl DiceSource for RandomDice {
    fn roll(&mut self) -> DiceRoll {
        let first = self.rng.random_range(DIE_MIN..=DIE_MAX);
        let second = self.rng.random_range(DIE_MIN..=DIE_MAX);
        DiceRoll::new(first, second)
    }
}

/// Replays a fixed sequence of rolls, starting over when it runs out.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    rolls: Vec<DiceRoll>,
    next: usize,
}

impl ScriptedDice {
    /// Create a scripted source. Returns `None` for an empty sequence.
    pub fn new(rolls: impl IntoIterator<Item = (u8, u8)>) -> Option<Self> {
        let rolls: Vec<DiceRoll> = rolls.into_iter().map(DiceRoll::from).collect();
        if rolls.is_empty() {
            return None;
        }
        Some(Self { rolls, next: 0 })
    }

    /// The same roll forever.
    pub fn repeating(first: u8, second: u8) -> Self {
        Self {
            rolls: vec![DiceRoll::new(first, second)],
            next: 0,
        }
    }
}

impl DiceSource for ScriptedDice {
    fn roll(&mut self) -> DiceRoll {
        let roll = self
            .rolls
            .get(self.next)
            .copied()
            .unwrap_or(DiceRoll::new(DIE_MIN, DIE_MIN));
        self.next = self
            .next
            .saturating_add(1)
            .checked_rem(self.rolls.len())
            .unwrap_or(0);
        roll
    }
}
