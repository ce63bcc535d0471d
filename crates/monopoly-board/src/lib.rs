//! Board topology for the Monopoly probabilities simulation.
//!
//! This is the leaf crate of the workspace. It describes the cyclic track a
//! token moves around and nothing else: no movement rules, no counters.
//!
//! # Modules
//!
//! - [`board`] -- The immutable [`Board`] plus the standard-board constants.
//! - [`error`] -- Error types for board construction.

pub mod board;
pub mod error;

pub use board::{
    Board, JAIL_LANDING_FIELD, STANDARD_FIELD_COUNT, STANDARD_JAIL_FIELD, STANDARD_SPECIAL_FIELDS,
};
pub use error::BoardError;
