//! Immutable description of the cyclic board track.
//!
//! A [`Board`] is built once and then shared read-only (usually behind an
//! [`Arc`](std::sync::Arc)) with the simulation engine. It carries no
//! behavior beyond range checks; the movement rules live in the engine.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::BoardError;

/// Number of fields on the standard Monopoly board.
pub const STANDARD_FIELD_COUNT: usize = 40;

/// The "Go to Jail" corner of the standard board.
pub const STANDARD_JAIL_FIELD: usize = 30;

/// Corner fields of the standard board: Go, Jail, Free Parking, Go to Jail.
pub const STANDARD_SPECIAL_FIELDS: [usize; 4] = [0, 10, 20, 30];

/// Field a token is moved to after landing on the jail field.
///
/// A fixed landing spot of the game rules, not derived from
/// [`Board::jail_field`] or [`Board::special_fields`].
pub const JAIL_LANDING_FIELD: usize = 10;

/// Topology of a cyclic board: its size, the jail field, and the set of
/// special fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    field_count: usize,
    jail_field: usize,
    special_fields: BTreeSet<usize>,
}

impl Board {
    /// Create a board from explicit parts.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidBoard`] if `field_count` is zero, or if
    /// the jail field or any special field lies outside `[0, field_count)`.
    pub fn new(
        field_count: usize,
        jail_field: usize,
        special_fields: impl IntoIterator<Item = usize>,
    ) -> Result<Self, BoardError> {
        if field_count == 0 {
            return Err(BoardError::InvalidBoard {
                reason: "field_count must be at least 1".to_owned(),
            });
        }
        if jail_field >= field_count {
            return Err(BoardError::InvalidBoard {
                reason: format!("jail field {jail_field} is outside 0..{field_count}"),
            });
        }

        let special_fields: BTreeSet<usize> = special_fields.into_iter().collect();
        if let Some(bad) = special_fields.iter().find(|&&field| field >= field_count) {
            return Err(BoardError::InvalidBoard {
                reason: format!("special field {bad} is outside 0..{field_count}"),
            });
        }

        Ok(Self {
            field_count,
            jail_field,
            special_fields,
        })
    }

    /// The standard 40-field Monopoly board with the jail trigger on 30.
    pub fn standard() -> Self {
        Self {
            field_count: STANDARD_FIELD_COUNT,
            jail_field: STANDARD_JAIL_FIELD,
            special_fields: STANDARD_SPECIAL_FIELDS.into_iter().collect(),
        }
    }

    /// Number of fields on the track.
    pub const fn field_count(&self) -> usize {
        self.field_count
    }

    /// Field that sends the token to jail.
    pub const fn jail_field(&self) -> usize {
        self.jail_field
    }

    /// Fields reserved for special rules. Informational only.
    pub const fn special_fields(&self) -> &BTreeSet<usize> {
        &self.special_fields
    }

    /// Whether `field` addresses a position on this board.
    pub const fn contains(&self, field: usize) -> bool {
        field < self.field_count
    }

    /// Whether `field` is one of the special fields.
    pub fn is_special(&self, field: usize) -> bool {
        self.special_fields.contains(&field)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
