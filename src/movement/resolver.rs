//! Movement directives and their resolution.
//!
//! - `Fixed`: go to one space
//! - `Dice`: look the turn's roll up in a table; an unmapped roll is an
//!   error, never a default
//! - `Choice`: the mover picks a destination through the choice arbiter
//! - `Stay`: remain on the current space

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::choice::{Candidate, ChoiceArbiter, ChoiceContext, Offer};
use crate::core::{ChoiceId, PlayerId, SpaceId, Stage};
use crate::error::{EngineError, Result};

/// Roll → destination table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceTable {
    outcomes: BTreeMap<u8, SpaceId>,
}

impl DiceTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: map `roll` to `space`.
    #[must_use]
    pub fn with(mut self, roll: u8, space: SpaceId) -> Self {
        self.insert(roll, space);
        self
    }

    /// Map `roll` to `space`, replacing any earlier entry.
    pub fn insert(&mut self, roll: u8, space: SpaceId) {
        self.outcomes.insert(roll, space);
    }

    /// Destination for `roll`, if mapped.
    #[must_use]
    pub fn get(&self, roll: u8) -> Option<&SpaceId> {
        self.outcomes.get(&roll)
    }

    /// Number of mapped rolls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// No rolls mapped?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Mapped (roll, destination) pairs in roll order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &SpaceId)> {
        self.outcomes.iter().map(|(roll, space)| (*roll, space))
    }
}

/// How a player moves.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementDirective {
    /// Go to this space.
    Fixed(SpaceId),
    /// Destination depends on the turn's roll.
    Dice(DiceTable),
    /// The mover picks one of these.
    Choice(Vec<SpaceId>),
    /// Remain in place.
    #[default]
    Stay,
}

impl std::fmt::Display for MovementDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementDirective::Fixed(space) => write!(f, "to {space}"),
            MovementDirective::Dice(table) => write!(f, "by dice ({} outcomes)", table.len()),
            MovementDirective::Choice(spaces) => write!(f, "by choice of {}", spaces.len()),
            MovementDirective::Stay => f.write_str("stay"),
        }
    }
}

/// Outcome of resolving a movement directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveResolution {
    /// Move to this space.
    Arrive(SpaceId),
    /// Remain in place.
    Stay,
    /// Waiting on the mover's choice.
    Pending(ChoiceId),
}

/// Resolves movement directives into destinations.
pub struct MovementResolver;

impl MovementResolver {
    /// Resolve `directive` for `mover` standing on `origin`.
    ///
    /// `roll` is the turn's dice roll, required by `Dice` movement.
    /// `context` and `followup` describe how to continue if the mover has
    /// to choose.
    pub fn resolve(
        directive: &MovementDirective,
        origin: &SpaceId,
        roll: Option<u8>,
        arbiter: &mut ChoiceArbiter,
        mover: PlayerId,
        context: ChoiceContext,
        followup: Stage,
    ) -> Result<MoveResolution> {
        match directive {
            MovementDirective::Fixed(space) => Ok(MoveResolution::Arrive(space.clone())),
            MovementDirective::Stay => Ok(MoveResolution::Stay),
            MovementDirective::Dice(table) => {
                let roll = roll.ok_or_else(|| {
                    EngineError::InvalidAction(format!(
                        "dice movement from {origin} needs a roll"
                    ))
                })?;
                Self::dice_destination(table, origin, roll).map(MoveResolution::Arrive)
            }
            MovementDirective::Choice(spaces) => {
                let candidates = spaces.iter().cloned().map(Candidate::Space).collect();
                match arbiter.offer(candidates, mover, context, followup)? {
                    Offer::Auto(Candidate::Space(space)) => Ok(MoveResolution::Arrive(space)),
                    Offer::Auto(Candidate::Player(player)) => Err(EngineError::NoValidTarget(
                        format!("{player} offered as a destination"),
                    )),
                    Offer::External(id) => Ok(MoveResolution::Pending(id)),
                }
            }
        }
    }

    /// Look `roll` up in `table`.
    ///
    /// ## Errors
    ///
    /// `UnmappedRoll` when the table has no entry for `roll`.
    pub fn dice_destination(table: &DiceTable, origin: &SpaceId, roll: u8) -> Result<SpaceId> {
        table
            .get(roll)
            .cloned()
            .ok_or_else(|| EngineError::UnmappedRoll {
                space: origin.clone(),
                roll,
            })
    }
}
