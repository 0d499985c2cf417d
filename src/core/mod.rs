//! Core engine types: identifiers, players, phases, actions, RNG, snapshot.
//!
//! Everything a [`GameSnapshot`] is made of lives here, together with the
//! invariants every committed snapshot satisfies.

pub mod ids;
pub mod player;
pub mod phase;
pub mod rng;
pub mod action;
pub mod snapshot;
pub mod invariants;

pub use ids::{CardId, ChoiceId, DirectiveId, PassId, PlayerId, SpaceId};
pub use player::{Controller, Player, PlayerFlags, PlayerStatus, VisitType};
pub use phase::{Stage, TurnPhase};
pub use rng::{GameRng, GameRngState};
pub use action::{Action, ActionRecord, AppliedEffect, TurnRecord};
pub use snapshot::{AppliedDirective, DeferredDirective, GameSnapshot};
pub use invariants::{check_invariants, InvariantViolation};
