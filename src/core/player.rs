//! Per-player state: position, resources, hand and status.
//!
//! ## Resources
//!
//! Money and time are integers. Time never goes below zero. Money never
//! goes below zero unless a directive explicitly permitted debt, which
//! sets [`PlayerFlags::debt_permitted`].
//!
//! ## Visits
//!
//! Every space a player has stood on is recorded in `visited`. The visit
//! type of the current space (first or subsequent) is fixed on arrival and
//! selects which rule set of that space applies.

use im::{OrdSet, Vector};
use serde::{Deserialize, Serialize};

use super::ids::{CardId, PlayerId, SpaceId};
use crate::cards::{CardRef, DeckId};

/// Who makes decisions for a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Controller {
    /// Decisions arrive through the public resolve operation.
    Human,
    /// Decisions are requested from a [`crate::ai::DecisionMaker`].
    Ai,
}

/// Whether a player still takes turns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// Still in the game.
    Playing,
    /// Reached an ending space.
    Finished,
    /// Forfeited.
    Eliminated,
}

/// First or repeat visit to a space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VisitType {
    /// The player had never stood on the space before.
    First,
    /// The player had visited the space earlier.
    Subsequent,
}

/// Turn-scoped and sticky player flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerFlags {
    /// Negotiated on the current space this turn. Cleared at turn end.
    pub negotiated_this_turn: bool,
    /// A directive allowed money to go negative.
    pub debt_permitted: bool,
}

/// A player in the snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Position in the snapshot's player list.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Current space.
    pub space: SpaceId,
    /// How the current space was entered.
    pub visit: VisitType,
    /// Every space this player has stood on.
    pub visited: OrdSet<SpaceId>,
    /// Money balance.
    pub money: i64,
    /// Elapsed time (days).
    pub time: i64,
    /// Cards held, in the order they were received.
    pub hand: Vector<CardRef>,
    /// Turn-scoped and sticky flags.
    pub flags: PlayerFlags,
    /// Whether the player still takes turns.
    pub status: PlayerStatus,
    /// Human or AI.
    pub controller: Controller,
}

impl Player {
    /// Create a player standing on `start` (which counts as visited).
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, start: SpaceId) -> Self {
        let mut visited = OrdSet::new();
        visited.insert(start.clone());
        Self {
            id,
            name: name.into(),
            space: start,
            visit: VisitType::First,
            visited,
            money: 0,
            time: 0,
            hand: Vector::new(),
            flags: PlayerFlags::default(),
            status: PlayerStatus::Playing,
            controller: Controller::Human,
        }
    }

    /// Builder: set the controller.
    #[must_use]
    pub fn with_controller(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }

    /// Builder: set starting money.
    #[must_use]
    pub fn with_money(mut self, money: i64) -> Self {
        self.money = money;
        self
    }

    /// Is this player still taking turns?
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.status == PlayerStatus::Playing
    }

    /// Visit type a move onto `space` would produce.
    #[must_use]
    pub fn visit_type_for(&self, space: &SpaceId) -> VisitType {
        if self.visited.contains(space) {
            VisitType::Subsequent
        } else {
            VisitType::First
        }
    }

    /// Move onto `space`, recording the visit. Returns the visit type.
    pub fn relocate(&mut self, space: SpaceId) -> VisitType {
        let visit = self.visit_type_for(&space);
        self.visited.insert(space.clone());
        self.space = space;
        self.visit = visit;
        visit
    }

    /// Position of `card` in hand, if held.
    #[must_use]
    pub fn hand_position(&self, card: &CardId) -> Option<usize> {
        self.hand.iter().position(|held| &held.card == card)
    }

    /// Remove `card` from hand.
    pub fn take_card(&mut self, card: &CardId) -> Option<CardRef> {
        let index = self.hand_position(card)?;
        Some(self.hand.remove(index))
    }

    /// Count held cards drawn from `deck`.
    #[must_use]
    pub fn cards_from(&self, deck: DeckId) -> usize {
        self.hand.iter().filter(|held| held.deck == deck).count()
    }
}
