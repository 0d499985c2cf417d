//! Player actions and the per-turn record.
//!
//! Actions are what a player may do once their token has arrived on a
//! space. The turn record collects the dice roll, the actions taken and
//! every directive applied during the turn; at turn end it is archived
//! into the snapshot's history.

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::ids::{CardId, DirectiveId, PassId, PlayerId, SpaceId};
use super::player::VisitType;

/// An action submitted by the active player.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Play a card from hand, paying its cost.
    PlayCard(CardId),
    /// Put a card from hand onto its deck's discard pile.
    DiscardCard(CardId),
    /// Give a transferable card to another player.
    TransferCard {
        /// The card to give.
        card: CardId,
        /// Receiving player.
        to: PlayerId,
    },
    /// Negotiate on the current space: roll the turn back to arrival.
    Negotiate,
    /// Leave the game.
    Forfeit,
    /// Finish the turn.
    EndTurn,
}

impl Action {
    /// Short name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Action::PlayCard(_) => "play-card",
            Action::DiscardCard(_) => "discard-card",
            Action::TransferCard { .. } => "transfer-card",
            Action::Negotiate => "negotiate",
            Action::Forfeit => "forfeit",
            Action::EndTurn => "end-turn",
        }
    }
}

/// A recorded action with metadata for history tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who took this action.
    pub player: PlayerId,
    /// The action taken.
    pub action: Action,
    /// Turn number when action was taken.
    pub turn: u32,
    /// Sequence number within the turn (for ordering).
    pub sequence: u32,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(player: PlayerId, action: Action, turn: u32, sequence: u32) -> Self {
        Self {
            player,
            action,
            turn,
            sequence,
        }
    }
}

/// One directive application, as it appears in the turn record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedEffect {
    /// Pass the directive ran in.
    pub pass: PassId,
    /// The directive.
    pub directive: DirectiveId,
    /// Players it was applied to.
    pub targets: SmallVec<[PlayerId; 4]>,
}

/// Everything that happened in one turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Global turn number.
    pub turn: u32,
    /// Active player.
    pub player: PlayerId,
    /// The dice roll, once made.
    pub roll: Option<u8>,
    /// The last roll could not be resolved; the player is still to move.
    pub roll_failed: bool,
    /// Time charged by try-agains this turn.
    pub try_again_time: i64,
    /// Space entered this turn and how.
    pub arrival: Option<(SpaceId, VisitType)>,
    /// Actions in submission order.
    pub actions: Vector<ActionRecord>,
    /// Directives applied, in application order.
    pub effects: Vector<AppliedEffect>,
}

impl TurnRecord {
    /// Empty record for `player`'s turn `turn`.
    #[must_use]
    pub fn new(turn: u32, player: PlayerId) -> Self {
        Self {
            turn,
            player,
            roll: None,
            roll_failed: false,
            try_again_time: 0,
            arrival: None,
            actions: Vector::new(),
            effects: Vector::new(),
        }
    }

    /// Append an action, assigning the next sequence number.
    pub fn push_action(&mut self, player: PlayerId, action: Action) {
        let sequence = self.actions.len() as u32;
        self.actions
            .push_back(ActionRecord::new(player, action, self.turn, sequence));
    }
}
