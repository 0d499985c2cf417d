//! The game snapshot: the single value describing a game at one instant.
//!
//! ## Structure
//!
//! - Players (position, resources, hands, flags, status)
//! - Card pools, one per deck
//! - Turn bookkeeping: active player, turn number, phase, turn record
//! - Resolution bookkeeping: applied-effect log, deferred directives,
//!   pending choices
//! - Dice position
//!
//! Snapshots are immutable once committed to the
//! [`SnapshotStore`](crate::store::SnapshotStore). Transitions clone the
//! current snapshot (O(1) thanks to `im` structural sharing), edit the
//! clone and hand it back for validation.

use im::{OrdMap, OrdSet, Vector};
use serde::{Deserialize, Serialize};

use super::action::TurnRecord;
use super::ids::{DirectiveId, PassId, PlayerId, SpaceId};
use super::phase::TurnPhase;
use super::player::Player;
use super::rng::{GameRng, GameRngState};
use crate::cards::{DeckId, DeckPool};
use crate::choice::ChoiceArbiter;
use crate::effects::EffectDirective;
use crate::error::{EngineError, Result};

/// Key of the applied-effect log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AppliedDirective {
    /// Pass the directive ran in.
    pub pass: PassId,
    /// The directive.
    pub directive: DirectiveId,
}

/// A directive scheduled for a later turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredDirective {
    /// Global turn number on which it applies.
    pub activation_turn: u32,
    /// Player who acts when it applies.
    pub owner: PlayerId,
    /// The directive, with an immediate duration.
    pub directive: EffectDirective,
}

/// Complete game state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    // === Players ===
    /// Players in turn order. `players[i].id == PlayerId(i)`.
    pub players: Vector<Player>,

    // === Cards ===
    /// One pool per deck.
    pub decks: OrdMap<DeckId, DeckPool>,

    // === Turn ===
    /// Whose turn it is.
    pub active: PlayerId,
    /// Global turn number (starts at 1, increments at every turn end).
    pub turn: u32,
    /// Current phase.
    pub phase: TurnPhase,
    /// What has happened this turn.
    pub record: TurnRecord,
    /// Records of finished turns.
    pub history: Vector<TurnRecord>,
    /// Turn whose arrival checkpoint is live, if any.
    pub checkpoint_turn: Option<u32>,
    /// Set once someone reaches an ending space.
    pub winner: Option<PlayerId>,

    // === Resolution ===
    /// (pass, directive) pairs already applied this turn.
    pub effect_log: OrdSet<AppliedDirective>,
    /// Directives waiting for a later turn, in scheduling order.
    pub deferred: Vector<DeferredDirective>,
    /// Pending decisions.
    pub choices: ChoiceArbiter,
    /// Next pass identifier.
    pub next_pass: u64,

    // === Randomness ===
    /// Dice position.
    pub rng: GameRngState,
}

impl GameSnapshot {
    /// Create a snapshot at turn 1 with the first player awaiting the roll.
    #[must_use]
    pub fn new(players: Vec<Player>, decks: OrdMap<DeckId, DeckPool>, rng: GameRngState) -> Self {
        let first = PlayerId(0);
        Self {
            players: players.into_iter().collect(),
            decks,
            active: first,
            turn: 1,
            phase: TurnPhase::AwaitingRoll,
            record: TurnRecord::new(1, first),
            history: Vector::new(),
            checkpoint_turn: None,
            winner: None,
            effect_log: OrdSet::new(),
            deferred: Vector::new(),
            choices: ChoiceArbiter::new(),
            next_pass: 0,
            rng,
        }
    }

    /// Number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Look up a player.
    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .get(id.index())
            .ok_or_else(|| EngineError::NotFound(format!("{id}")))
    }

    /// Look up a player for editing.
    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.players
            .get_mut(id.index())
            .ok_or_else(|| EngineError::NotFound(format!("{id}")))
    }

    /// The active player.
    pub fn active_player(&self) -> Result<&Player> {
        self.player(self.active)
    }

    /// Look up a card pool.
    pub fn deck(&self, deck: DeckId) -> Result<&DeckPool> {
        self.decks
            .get(&deck)
            .ok_or_else(|| EngineError::NotFound(format!("deck {deck}")))
    }

    /// Look up a card pool for editing.
    pub fn deck_mut(&mut self, deck: DeckId) -> Result<&mut DeckPool> {
        self.decks
            .get_mut(&deck)
            .ok_or_else(|| EngineError::NotFound(format!("deck {deck}")))
    }

    /// Players still taking turns, in turn order.
    pub fn playing(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_playing())
    }

    /// Playing players standing on `space`, in turn order.
    pub fn occupants<'a>(&'a self, space: &'a SpaceId) -> impl Iterator<Item = PlayerId> + 'a {
        self.playing().filter(move |p| &p.space == space).map(|p| p.id)
    }

    /// Next playing player after `after`, wrapping around. May return
    /// `after` itself when it is the only one left.
    #[must_use]
    pub fn next_playing_after(&self, after: PlayerId) -> Option<PlayerId> {
        let count = self.players.len();
        (1..=count)
            .map(|offset| (after.index() + offset) % count)
            .filter_map(|index| self.players.get(index))
            .find(|p| p.is_playing())
            .map(|p| p.id)
    }

    /// Allocate a new pass identifier.
    pub fn allocate_pass(&mut self) -> PassId {
        let pass = PassId(self.next_pass);
        self.next_pass += 1;
        pass
    }

    /// Roll a die, advancing the snapshot's dice position.
    pub fn roll_die(&mut self, sides: u8) -> u8 {
        let mut rng = GameRng::from_state(&self.rng);
        let value = rng.roll_die(sides);
        self.rng = rng.state();
        value
    }

    /// Has `directive` already been applied in `pass`?
    #[must_use]
    pub fn has_applied(&self, pass: PassId, directive: DirectiveId) -> bool {
        self.effect_log.contains(&AppliedDirective { pass, directive })
    }

    /// Record that `directive` has been applied in `pass`.
    pub fn mark_applied(&mut self, pass: PassId, directive: DirectiveId) {
        self.effect_log.insert(AppliedDirective { pass, directive });
    }
}
