//! Turn phases and resolution stages.

use serde::{Deserialize, Serialize};

use super::ids::PlayerId;

/// Where the turn state machine currently stands.
///
/// ```text
/// AwaitingRoll -> ResolvingEffects -> AwaitingAction -> TurnComplete -> AwaitingRoll
///                  |        ^   \
///                  v        |    -> GameWon
///            AwaitingChoice-+
/// ```
///
/// `ResolvingEffects` and `TurnComplete` are transient: committed
/// snapshots always settle in one of the other phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    /// The active player must roll.
    AwaitingRoll,
    /// The active player may play, discard, transfer, negotiate or end the turn.
    AwaitingAction,
    /// Directives are being applied.
    ResolvingEffects,
    /// Resolution is suspended on a pending choice.
    AwaitingChoice,
    /// The turn is being handed over.
    TurnComplete,
    /// A player reached an ending space.
    GameWon(PlayerId),
    /// Every player has finished or forfeited without a winner.
    GameOver,
}

impl TurnPhase {
    /// Is the game over (won or abandoned)?
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, TurnPhase::GameWon(_) | TurnPhase::GameOver)
    }

    /// Can the active player submit actions?
    #[must_use]
    pub fn accepts_actions(self) -> bool {
        self == TurnPhase::AwaitingAction
    }
}

/// The step of the turn to continue with once an effect pass completes.
///
/// Stored with every pending choice so that resolving the choice picks up
/// exactly where resolution was suspended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Apply the current space's dice-outcome effects.
    DiceEffects,
    /// Resolve the current space's movement.
    Movement,
    /// Apply the entry effects of the space just entered.
    Arrival,
    /// Entry effects are done: capture the checkpoint, await actions.
    Entered,
    /// A card's effects are done: await further actions.
    Action,
    /// Run deferred directives that fall due this turn, then hand over.
    Deferred,
}
