//! Target selection.
//!
//! A selector either names its targets outright or produces a candidate
//! set the actor must choose from. Only playing players are ever targeted.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{GameSnapshot, PlayerId};
use crate::error::Result;

/// Players a directive applies to.
pub type TargetList = SmallVec<[PlayerId; 4]>;

/// Who a directive applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetSelector {
    /// The acting player.
    #[default]
    SelfPlayer,
    /// One other playing player, chosen by the actor.
    OtherPlayerChoice,
    /// Every other playing player.
    AllOthers,
    /// Every playing player on the actor's space, the actor included.
    SpaceOccupants,
    /// Every playing player.
    AllPlayers,
}

/// Result of evaluating a selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Targets {
    /// Apply to these players, in turn order.
    Resolved(TargetList),
    /// The actor must pick one of these.
    Choose(TargetList),
}

impl TargetSelector {
    /// Evaluate against `snapshot` for `actor`.
    ///
    /// An `OtherPlayerChoice` with no other playing player yields an empty
    /// `Choose`, which the choice arbiter rejects as `NoValidTarget`.
    pub fn evaluate(self, snapshot: &GameSnapshot, actor: PlayerId) -> Result<Targets> {
        let actor_space = snapshot.player(actor)?.space.clone();
        let others = || -> TargetList {
            snapshot
                .playing()
                .filter(|p| p.id != actor)
                .map(|p| p.id)
                .collect()
        };

        let targets = match self {
            TargetSelector::SelfPlayer => Targets::Resolved(smallvec::smallvec![actor]),
            TargetSelector::OtherPlayerChoice => Targets::Choose(others()),
            TargetSelector::AllOthers => Targets::Resolved(others()),
            TargetSelector::SpaceOccupants => {
                Targets::Resolved(snapshot.occupants(&actor_space).collect())
            }
            TargetSelector::AllPlayers => {
                Targets::Resolved(snapshot.playing().map(|p| p.id).collect())
            }
        };
        Ok(targets)
    }
}
