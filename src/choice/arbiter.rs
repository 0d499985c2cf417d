//! The choice arbiter: pending decisions as a resumable state machine.
//!
//! ## States
//!
//! ```text
//! Idle --offer(>1 candidates)--> AwaitingResolution --resolve--> Idle
//! ```
//!
//! An offer with exactly one candidate resolves synchronously and never
//! becomes pending. An offer with none fails with `NoValidTarget`.
//!
//! The arbiter lives inside the snapshot, so a pending choice survives
//! checkpoints, persistence and observers like any other state.

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{ChoiceId, PlayerId, SpaceId, Stage};
use crate::effects::EffectBatch;
use crate::effects::TargetList;
use crate::error::{EngineError, Result};

/// Something a player can pick.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Candidate {
    /// A player (directive targeting).
    Player(PlayerId),
    /// A space (movement destination).
    Space(SpaceId),
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Candidate::Player(p) => write!(f, "{p}"),
            Candidate::Space(s) => write!(f, "{s}"),
        }
    }
}

/// Candidate set of one choice.
pub type CandidateList = SmallVec<[Candidate; 4]>;

/// Where an effect pass stopped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resume {
    /// The suspended pass.
    pub batch: EffectBatch,
    /// Index of the directive being applied.
    pub index: usize,
    /// Targets of that directive already processed.
    pub applied: TargetList,
    /// Targets of that directive not yet processed.
    pub remaining: TargetList,
}

/// What to do with the selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceContext {
    /// The selected player becomes the directive's target.
    Target(Resume),
    /// `mover` moves to the selected space. `resume` is set when the move
    /// came from a directive rather than from the space's own movement.
    Destination {
        /// Player being moved.
        mover: PlayerId,
        /// Pass to continue after moving, if any.
        resume: Option<Resume>,
    },
}

/// A decision waiting for an external resolver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChoice {
    /// Choice identity.
    pub id: ChoiceId,
    /// Candidates fixed at creation time.
    pub candidates: CandidateList,
    /// Player who decides.
    pub chooser: PlayerId,
    /// What the selection is for.
    pub context: ChoiceContext,
    /// Turn step to continue with once the suspended pass completes.
    pub followup: Stage,
}

impl PendingChoice {
    /// Is `selection` one of the candidates?
    #[must_use]
    pub fn accepts(&self, selection: &Candidate) -> bool {
        self.candidates.contains(selection)
    }
}

/// How an offer was settled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Offer {
    /// Single candidate: resolved synchronously.
    Auto(Candidate),
    /// Several candidates: an external resolver must decide.
    External(ChoiceId),
}

/// Arbiter state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArbiterState {
    /// Nothing pending.
    Idle,
    /// At least one choice awaits resolution.
    AwaitingResolution,
}

/// Owns the queue of pending choices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceArbiter {
    pending: Vector<PendingChoice>,
    next_id: u32,
}

impl ChoiceArbiter {
    /// Create an idle arbiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ArbiterState {
        if self.pending.is_empty() {
            ArbiterState::Idle
        } else {
            ArbiterState::AwaitingResolution
        }
    }

    /// Nothing pending?
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of pending choices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Is the queue empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The oldest pending choice.
    #[must_use]
    pub fn current(&self) -> Option<&PendingChoice> {
        self.pending.front()
    }

    /// Look up a pending choice.
    #[must_use]
    pub fn get(&self, id: ChoiceId) -> Option<&PendingChoice> {
        self.pending.iter().find(|c| c.id == id)
    }

    /// Offer a decision.
    ///
    /// ## Errors
    ///
    /// `NoValidTarget` if `candidates` is empty.
    pub fn offer(
        &mut self,
        candidates: CandidateList,
        chooser: PlayerId,
        context: ChoiceContext,
        followup: Stage,
    ) -> Result<Offer> {
        match candidates.len() {
            0 => Err(EngineError::NoValidTarget(format!(
                "{chooser} has nothing to choose from"
            ))),
            1 => Ok(Offer::Auto(candidates[0].clone())),
            _ => {
                let id = ChoiceId(self.next_id);
                self.next_id += 1;
                self.pending.push_back(PendingChoice {
                    id,
                    candidates,
                    chooser,
                    context,
                    followup,
                });
                Ok(Offer::External(id))
            }
        }
    }

    /// Resolve a pending choice, removing and returning it.
    ///
    /// ## Errors
    ///
    /// - `NotFound` for an unknown id
    /// - `InvalidSelection` if `selection` is not a candidate; the choice
    ///   stays pending
    pub fn resolve(&mut self, id: ChoiceId, selection: &Candidate) -> Result<PendingChoice> {
        let index = self
            .pending
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| EngineError::NotFound(format!("{id}")))?;

        if !self.pending[index].accepts(selection) {
            return Err(EngineError::InvalidSelection {
                choice: id,
                reason: format!("{selection} is not a candidate"),
            });
        }
        Ok(self.pending.remove(index))
    }

    /// Drop every pending choice.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
