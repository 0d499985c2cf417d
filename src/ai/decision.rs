//! Asynchronous choice resolution for AI-controlled players.
//!
//! ## Flow
//!
//! 1. The coordinator hands out a [`DecisionRequest`] for the pending
//!    choice: a committed snapshot, the choice, and a [`CancelSignal`]
//!    tied to the game generation.
//! 2. The request runs a [`DecisionMaker`] on any tokio runtime.
//! 3. The resulting [`Decision`] is applied through the coordinator,
//!    which refuses it if the game was restarted in the meantime.
//!
//! A request cancelled before its maker finishes yields `None` and
//! nothing is applied.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::choice::{Candidate, PendingChoice};
use crate::core::{ChoiceId, GameSnapshot};

/// Picks a candidate for a pending choice.
pub trait DecisionMaker: Send + Sync {
    /// Choose one of `choice.candidates`, or `None` to abstain.
    fn decide(
        &self,
        snapshot: &GameSnapshot,
        choice: &PendingChoice,
    ) -> impl Future<Output = Option<Candidate>> + Send;
}

/// Always picks the first candidate.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstCandidate;

impl DecisionMaker for FirstCandidate {
    fn decide(
        &self,
        _snapshot: &GameSnapshot,
        choice: &PendingChoice,
    ) -> impl Future<Output = Option<Candidate>> + Send {
        let pick = choice.candidates.first().cloned();
        async move { pick }
    }
}

/// Fires when the game moves to a new generation (restart).
#[derive(Clone, Debug)]
pub struct CancelSignal {
    rx: watch::Receiver<u64>,
    generation: u64,
}

impl CancelSignal {
    /// Signal for `generation`, watching `rx`.
    #[must_use]
    pub fn new(rx: watch::Receiver<u64>, generation: u64) -> Self {
        Self { rx, generation }
    }

    /// Generation the signal belongs to.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Has the game moved on?
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() != self.generation
    }

    /// Resolves once the game has moved on or its coordinator is gone.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() != self.generation {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// A pending choice handed to an AI.
#[derive(Clone, Debug)]
pub struct DecisionRequest {
    /// The choice to make.
    pub choice: PendingChoice,
    /// Snapshot the choice was pending in.
    pub snapshot: Arc<GameSnapshot>,
    /// Cancellation for this request.
    pub signal: CancelSignal,
}

impl DecisionRequest {
    /// Run `maker`, giving up as soon as the request is cancelled.
    pub async fn run<D: DecisionMaker>(self, maker: &D) -> Option<Decision> {
        let DecisionRequest {
            choice,
            snapshot,
            mut signal,
        } = self;
        let generation = signal.generation();
        if signal.is_cancelled() {
            return None;
        }

        tokio::select! {
            biased;
            () = signal.cancelled() => None,
            selection = maker.decide(&snapshot, &choice) => selection.map(|selection| Decision {
                choice: choice.id,
                selection,
                generation,
            }),
        }
    }
}

/// An AI's answer to a [`DecisionRequest`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    /// Choice answered.
    pub choice: ChoiceId,
    /// Selected candidate.
    pub selection: Candidate,
    /// Generation the request was made in.
    pub generation: u64,
}
