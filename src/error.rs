//! Error types for the rules engine.
//!
//! Every error here is recoverable at the turn level: a failed transition
//! leaves the previously committed snapshot in place. Lenient situations
//! (a value expression without a number, an exhausted card pool) are not
//! errors at all; they are reported through [`crate::diagnostics`].

use thiserror::Error;

use crate::core::{ChoiceId, InvariantViolation, SpaceId};

/// Errors surfaced by the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A transition would have left the snapshot inconsistent.
    #[error("invariant violation: {}", join_violations(.0))]
    InvariantViolation(Vec<InvariantViolation>),

    /// Unknown player, card, space or choice reference.
    #[error("not found: {0}")]
    NotFound(String),

    /// A card could not be played, discarded or transferred.
    #[error("invalid play: {0}")]
    InvalidPlay(String),

    /// The selection is not part of the pending choice's candidate set.
    #[error("invalid selection for {choice}: {reason}")]
    InvalidSelection {
        /// The choice that stays pending.
        choice: ChoiceId,
        /// Why the selection was rejected.
        reason: String,
    },

    /// The dice table of a space has no destination for the rolled value.
    #[error("roll {roll} has no destination from {space}")]
    UnmappedRoll {
        /// Space whose table was consulted.
        space: SpaceId,
        /// The rolled value.
        roll: u8,
    },

    /// A choice was offered with an empty candidate set.
    #[error("no valid target: {0}")]
    NoValidTarget(String),

    /// The action is not allowed in the current turn phase.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// An AI decision arrived after the game was restarted.
    #[error("decision cancelled: requested in generation {requested}, game is at {current}")]
    Cancelled {
        /// Generation the decision was requested in.
        requested: u64,
        /// Current game generation.
        current: u64,
    },

    /// Configuration rows could not be coerced into typed definitions.
    #[error("configuration error: {0}")]
    Config(String),

    /// Snapshot encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

fn join_violations(violations: &[InvariantViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<bincode::Error> for EngineError {
    fn from(err: bincode::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
