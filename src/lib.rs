//! # rust-board
//!
//! A deterministic effect engine and turn state machine for data-driven
//! board games.
//!
//! ## Design Principles
//!
//! 1. **Data-Driven**: Spaces, movement, dice outcomes and cards come from
//!    configuration rows. Nothing about a particular board is hardcoded.
//!
//! 2. **One Snapshot**: The whole game is a single immutable
//!    [`GameSnapshot`]. Every transition produces a new snapshot and the
//!    [`SnapshotStore`] commits it only if its invariants hold.
//!
//! 3. **Deterministic**: Same seed, same configuration, same inputs: same
//!    game, down to every dice roll and shuffled deck.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) snapshot clones via `im`, so
//!   checkpoints cost nothing until the state diverges.
//!
//! - **Suspendable Resolution**: Effect passes stop on a pending choice and
//!   resume from exactly where they stopped. An applied-effect log keyed by
//!   (pass, directive) makes replays idempotent.
//!
//! - **Cancellable AI**: AI players decide on a tokio runtime; restarting a
//!   game cancels their outstanding decisions.
//!
//! ## Modules
//!
//! - `core`: identifiers, players, phases, actions, RNG, the snapshot
//! - `config`: configuration rows, lenient coercion, board and settings
//! - `cards`: definitions, pools and the card lifecycle
//! - `effects`: effect directives, targeting and the effect engine
//! - `movement`: movement directives and their resolution
//! - `choice`: the choice arbiter
//! - `rules`: rule predicates and game results
//! - `store`: the snapshot store, checkpoints and persistence
//! - `turn`: game setup and the turn coordinator
//! - `ai`: asynchronous decisions for AI players
//! - `diagnostics`: the captured diagnostic log

pub mod core;
pub mod error;
pub mod diagnostics;
pub mod config;
pub mod cards;
pub mod effects;
pub mod movement;
pub mod choice;
pub mod rules;
pub mod store;
pub mod turn;
pub mod ai;

// Re-export commonly used types
pub use crate::core::{
    Action, CardId, ChoiceId, Controller, DirectiveId, GameRng, GameSnapshot, Player, PlayerId,
    PlayerStatus, SpaceId, TurnPhase, VisitType,
};

pub use crate::error::{EngineError, Result};

pub use crate::diagnostics::{Category, DiagnosticLog, Verbosity};

pub use crate::config::{Board, BoardTables, CardRow, GameSettings, SpaceDef};

pub use crate::cards::{CardCatalog, CardDefinition, CardType};

pub use crate::effects::{EffectDirective, TargetSelector};

pub use crate::movement::{DiceTable, MovementDirective};

pub use crate::choice::{Candidate, PendingChoice};

pub use crate::rules::{GameResult, RulesEngine};

pub use crate::store::{Checkpoint, SnapshotStore};

pub use crate::turn::TurnCoordinator;

pub use crate::ai::{Decision, DecisionMaker, DecisionRequest, FirstCandidate};
