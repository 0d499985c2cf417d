//! Turn orchestration.
//!
//! - `setup`: the snapshot a game starts from
//! - `coordinator`: the action surface that drives a game turn by turn

mod setup;
mod coordinator;

pub use coordinator::TurnCoordinator;
pub use setup::initial_snapshot;
