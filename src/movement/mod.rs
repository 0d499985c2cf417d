//! Movement resolution.
//!
//! Converts a space's movement directive plus the turn's roll into a
//! destination, consulting the choice arbiter when the mover must pick.

mod resolver;

pub use resolver::{DiceTable, MoveResolution, MovementDirective, MovementResolver};
