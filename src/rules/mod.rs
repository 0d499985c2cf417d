//! Rule predicates: affordability, turn ownership, negotiation, winning.

pub mod engine;

pub use engine::{GameResult, RulesEngine};
