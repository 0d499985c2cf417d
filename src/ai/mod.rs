//! AI decisions with cancellation.
//!
//! AI players resolve pending choices off the coordinator's thread. A
//! restart bumps the game generation; requests from an older generation
//! stop early and their decisions are refused.

mod decision;

pub use decision::{CancelSignal, Decision, DecisionMaker, DecisionRequest, FirstCandidate};
