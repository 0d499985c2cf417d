//! Player decisions.
//!
//! - `ChoiceArbiter`: queue of pending choices, stored in the snapshot
//! - `PendingChoice`: candidates fixed at creation plus what to do with
//!   the selection
//! - `Offer`: synchronous (single candidate) or external resolution

mod arbiter;

pub use arbiter::{
    ArbiterState, Candidate, CandidateList, ChoiceArbiter, ChoiceContext, Offer, PendingChoice,
    Resume,
};
