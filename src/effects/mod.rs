//! Effect directives and the engine that applies them.
//!
//! - `EffectDirective`: one typed effect (resource change, card draw or
//!   discard, move, try again) with a target selector and a duration
//! - `TargetSelector`: who a directive applies to
//! - `EffectEngine`: applies batches of directives, suspending on choices
//!
//! Directives are a closed set. Configuration text is turned into
//! directives once, by [`config::coerce`](crate::config::coerce); nothing
//! here parses text.

mod directive;
mod targeting;
mod engine;

pub use directive::{DirectiveKind, Duration, EffectDirective, Resource};
pub use engine::{EffectBatch, EffectEngine, PassOutcome};
pub use targeting::{TargetList, TargetSelector, Targets};
