//! Cards: definitions, pools and lifecycle.
//!
//! ## Key Types
//!
//! - `CardType`: the five decks (W, B, I, L, E)
//! - `CardDefinition`: static card data and the directives it dispatches
//! - `CardCatalog`: definition lookup
//! - `DeckPool`: a deck's draw and discard piles
//! - `CardRef`: a card held in a hand
//! - `CardLifecycle`: draw, discard, play and transfer
//!
//! ## Conservation
//!
//! Cards never appear or vanish. Each card of a deck is in exactly one
//! place: its draw pile, its discard pile or one player's hand.

pub mod definition;
pub mod deck;
pub mod catalog;
pub mod lifecycle;

pub use catalog::CardCatalog;
pub use deck::DeckPool;
pub use definition::{CardDefinition, CardRef, CardType, DeckId};
pub use lifecycle::CardLifecycle;
