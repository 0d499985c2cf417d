//! Configuration: raw rows in, typed board and cards out.
//!
//! ## Layers
//!
//! - `rows`: text-only row structs, one per table
//! - `coerce`: the lenient text → value conversions
//! - `board`, `cards`: typed definitions built from coerced rows
//! - `settings`: per-session options (players, seed, starting resources)
//!
//! Games may also skip the rows entirely and build a [`Board`] and a
//! [`CardCatalog`](crate::cards::CardCatalog) in code.

pub mod rows;
pub mod coerce;
pub mod board;
pub mod cards;
pub mod settings;

pub use board::{Board, BoardBuilder, SpaceDef, VisitRules};
pub use cards::{card_from_row, catalog_from_rows};
pub use coerce::DirectiveIds;
pub use rows::{
    BoardTables, CardRow, DiceEffectRow, DiceOutcomeRow, MovementRow, SpaceContentRow,
    SpaceEffectRow, SpaceRow,
};
pub use settings::{GameSettings, Seat};
