//! Card pools.
//!
//! Every deck is a finite pool of distinct cards split between a draw pile
//! and a discard pile; the rest are in players' hands. The pool remembers
//! its size so the store can verify that no card is ever lost or
//! duplicated.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::CardId;

/// A deck's draw and discard piles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckPool {
    size: usize,
    draw_pile: Vector<CardId>,
    discard_pile: Vector<CardId>,
}

impl DeckPool {
    /// Create a pool with every card in the draw pile, top card first.
    #[must_use]
    pub fn new(cards: impl IntoIterator<Item = CardId>) -> Self {
        let draw_pile: Vector<CardId> = cards.into_iter().collect();
        Self {
            size: draw_pile.len(),
            draw_pile,
            discard_pile: Vector::new(),
        }
    }

    /// Total number of cards belonging to this deck.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cards left to draw.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.draw_pile.len()
    }

    /// Cards on the discard pile.
    #[must_use]
    pub fn discarded(&self) -> usize {
        self.discard_pile.len()
    }

    /// The draw pile, top card first.
    #[must_use]
    pub fn draw_pile(&self) -> &Vector<CardId> {
        &self.draw_pile
    }

    /// The discard pile, oldest first.
    #[must_use]
    pub fn discard_pile(&self) -> &Vector<CardId> {
        &self.discard_pile
    }

    /// Take the top card, if any.
    #[must_use]
    pub fn draw(&mut self) -> Option<CardId> {
        self.draw_pile.pop_front()
    }

    /// Put a card on the discard pile.
    pub fn discard(&mut self, card: CardId) {
        self.discard_pile.push_back(card);
    }

    /// Is `card` on either pile?
    #[must_use]
    pub fn contains(&self, card: &CardId) -> bool {
        self.draw_pile.contains(card) || self.discard_pile.contains(card)
    }
}
