//! Card definitions - static card data.
//!
//! A `CardDefinition` holds the immutable properties of a card: its deck,
//! cost, where it may be played and the directives it dispatches. Which
//! player holds a copy at the moment is snapshot data (see [`CardRef`]).

use serde::{Deserialize, Serialize};

use crate::core::CardId;
use crate::effects::EffectDirective;

/// The five card decks.
///
/// Each deck is also a card pool in the snapshot, so the type doubles as
/// the deck identifier ([`DeckId`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardType {
    /// Work cards (W): scope items.
    Work,
    /// Bank cards (B): loans.
    Bank,
    /// Investor cards (I): funding.
    Investor,
    /// Life cards (L): events that happen to the player.
    Life,
    /// Expeditor cards (E): help along the way.
    Expeditor,
}

/// Deck identifier. There is one pool per card type.
pub type DeckId = CardType;

impl CardType {
    /// All card types in table order.
    pub const ALL: [CardType; 5] = [
        CardType::Work,
        CardType::Bank,
        CardType::Investor,
        CardType::Life,
        CardType::Expeditor,
    ];

    /// One-letter table code.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            CardType::Work => 'W',
            CardType::Bank => 'B',
            CardType::Investor => 'I',
            CardType::Life => 'L',
            CardType::Expeditor => 'E',
        }
    }

    /// Lower-case deck name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CardType::Work => "work",
            CardType::Bank => "bank",
            CardType::Investor => "investor",
            CardType::Life => "life",
            CardType::Expeditor => "expeditor",
        }
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A card held by a player: the card and the pool it returns to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardRef {
    /// Card identifier.
    pub card: CardId,
    /// Pool the card belongs to.
    pub deck: DeckId,
}

impl CardRef {
    /// Create a card reference.
    #[must_use]
    pub fn new(card: CardId, deck: DeckId) -> Self {
        Self { card, deck }
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use rust_board::cards::{CardDefinition, CardType};
/// use rust_board::core::{CardId, DirectiveId};
/// use rust_board::effects::EffectDirective;
///
/// let loan = CardDefinition::new(CardId::new("B001"), "Bank loan", CardType::Bank)
///     .with_directive(EffectDirective::adjust_money(DirectiveId::new(1), 50_000));
///
/// assert_eq!(loan.cost, 0);
/// assert_eq!(loan.directives.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier.
    pub id: CardId,
    /// Card name (for display/debugging).
    pub name: String,
    /// Deck the card belongs to.
    pub card_type: CardType,
    /// Flavour text.
    pub description: String,
    /// Money paid to play the card.
    pub cost: i64,
    /// Board phase the card is restricted to; `None` plays anywhere.
    pub phase_restriction: Option<String>,
    /// Whether the card may be given to another player.
    pub transferable: bool,
    /// Directives dispatched when the card is played, in order.
    pub directives: Vec<EffectDirective>,
}

impl CardDefinition {
    /// Create a new card definition.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, card_type: CardType) -> Self {
        Self {
            id,
            name: name.into(),
            card_type,
            description: String::new(),
            cost: 0,
            phase_restriction: None,
            transferable: false,
            directives: Vec::new(),
        }
    }

    /// Builder: set the cost.
    #[must_use]
    pub fn with_cost(mut self, cost: i64) -> Self {
        self.cost = cost;
        self
    }

    /// Builder: restrict play to spaces of `phase`. `Any` lifts the restriction.
    #[must_use]
    pub fn with_phase_restriction(mut self, phase: impl Into<String>) -> Self {
        let phase = phase.into();
        let phase = phase.trim();
        self.phase_restriction = if phase.is_empty() || phase.eq_ignore_ascii_case("any") {
            None
        } else {
            Some(phase.to_string())
        };
        self
    }

    /// Builder: set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: allow transfers.
    #[must_use]
    pub fn transferable(mut self) -> Self {
        self.transferable = true;
        self
    }

    /// Builder: append a directive.
    #[must_use]
    pub fn with_directive(mut self, directive: EffectDirective) -> Self {
        self.directives.push(directive);
        self
    }

    /// Can the card be played on a space of `phase`?
    #[must_use]
    pub fn playable_in(&self, phase: &str) -> bool {
        self.phase_restriction
            .as_deref()
            .map_or(true, |required| required.eq_ignore_ascii_case(phase.trim()))
    }

    /// Reference to a copy of this card.
    #[must_use]
    pub fn to_ref(&self) -> CardRef {
        CardRef::new(self.id.clone(), self.card_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_restriction() {
        let card = CardDefinition::new(CardId::new("W001"), "Scope", CardType::Work)
            .with_phase_restriction("DESIGN");
        assert!(card.playable_in("design"));
        assert!(!card.playable_in("CONSTRUCTION"));

        let any = CardDefinition::new(CardId::new("L001"), "Life", CardType::Life)
            .with_phase_restriction("Any");
        assert!(any.phase_restriction.is_none());
        assert!(any.playable_in("CONSTRUCTION"));
    }

    #[test]
    fn test_builder() {
        let card = CardDefinition::new(CardId::new("E004"), "Permit runner", CardType::Expeditor)
            .with_cost(1500)
            .with_description("Speeds up permits")
            .transferable();
        assert_eq!(card.cost, 1500);
        assert!(card.transferable);
        assert_eq!(card.to_ref(), CardRef::new(CardId::new("E004"), CardType::Expeditor));
    }
}
