//! Card catalog for definition lookup.
//!
//! The `CardCatalog` stores every card definition of a game, keyed by card
//! id, and remembers registration order so that decks are always built in
//! the same order for the same configuration.

use rustc_hash::FxHashMap;

use super::definition::{CardDefinition, CardType};
use crate::core::CardId;
use crate::error::{EngineError, Result};

/// Catalog of card definitions.
///
/// ## Example
///
/// ```
/// use rust_board::cards::{CardCatalog, CardDefinition, CardType};
/// use rust_board::core::CardId;
///
/// let mut catalog = CardCatalog::new();
/// catalog
///     .register(CardDefinition::new(CardId::new("W001"), "Foundation", CardType::Work))
///     .unwrap();
///
/// assert_eq!(catalog.require(&CardId::new("W001")).unwrap().name, "Foundation");
/// assert!(catalog.require(&CardId::new("W999")).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardCatalog {
    cards: FxHashMap<CardId, CardDefinition>,
    order: Vec<CardId>,
}

impl CardCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition. Duplicate ids are a configuration error.
    pub fn register(&mut self, card: CardDefinition) -> Result<()> {
        if self.cards.contains_key(&card.id) {
            return Err(EngineError::Config(format!("{} registered twice", card.id)));
        }
        self.order.push(card.id.clone());
        self.cards.insert(card.id.clone(), card);
        Ok(())
    }

    /// Get a card definition by id.
    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&CardDefinition> {
        self.cards.get(id)
    }

    /// Get a card definition by id, failing with `NotFound`.
    pub fn require(&self, id: &CardId) -> Result<&CardDefinition> {
        self.get(id)
            .ok_or_else(|| EngineError::NotFound(format!("{id}")))
    }

    /// Check if a card id is registered.
    #[must_use]
    pub fn contains(&self, id: &CardId) -> bool {
        self.cards.contains_key(id)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.order.iter().filter_map(|id| self.cards.get(id))
    }

    /// Cards of one type, in registration order.
    pub fn by_type(&self, card_type: CardType) -> impl Iterator<Item = &CardDefinition> {
        self.iter().filter(move |c| c.card_type == card_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CardCatalog {
        let mut catalog = CardCatalog::new();
        for (id, card_type) in [
            ("W002", CardType::Work),
            ("B001", CardType::Bank),
            ("W001", CardType::Work),
        ] {
            catalog
                .register(CardDefinition::new(CardId::new(id), id, card_type))
                .unwrap();
        }
        catalog
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut catalog = catalog();
        let err = catalog
            .register(CardDefinition::new(CardId::new("B001"), "again", CardType::Bank))
            .unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_by_type_keeps_registration_order() {
        let catalog = catalog();
        let work: Vec<_> = catalog
            .by_type(CardType::Work)
            .map(|c| c.id.as_str().to_string())
            .collect();
        assert_eq!(work, vec!["W002", "W001"]);
    }

    #[test]
    fn test_require_unknown() {
        let catalog = catalog();
        assert!(matches!(
            catalog.require(&CardId::new("L001")),
            Err(EngineError::NotFound(_))
        ));
    }
}
