//! Card movement between pools and hands.
//!
//! ## Operations
//!
//! - `draw`: top of a deck's draw pile into a hand. A short pool deals
//!   fewer cards and logs; drawing never fails for lack of cards.
//! - `discard`: a held card to its deck's discard pile.
//! - `play`: checks the card can be played, moves it to the discard pile,
//!   charges its cost and hands back its directives.
//! - `transfer`: a transferable card from one hand to another.
//!
//! Every operation edits a working snapshot. Checks run before any edit,
//! so a failed operation leaves the snapshot as it was.

use super::catalog::CardCatalog;
use super::definition::DeckId;
use crate::config::Board;
use crate::core::{CardId, GameSnapshot, PlayerId};
use crate::diagnostics::{Category, DiagnosticLog};
use crate::effects::EffectDirective;
use crate::error::{EngineError, Result};
use crate::rules::RulesEngine;

/// Moves cards for one game.
#[derive(Clone, Copy)]
pub struct CardLifecycle<'a> {
    catalog: &'a CardCatalog,
    log: &'a DiagnosticLog,
}

impl<'a> CardLifecycle<'a> {
    /// Create a lifecycle manager.
    #[must_use]
    pub fn new(catalog: &'a CardCatalog, log: &'a DiagnosticLog) -> Self {
        Self { catalog, log }
    }

    /// Draw up to `count` cards from `deck` into `player`'s hand.
    ///
    /// Returns the cards actually drawn, in draw order.
    pub fn draw(
        &self,
        snapshot: &mut GameSnapshot,
        player: PlayerId,
        deck: DeckId,
        count: usize,
    ) -> Result<Vec<CardId>> {
        snapshot.player(player)?;
        let pool = snapshot.deck_mut(deck)?;
        let drawn: Vec<CardId> = std::iter::from_fn(|| pool.draw()).take(count).collect();

        if drawn.len() < count {
            self.log.normal(
                Category::Cards,
                format!(
                    "{deck} deck exhausted: {player} drew {} of {count}",
                    drawn.len()
                ),
            );
        }

        let hand = &mut snapshot.player_mut(player)?.hand;
        for card in &drawn {
            hand.push_back(super::CardRef::new(card.clone(), deck));
        }
        Ok(drawn)
    }

    /// Move a held card to its deck's discard pile.
    pub fn discard(&self, snapshot: &mut GameSnapshot, player: PlayerId, card: &CardId) -> Result<()> {
        let held = snapshot
            .player(player)?
            .hand
            .iter()
            .find(|held| &held.card == card)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("{card} in the hand of {player}")))?;

        snapshot.deck_mut(held.deck)?;
        snapshot.player_mut(player)?.take_card(card);
        snapshot.deck_mut(held.deck)?.discard(held.card);
        Ok(())
    }

    /// Discard up to `count` of `player`'s cards, oldest first, optionally
    /// only from `deck`. Returns the cards discarded.
    pub fn discard_oldest(
        &self,
        snapshot: &mut GameSnapshot,
        player: PlayerId,
        deck: Option<DeckId>,
        count: usize,
    ) -> Result<Vec<CardId>> {
        let chosen: Vec<CardId> = snapshot
            .player(player)?
            .hand
            .iter()
            .filter(|held| deck.map_or(true, |d| held.deck == d))
            .take(count)
            .map(|held| held.card.clone())
            .collect();

        for card in &chosen {
            self.discard(snapshot, player, card)?;
        }
        if chosen.len() < count {
            self.log.verbose(
                Category::Cards,
                format!("{player} had only {} card(s) to discard of {count}", chosen.len()),
            );
        }
        Ok(chosen)
    }

    /// Play a card from `player`'s hand.
    ///
    /// ## Errors
    ///
    /// `InvalidPlay` if the card is not held, its phase restriction does
    /// not match the phase of the player's space, or the player cannot
    /// afford it. The snapshot is untouched in that case.
    pub fn play(
        &self,
        snapshot: &mut GameSnapshot,
        board: &Board,
        player: PlayerId,
        card: &CardId,
    ) -> Result<Vec<EffectDirective>> {
        let holder = snapshot.player(player)?;
        if holder.hand_position(card).is_none() {
            return Err(EngineError::InvalidPlay(format!("{player} does not hold {card}")));
        }
        let definition = self.catalog.require(card)?;

        let phase = &board.space(&holder.space)?.phase;
        if !definition.playable_in(phase) {
            return Err(EngineError::InvalidPlay(format!(
                "{card} is restricted to {} and {} is in {phase}",
                definition.phase_restriction.as_deref().unwrap_or("any phase"),
                holder.space
            )));
        }
        if !RulesEngine::new(board).can_afford(snapshot, player, definition.cost)? {
            return Err(EngineError::InvalidPlay(format!(
                "{player} cannot afford {card} ({} needed, {} held)",
                definition.cost, holder.money
            )));
        }

        self.discard(snapshot, player, card)?;
        snapshot.player_mut(player)?.money -= definition.cost;
        self.log.normal(
            Category::Cards,
            format!("{player} played {card} ({})", definition.name),
        );
        Ok(definition.directives.clone())
    }

    /// Hand a transferable card from one player to another.
    pub fn transfer(
        &self,
        snapshot: &mut GameSnapshot,
        from: PlayerId,
        to: PlayerId,
        card: &CardId,
    ) -> Result<()> {
        if from == to {
            return Err(EngineError::InvalidPlay(format!("{from} cannot transfer to themselves")));
        }
        if !snapshot.player(to)?.is_playing() {
            return Err(EngineError::InvalidPlay(format!("{to} is no longer playing")));
        }
        if snapshot.player(from)?.hand_position(card).is_none() {
            return Err(EngineError::InvalidPlay(format!("{from} does not hold {card}")));
        }
        if !self.catalog.require(card)?.transferable {
            return Err(EngineError::InvalidPlay(format!("{card} is not transferable")));
        }

        let held = snapshot
            .player_mut(from)?
            .take_card(card)
            .ok_or_else(|| EngineError::NotFound(format!("{card}")))?;
        snapshot.player_mut(to)?.hand.push_back(held);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardType, DeckPool};
    use crate::config::SpaceDef;
    use crate::core::{DirectiveId, GameRng, Player, SpaceId};
    use im::OrdMap;

    fn catalog() -> CardCatalog {
        let mut catalog = CardCatalog::new();
        for n in 1..=3 {
            catalog
                .register(CardDefinition::new(CardId::new(format!("W00{n}")), "Work", CardType::Work))
                .unwrap();
        }
        catalog
            .register(
                CardDefinition::new(CardId::new("B001"), "Loan", CardType::Bank)
                    .with_cost(500)
                    .with_phase_restriction("FUNDING")
                    .with_directive(EffectDirective::adjust_money(DirectiveId(1), 50_000))
                    .transferable(),
            )
            .unwrap();
        catalog
    }

    fn board() -> Board {
        Board::builder()
            .space(SpaceDef::new("START").in_phase("SETUP").starting())
            .space(SpaceDef::new("BANK").in_phase("FUNDING"))
            .build()
            .unwrap()
    }

    fn snapshot(catalog: &CardCatalog) -> GameSnapshot {
        let mut decks = OrdMap::new();
        for deck in CardType::ALL {
            decks.insert(deck, DeckPool::new(catalog.by_type(deck).map(|c| c.id.clone())));
        }
        let players = (0..2)
            .map(|i| Player::new(PlayerId(i), format!("P{i}"), SpaceId::new("START")).with_money(1000))
            .collect();
        GameSnapshot::new(players, decks, GameRng::new(0).state())
    }

    #[test]
    fn test_draw_short_pool_deals_fewer() {
        let catalog = catalog();
        let log = DiagnosticLog::new();
        let cards = CardLifecycle::new(&catalog, &log);
        let mut s = snapshot(&catalog);

        let drawn = cards.draw(&mut s, PlayerId(0), CardType::Work, 5).unwrap();
        assert_eq!(drawn.len(), 3);
        assert_eq!(s.player(PlayerId(0)).unwrap().hand.len(), 3);
        assert_eq!(s.deck(CardType::Work).unwrap().remaining(), 0);
        assert_eq!(log.entries_in(Category::Cards).len(), 1);

        let none = cards.draw(&mut s, PlayerId(1), CardType::Work, 1).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_discard_requires_card() {
        let catalog = catalog();
        let log = DiagnosticLog::new();
        let cards = CardLifecycle::new(&catalog, &log);
        let mut s = snapshot(&catalog);

        let err = cards.discard(&mut s, PlayerId(0), &CardId::new("W001")).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));

        cards.draw(&mut s, PlayerId(0), CardType::Work, 1).unwrap();
        cards.discard(&mut s, PlayerId(0), &CardId::new("W001")).unwrap();
        assert_eq!(s.deck(CardType::Work).unwrap().discarded(), 1);
        assert!(s.player(PlayerId(0)).unwrap().hand.is_empty());
    }

    #[test]
    fn test_discard_oldest() {
        let catalog = catalog();
        let log = DiagnosticLog::new();
        let cards = CardLifecycle::new(&catalog, &log);
        let mut s = snapshot(&catalog);
        cards.draw(&mut s, PlayerId(0), CardType::Work, 3).unwrap();

        let gone = cards.discard_oldest(&mut s, PlayerId(0), None, 2).unwrap();
        assert_eq!(gone, vec![CardId::new("W001"), CardId::new("W002")]);
        assert_eq!(s.player(PlayerId(0)).unwrap().hand.len(), 1);
    }

    #[test]
    fn test_play_checks_phase_then_charges_cost() {
        let catalog = catalog();
        let log = DiagnosticLog::new();
        let cards = CardLifecycle::new(&catalog, &log);
        let board = board();
        let mut s = snapshot(&catalog);
        cards.draw(&mut s, PlayerId(0), CardType::Bank, 1).unwrap();

        let before = s.clone();
        let err = cards.play(&mut s, &board, PlayerId(0), &CardId::new("B001")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPlay(_)));
        assert_eq!(s, before);

        s.player_mut(PlayerId(0)).unwrap().relocate(SpaceId::new("BANK"));
        let directives = cards.play(&mut s, &board, PlayerId(0), &CardId::new("B001")).unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(s.player(PlayerId(0)).unwrap().money, 500);
        assert_eq!(s.deck(CardType::Bank).unwrap().discarded(), 1);
    }

    #[test]
    fn test_play_unaffordable() {
        let catalog = catalog();
        let log = DiagnosticLog::new();
        let cards = CardLifecycle::new(&catalog, &log);
        let board = board();
        let mut s = snapshot(&catalog);
        cards.draw(&mut s, PlayerId(0), CardType::Bank, 1).unwrap();
        let p = s.player_mut(PlayerId(0)).unwrap();
        p.relocate(SpaceId::new("BANK"));
        p.money = 499;

        let err = cards.play(&mut s, &board, PlayerId(0), &CardId::new("B001")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPlay(_)));
        assert_eq!(s.player(PlayerId(0)).unwrap().hand.len(), 1);
    }

    #[test]
    fn test_play_card_not_held() {
        let catalog = catalog();
        let log = DiagnosticLog::new();
        let cards = CardLifecycle::new(&catalog, &log);
        let mut s = snapshot(&catalog);
        let err = cards.play(&mut s, &board(), PlayerId(0), &CardId::new("W001")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPlay(_)));
    }

    #[test]
    fn test_transfer() {
        let catalog = catalog();
        let log = DiagnosticLog::new();
        let cards = CardLifecycle::new(&catalog, &log);
        let mut s = snapshot(&catalog);
        cards.draw(&mut s, PlayerId(0), CardType::Bank, 1).unwrap();
        cards.draw(&mut s, PlayerId(0), CardType::Work, 1).unwrap();

        let work = cards.transfer(&mut s, PlayerId(0), PlayerId(1), &CardId::new("W001"));
        assert!(matches!(work, Err(EngineError::InvalidPlay(_))));
        let own = cards.transfer(&mut s, PlayerId(0), PlayerId(0), &CardId::new("B001"));
        assert!(matches!(own, Err(EngineError::InvalidPlay(_))));

        cards.transfer(&mut s, PlayerId(0), PlayerId(1), &CardId::new("B001")).unwrap();
        assert_eq!(s.player(PlayerId(1)).unwrap().cards_from(CardType::Bank), 1);
        assert_eq!(s.player(PlayerId(0)).unwrap().cards_from(CardType::Bank), 0);
    }
}
