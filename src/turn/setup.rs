//! Initial snapshot construction.

use im::OrdMap;

use crate::cards::{CardCatalog, CardLifecycle, CardType, DeckPool};
use crate::config::{Board, GameSettings};
use crate::core::{CardId, GameRng, GameSnapshot, Player, PlayerId};
use crate::diagnostics::{Category, DiagnosticLog};
use crate::error::Result;

/// Stream of the game RNG used for deck shuffling.
const DECK_STREAM: u64 = 0;

/// Build the snapshot a game starts from.
///
/// Every player stands on the start space with the starting resources.
/// Each deck holds its catalog cards, shuffled from a stream derived from
/// the seed so the dice sequence is unaffected. Opening draws are dealt
/// player by player.
pub fn initial_snapshot(
    board: &Board,
    catalog: &CardCatalog,
    settings: &GameSettings,
    log: &DiagnosticLog,
) -> Result<GameSnapshot> {
    settings.validate()?;
    let start = match &settings.start_space {
        Some(space) => board.space(space)?.id.clone(),
        None => board.starting_space()?.clone(),
    };

    let rng = GameRng::new(settings.seed);
    let mut deck_rng = rng.derive(DECK_STREAM);
    let mut decks = OrdMap::new();
    for card_type in CardType::ALL {
        let mut cards: Vec<CardId> = catalog.by_type(card_type).map(|c| c.id.clone()).collect();
        if settings.shuffle_decks {
            deck_rng.shuffle(&mut cards);
        }
        decks.insert(card_type, DeckPool::new(cards));
    }

    let players = settings
        .seats
        .iter()
        .enumerate()
        .map(|(index, seat)| {
            let mut player = Player::new(PlayerId(index as u8), seat.name.clone(), start.clone())
                .with_controller(seat.controller)
                .with_money(settings.starting_money);
            player.time = settings.starting_time;
            player
        })
        .collect();

    let mut snapshot = GameSnapshot::new(players, decks, rng.state());
    let cards = CardLifecycle::new(catalog, log);
    for player in PlayerId::all(settings.player_count()) {
        for &(deck, count) in &settings.opening_draws {
            cards.draw(&mut snapshot, player, deck, count)?;
        }
    }

    log.normal(
        Category::Turn,
        format!(
            "game set up: {} player(s) on {start}, seed {}",
            settings.player_count(),
            settings.seed
        ),
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardDefinition;
    use crate::config::SpaceDef;
    use crate::core::{check_invariants, SpaceId};
    use crate::error::EngineError;

    fn board() -> Board {
        Board::builder()
            .space(SpaceDef::new("LOBBY"))
            .space(SpaceDef::new("START").starting())
            .build()
            .unwrap()
    }

    fn catalog() -> CardCatalog {
        let mut catalog = CardCatalog::new();
        for n in 1..=10 {
            catalog
                .register(CardDefinition::new(CardId::new(format!("W{n:03}")), "Work", CardType::Work))
                .unwrap();
        }
        catalog
    }

    fn settings() -> GameSettings {
        GameSettings::new()
            .with_player("Ann")
            .with_player("Bob")
            .with_starting_money(5000)
            .with_starting_time(1)
            .with_seed(11)
            .with_opening_draw(CardType::Work, 2)
    }

    #[test]
    fn test_players_start_on_flagged_space() {
        let log = DiagnosticLog::new();
        let s = initial_snapshot(&board(), &catalog(), &settings(), &log).unwrap();
        assert!(check_invariants(&s).is_empty());
        for player in s.players.iter() {
            assert_eq!(player.space, SpaceId::new("START"));
            assert_eq!(player.money, 5000);
            assert_eq!(player.time, 1);
            assert_eq!(player.hand.len(), 2);
        }
        assert_eq!(s.deck(CardType::Work).unwrap().remaining(), 6);
        assert_eq!(s.decks.len(), CardType::ALL.len());
    }

    #[test]
    fn test_same_seed_same_decks() {
        let log = DiagnosticLog::new();
        let a = initial_snapshot(&board(), &catalog(), &settings(), &log).unwrap();
        let b = initial_snapshot(&board(), &catalog(), &settings(), &log).unwrap();
        assert_eq!(a, b);

        let unshuffled = initial_snapshot(&board(), &catalog(), &settings().without_shuffle(), &log).unwrap();
        let first: Vec<_> = unshuffled.player(PlayerId(0)).unwrap().hand.iter().map(|c| c.card.clone()).collect();
        assert_eq!(first, vec![CardId::new("W001"), CardId::new("W002")]);
    }

    #[test]
    fn test_start_space_override() {
        let log = DiagnosticLog::new();
        let s = initial_snapshot(&board(), &catalog(), &settings().with_start_space("LOBBY"), &log).unwrap();
        assert_eq!(s.player(PlayerId(1)).unwrap().space, SpaceId::new("LOBBY"));

        let err = initial_snapshot(&board(), &catalog(), &settings().with_start_space("ROOF"), &log).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }
}
