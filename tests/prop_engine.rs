//! Property-based tests for the turn engine.
//!
//! Random seeds and random player inputs drive small games; every
//! committed snapshot must conserve cards and keep balances valid, and the
//! same inputs must always produce the same game.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use rust_board::cards::{CardDefinition, CardType};
use rust_board::config::{Board, GameSettings, SpaceDef};
use rust_board::core::{check_invariants, Action, CardId, DirectiveId, GameSnapshot, PlayerId, SpaceId, TurnPhase, VisitType};
use rust_board::effects::{EffectDirective, TargetSelector};
use rust_board::movement::{DiceTable, MovementDirective};
use rust_board::{CardCatalog, TurnCoordinator};

const CARDS_PER_DECK: usize = 5;

fn board() -> Board {
    let table = DiceTable::new()
        .with(1, SpaceId::new("A"))
        .with(2, SpaceId::new("A"))
        .with(3, SpaceId::new("B"))
        .with(4, SpaceId::new("B"))
        .with(5, SpaceId::new("C"))
        .with(6, SpaceId::new("END"));
    Board::builder()
        .space(
            SpaceDef::new("START")
                .starting()
                .with_movement(MovementDirective::Dice(table.clone())),
        )
        .space(
            SpaceDef::new("A")
                .with_movement(MovementDirective::Dice(table))
                .with_entry_effect(
                    VisitType::First,
                    EffectDirective::draw(DirectiveId(1), CardType::Work, 2)
                        .targeting(TargetSelector::OtherPlayerChoice),
                )
                .with_entry_effect(VisitType::Subsequent, EffectDirective::fee_percent(DirectiveId(2), 10))
                .negotiable(),
        )
        .space(
            SpaceDef::new("B")
                .with_movement(MovementDirective::Choice(vec![SpaceId::new("A"), SpaceId::new("C")]))
                .with_entry_effect(
                    VisitType::First,
                    EffectDirective::adjust_money(DirectiveId(3), -700).targeting(TargetSelector::AllPlayers),
                )
                .with_entry_effect(VisitType::Subsequent, EffectDirective::adjust_time(DirectiveId(4), 2).lasting(2)),
        )
        .space(
            SpaceDef::new("C")
                .with_movement(MovementDirective::Fixed(SpaceId::new("START")))
                .with_entry_effect(VisitType::First, EffectDirective::draw(DirectiveId(5), CardType::Expeditor, 1))
                .with_entry_effect(
                    VisitType::Subsequent,
                    EffectDirective::discard(DirectiveId(6), None, 1).targeting(TargetSelector::SpaceOccupants),
                ),
        )
        .space(SpaceDef::new("END").ending())
        .build()
        .unwrap()
}

fn catalog() -> CardCatalog {
    let mut catalog = CardCatalog::new();
    for n in 1..=CARDS_PER_DECK {
        catalog
            .register(CardDefinition::new(CardId::new(format!("W{n:03}")), "Work", CardType::Work))
            .unwrap();
        catalog
            .register(
                CardDefinition::new(CardId::new(format!("E{n:03}")), "Rush", CardType::Expeditor)
                    .with_cost(100)
                    .transferable()
                    .with_directive(EffectDirective::adjust_time(DirectiveId(100 + n as u32), -1)),
            )
            .unwrap();
    }
    catalog
}

/// Apply one input byte to the game. Invalid inputs are allowed to fail.
fn step(game: &mut TurnCoordinator, input: u8) {
    let s = game.snapshot();
    let active = s.active;
    let _ = match s.phase {
        TurnPhase::AwaitingRoll => game.roll_dice(active),
        TurnPhase::AwaitingChoice => {
            let pending = game.pending_choice().unwrap();
            let pick = pending.candidates[usize::from(input) % pending.candidates.len()].clone();
            game.resolve_choice(pending.id, pick)
        }
        TurnPhase::AwaitingAction => {
            let hand = &s.player(active).unwrap().hand;
            let card = hand.get(usize::from(input) % hand.len().max(1)).map(|c| c.card.clone());
            let other = PlayerId((active.0 + 1) % s.player_count() as u8);
            let action = match (input % 8, card) {
                (0, Some(card)) => Action::PlayCard(card),
                (1, Some(card)) => Action::DiscardCard(card),
                (2, Some(card)) => Action::TransferCard { card, to: other },
                (3, _) => Action::Negotiate,
                (4, _) if input > 250 => Action::Forfeit,
                _ => Action::EndTurn,
            };
            game.submit_action(active, action)
        }
        _ => return,
    };
}

fn run(seed: u64, players: usize, inputs: &[u8]) -> Vec<GameSnapshot> {
    let mut settings = GameSettings::new()
        .with_seed(seed)
        .with_starting_money(1_000)
        .with_opening_draw(CardType::Expeditor, 1);
    for n in 0..players {
        settings = settings.with_player(format!("P{n}"));
    }
    let mut game = TurnCoordinator::new(board(), catalog(), settings).unwrap();
    let mut seen = vec![GameSnapshot::clone(&game.snapshot())];
    for &input in inputs {
        step(&mut game, input);
        let current = game.snapshot();
        if seen.last() != Some(&*current) {
            seen.push(GameSnapshot::clone(&current));
        }
    }
    seen
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every committed snapshot is valid and conserves every deck.
    #[test]
    fn prop_committed_snapshots_are_valid(
        seed in any::<u64>(),
        players in 1usize..5,
        inputs in prop::collection::vec(any::<u8>(), 0..120),
    ) {
        for s in run(seed, players, &inputs) {
            prop_assert!(check_invariants(&s).is_empty());
            for (deck, pool) in s.decks.iter() {
                let held: usize = s
                    .players
                    .iter()
                    .map(|p| p.hand.iter().filter(|c| c.deck == *deck).count())
                    .sum();
                prop_assert_eq!(pool.remaining() + pool.discarded() + held, pool.size());
            }
            for player in s.players.iter() {
                prop_assert!(player.time >= 0);
                prop_assert!(player.money >= 0 || player.flags.debt_permitted);
            }
        }
    }

    /// Same seed, same inputs: same sequence of snapshots.
    #[test]
    fn prop_games_are_deterministic(
        seed in any::<u64>(),
        inputs in prop::collection::vec(any::<u8>(), 0..80),
    ) {
        prop_assert_eq!(run(seed, 3, &inputs), run(seed, 3, &inputs));
    }

    /// A finished game stays finished whatever comes next.
    #[test]
    fn prop_terminal_is_final(
        seed in any::<u64>(),
        inputs in prop::collection::vec(any::<u8>(), 0..200),
    ) {
        let seen = run(seed, 2, &inputs);
        if let Some(end) = seen.iter().position(|s| s.phase.is_terminal()) {
            prop_assert_eq!(end, seen.len() - 1);
        }
    }
}
