//! Snapshot invariants, checked before every commit.
//!
//! These are bug detectors. A transition that breaks one of them is
//! rejected by the store and the previous snapshot stays current.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::ids::PlayerId;
use super::phase::TurnPhase;
use super::player::PlayerStatus;
use super::snapshot::GameSnapshot;

/// A violated snapshot invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl InvariantViolation {
    /// Create a violation.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

/// Check all snapshot invariants.
///
/// Returns the violations found, or an empty list if all invariants hold.
#[must_use]
pub fn check_invariants(snapshot: &GameSnapshot) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    check_players(snapshot, &mut violations);
    check_card_conservation(snapshot, &mut violations);
    check_phase(snapshot, &mut violations);
    violations
}

fn check_players(snapshot: &GameSnapshot, violations: &mut Vec<InvariantViolation>) {
    if snapshot.players.is_empty() {
        violations.push(InvariantViolation::new("snapshot has no players"));
        return;
    }

    for (index, player) in snapshot.players.iter().enumerate() {
        if player.id.index() != index {
            violations.push(InvariantViolation::new(format!(
                "player at position {index} has id {}",
                player.id
            )));
        }
        if player.time < 0 {
            violations.push(InvariantViolation::new(format!(
                "{} has negative time {}",
                player.id, player.time
            )));
        }
        if player.money < 0 && !player.flags.debt_permitted {
            violations.push(InvariantViolation::new(format!(
                "{} has negative money {} without debt permission",
                player.id, player.money
            )));
        }
        if !player.visited.contains(&player.space) {
            violations.push(InvariantViolation::new(format!(
                "{} stands on unvisited space {}",
                player.id, player.space
            )));
        }
    }

    if snapshot.active.index() >= snapshot.players.len() {
        violations.push(InvariantViolation::new(format!(
            "active player {} does not exist",
            snapshot.active
        )));
    }
}

fn check_card_conservation(snapshot: &GameSnapshot, violations: &mut Vec<InvariantViolation>) {
    for (deck_id, pool) in snapshot.decks.iter() {
        let held: Vec<_> = snapshot
            .players
            .iter()
            .flat_map(|p| p.hand.iter())
            .filter(|c| c.deck == *deck_id)
            .map(|c| &c.card)
            .collect();

        let total = pool.remaining() + pool.discarded() + held.len();
        if total != pool.size() {
            violations.push(InvariantViolation::new(format!(
                "deck {deck_id}: {} in draw pile + {} discarded + {} held != size {}",
                pool.remaining(),
                pool.discarded(),
                held.len(),
                pool.size()
            )));
        }

        let mut seen = FxHashSet::default();
        for card in pool.draw_pile().iter().chain(pool.discard_pile().iter()).chain(held) {
            if !seen.insert(card) {
                violations.push(InvariantViolation::new(format!(
                    "deck {deck_id}: {card} is in two places"
                )));
            }
        }
    }

    for player in snapshot.players.iter() {
        for held in player.hand.iter() {
            if !snapshot.decks.contains_key(&held.deck) {
                violations.push(InvariantViolation::new(format!(
                    "{} holds {} from unknown deck {}",
                    player.id, held.card, held.deck
                )));
            }
        }
    }
}

fn check_phase(snapshot: &GameSnapshot, violations: &mut Vec<InvariantViolation>) {
    match snapshot.phase {
        TurnPhase::ResolvingEffects | TurnPhase::TurnComplete => {
            violations.push(InvariantViolation::new(format!(
                "transient phase {:?} committed",
                snapshot.phase
            )));
        }
        TurnPhase::GameWon(winner) => check_winner(snapshot, winner, violations),
        _ => {}
    }

    let awaiting = snapshot.phase == TurnPhase::AwaitingChoice;
    if awaiting == snapshot.choices.is_idle() {
        violations.push(InvariantViolation::new(format!(
            "phase {:?} with {} pending choice(s)",
            snapshot.phase,
            snapshot.choices.len()
        )));
    }

    if !snapshot.phase.is_terminal() {
        let active_playing = snapshot
            .players
            .get(snapshot.active.index())
            .is_some_and(|p| p.is_playing());
        if !active_playing {
            violations.push(InvariantViolation::new(format!(
                "active player {} is not playing",
                snapshot.active
            )));
        }
    }
}

fn check_winner(snapshot: &GameSnapshot, winner: PlayerId, violations: &mut Vec<InvariantViolation>) {
    if snapshot.winner != Some(winner) {
        violations.push(InvariantViolation::new(format!(
            "phase names {winner} as winner but winner is {:?}",
            snapshot.winner
        )));
    }
    let finished = snapshot
        .players
        .get(winner.index())
        .is_some_and(|p| p.status == PlayerStatus::Finished);
    if !finished {
        violations.push(InvariantViolation::new(format!("winner {winner} is not finished")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardRef, CardType, DeckPool};
    use crate::core::{CardId, GameRng, Player, SpaceId};
    use im::OrdMap;

    fn snapshot() -> GameSnapshot {
        let players = vec![
            Player::new(PlayerId(0), "A", SpaceId::new("START")),
            Player::new(PlayerId(1), "B", SpaceId::new("START")),
        ];
        let mut decks = OrdMap::new();
        decks.insert(
            CardType::Work,
            DeckPool::new(vec![CardId::new("W1"), CardId::new("W2"), CardId::new("W3")]),
        );
        GameSnapshot::new(players, decks, GameRng::new(0).state())
    }

    #[test]
    fn test_fresh_snapshot_is_valid() {
        assert!(check_invariants(&snapshot()).is_empty());
    }

    #[test]
    fn test_lost_card_detected() {
        let mut s = snapshot();
        let _ = s.deck_mut(CardType::Work).unwrap().draw();
        let violations = check_invariants(&s);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("!= size 3"));
    }

    #[test]
    fn test_duplicated_card_detected() {
        let mut s = snapshot();
        s.player_mut(PlayerId(0))
            .unwrap()
            .hand
            .push_back(CardRef::new(CardId::new("W1"), CardType::Work));
        let violations = check_invariants(&s);
        assert!(violations.iter().any(|v| v.message.contains("two places")));
    }

    #[test]
    fn test_negative_money_needs_permission() {
        let mut s = snapshot();
        s.player_mut(PlayerId(1)).unwrap().money = -5;
        assert_eq!(check_invariants(&s).len(), 1);

        s.player_mut(PlayerId(1)).unwrap().flags.debt_permitted = true;
        assert!(check_invariants(&s).is_empty());
    }

    #[test]
    fn test_transient_phase_rejected() {
        let mut s = snapshot();
        s.phase = TurnPhase::ResolvingEffects;
        assert!(!check_invariants(&s).is_empty());
    }

    #[test]
    fn test_awaiting_choice_needs_pending_choice() {
        let mut s = snapshot();
        s.phase = TurnPhase::AwaitingChoice;
        let violations = check_invariants(&s);
        assert!(violations[0].message.contains("0 pending"));
    }

    #[test]
    fn test_winner_must_be_finished() {
        let mut s = snapshot();
        s.phase = TurnPhase::GameWon(PlayerId(0));
        s.winner = Some(PlayerId(0));
        assert_eq!(check_invariants(&s).len(), 1);

        s.player_mut(PlayerId(0)).unwrap().status = PlayerStatus::Finished;
        assert!(check_invariants(&s).is_empty());
    }
}
