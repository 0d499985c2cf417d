//! Rule predicates.
//!
//! `RulesEngine` answers questions about a snapshot: can a player pay, is
//! it their turn, may they negotiate here, have they won. It never
//! mutates anything.

use crate::config::Board;
use crate::core::{GameSnapshot, PlayerId, SpaceId, TurnPhase, VisitType};
use crate::error::Result;

/// Result of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// A player reached an ending space.
    Winner(PlayerId),
    /// Every player left the game before anyone finished.
    NoWinner,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, GameResult::Winner(p) if *p == player)
    }

    /// Result of a snapshot, if the game is over.
    #[must_use]
    pub fn of(snapshot: &GameSnapshot) -> Option<GameResult> {
        match snapshot.phase {
            TurnPhase::GameWon(player) => Some(GameResult::Winner(player)),
            TurnPhase::GameOver => Some(GameResult::NoWinner),
            _ => None,
        }
    }
}

/// Pure rule predicates over a board.
#[derive(Clone, Copy, Debug)]
pub struct RulesEngine<'a> {
    board: &'a Board,
}

impl<'a> RulesEngine<'a> {
    /// Create predicates for `board`.
    #[must_use]
    pub fn new(board: &'a Board) -> Self {
        Self { board }
    }

    /// Can `player` pay `cost`?
    pub fn can_afford(&self, snapshot: &GameSnapshot, player: PlayerId, cost: i64) -> Result<bool> {
        let player = snapshot.player(player)?;
        Ok(cost <= 0 || player.money >= cost || player.flags.debt_permitted)
    }

    /// Is it `player`'s turn?
    pub fn is_active_turn(&self, snapshot: &GameSnapshot, player: PlayerId) -> Result<bool> {
        let player = snapshot.player(player)?;
        Ok(snapshot.active == player.id && player.is_playing())
    }

    /// Is negotiation allowed on `space` for this visit type?
    pub fn can_negotiate(&self, space: &SpaceId, visit: VisitType) -> Result<bool> {
        Ok(self.board.rules(space, visit)?.negotiable)
    }

    /// Is `player` standing on an ending space?
    pub fn has_won(&self, snapshot: &GameSnapshot, player: PlayerId) -> Result<bool> {
        let player = snapshot.player(player)?;
        Ok(self.board.space(&player.space)?.ending)
    }

    /// First playing player on an ending space, checking `first` before the
    /// others in turn order.
    pub fn winner(&self, snapshot: &GameSnapshot, first: PlayerId) -> Result<Option<PlayerId>> {
        let order = std::iter::once(first).chain(
            snapshot
                .playing()
                .map(|p| p.id)
                .filter(move |id| *id != first),
        );
        for id in order {
            if snapshot.player(id)?.is_playing() && self.has_won(snapshot, id)? {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpaceDef;
    use crate::core::{GameRng, Player, PlayerStatus};
    use crate::error::EngineError;
    use im::OrdMap;

    fn board() -> Board {
        Board::builder()
            .space(SpaceDef::new("START").starting().negotiable())
            .space(SpaceDef::new("MID"))
            .space(SpaceDef::new("END").ending())
            .build()
            .unwrap()
    }

    fn snapshot() -> GameSnapshot {
        let players = (0..3)
            .map(|i| Player::new(PlayerId(i), format!("P{i}"), SpaceId::new("START")).with_money(100))
            .collect();
        GameSnapshot::new(players, OrdMap::new(), GameRng::new(0).state())
    }

    #[test]
    fn test_can_afford() {
        let board = board();
        let rules = RulesEngine::new(&board);
        let mut s = snapshot();
        assert_eq!(rules.can_afford(&s, PlayerId(0), 100), Ok(true));
        assert_eq!(rules.can_afford(&s, PlayerId(0), 101), Ok(false));

        s.player_mut(PlayerId(0)).unwrap().flags.debt_permitted = true;
        assert_eq!(rules.can_afford(&s, PlayerId(0), 101), Ok(true));
        assert!(matches!(
            rules.can_afford(&s, PlayerId(7), 1),
            Err(EngineError::NotFound(_))
        ));
    }

    #[test]
    fn test_is_active_turn() {
        let board = board();
        let rules = RulesEngine::new(&board);
        let s = snapshot();
        assert_eq!(rules.is_active_turn(&s, PlayerId(0)), Ok(true));
        assert_eq!(rules.is_active_turn(&s, PlayerId(1)), Ok(false));
    }

    #[test]
    fn test_can_negotiate() {
        let board = board();
        let rules = RulesEngine::new(&board);
        assert_eq!(rules.can_negotiate(&SpaceId::new("START"), VisitType::First), Ok(true));
        assert_eq!(rules.can_negotiate(&SpaceId::new("MID"), VisitType::First), Ok(false));
        assert!(rules
            .can_negotiate(&SpaceId::new("NOWHERE"), VisitType::First)
            .is_err());
    }

    #[test]
    fn test_winner_prefers_given_player() {
        let board = board();
        let rules = RulesEngine::new(&board);
        let mut s = snapshot();
        assert_eq!(rules.winner(&s, PlayerId(0)), Ok(None));

        s.player_mut(PlayerId(1)).unwrap().relocate(SpaceId::new("END"));
        s.player_mut(PlayerId(2)).unwrap().relocate(SpaceId::new("END"));
        assert_eq!(rules.winner(&s, PlayerId(0)), Ok(Some(PlayerId(1))));
        assert_eq!(rules.winner(&s, PlayerId(2)), Ok(Some(PlayerId(2))));

        s.player_mut(PlayerId(1)).unwrap().status = PlayerStatus::Eliminated;
        assert_eq!(rules.winner(&s, PlayerId(0)), Ok(Some(PlayerId(2))));
    }

    #[test]
    fn test_game_result() {
        let mut s = snapshot();
        assert_eq!(GameResult::of(&s), None);
        s.phase = TurnPhase::GameWon(PlayerId(2));
        let result = GameResult::of(&s).unwrap();
        assert!(result.is_winner(PlayerId(2)));
        assert!(!result.is_winner(PlayerId(0)));
    }
}
