//! Session settings.
//!
//! Everything about a game that is not board or card data: who plays,
//! what they start with, the dice and the diagnostics level.

use serde::{Deserialize, Serialize};

use crate::cards::DeckId;
use crate::core::{Controller, SpaceId};
use crate::diagnostics::Verbosity;
use crate::error::{EngineError, Result};

/// One seat at the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// Display name.
    pub name: String,
    /// Who makes this player's decisions.
    pub controller: Controller,
}

/// Settings for one game session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Players in turn order.
    pub seats: Vec<Seat>,
    /// Money each player starts with.
    pub starting_money: i64,
    /// Time each player starts with.
    pub starting_time: i64,
    /// Start here instead of the board's starting space.
    pub start_space: Option<SpaceId>,
    /// Dice seed.
    pub seed: u64,
    /// Faces on the die.
    pub die_sides: u8,
    /// Shuffle every deck at setup.
    pub shuffle_decks: bool,
    /// Cards each player draws at setup, per deck.
    pub opening_draws: Vec<(DeckId, usize)>,
    /// Diagnostics written to stderr.
    pub verbosity: Verbosity,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            seats: Vec::new(),
            starting_money: 0,
            starting_time: 0,
            start_space: None,
            seed: 0,
            die_sides: 6,
            shuffle_decks: true,
            opening_draws: Vec::new(),
            verbosity: Verbosity::Silent,
        }
    }
}

impl GameSettings {
    /// Settings with no players yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a human player.
    #[must_use]
    pub fn with_player(self, name: impl Into<String>) -> Self {
        self.with_seat(name, Controller::Human)
    }

    /// Add an AI player.
    #[must_use]
    pub fn with_ai_player(self, name: impl Into<String>) -> Self {
        self.with_seat(name, Controller::Ai)
    }

    /// Add a player with an explicit controller.
    #[must_use]
    pub fn with_seat(mut self, name: impl Into<String>, controller: Controller) -> Self {
        self.seats.push(Seat {
            name: name.into(),
            controller,
        });
        self
    }

    /// Set starting money.
    #[must_use]
    pub fn with_starting_money(mut self, money: i64) -> Self {
        self.starting_money = money;
        self
    }

    /// Set starting time.
    #[must_use]
    pub fn with_starting_time(mut self, time: i64) -> Self {
        self.starting_time = time;
        self
    }

    /// Override the starting space.
    #[must_use]
    pub fn with_start_space(mut self, space: impl AsRef<str>) -> Self {
        self.start_space = Some(SpaceId::new(space));
        self
    }

    /// Set the dice seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of die faces.
    #[must_use]
    pub fn with_die_sides(mut self, sides: u8) -> Self {
        self.die_sides = sides;
        self
    }

    /// Keep decks in catalog order.
    #[must_use]
    pub fn without_shuffle(mut self) -> Self {
        self.shuffle_decks = false;
        self
    }

    /// Deal `count` cards from `deck` to every player at setup.
    #[must_use]
    pub fn with_opening_draw(mut self, deck: DeckId, count: usize) -> Self {
        self.opening_draws.push((deck, count));
        self
    }

    /// Set stderr verbosity.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Number of players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    /// Check the settings can start a game.
    pub fn validate(&self) -> Result<()> {
        if self.seats.is_empty() {
            return Err(EngineError::Config("a game needs at least one player".into()));
        }
        if self.seats.len() > usize::from(u8::MAX) {
            return Err(EngineError::Config(format!(
                "at most {} players supported",
                u8::MAX
            )));
        }
        if self.die_sides == 0 {
            return Err(EngineError::Config("the die needs at least one face".into()));
        }
        if self.starting_money < 0 || self.starting_time < 0 {
            return Err(EngineError::Config("starting resources cannot be negative".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardType;

    #[test]
    fn test_builder() {
        let settings = GameSettings::new()
            .with_player("Ann")
            .with_ai_player("Bot")
            .with_starting_money(10_000)
            .with_seed(99)
            .with_opening_draw(CardType::Work, 2);

        assert_eq!(settings.player_count(), 2);
        assert_eq!(settings.seats[1].controller, Controller::Ai);
        assert_eq!(settings.die_sides, 6);
        assert_eq!(settings.opening_draws, vec![(CardType::Work, 2)]);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_no_players_rejected() {
        let err = GameSettings::new().validate().unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_zero_sided_die_rejected() {
        let settings = GameSettings::new().with_player("Ann").with_die_sides(0);
        assert!(settings.validate().is_err());
    }
}
