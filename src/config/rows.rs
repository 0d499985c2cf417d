//! Raw configuration rows.
//!
//! One struct per table, every field text, exactly as the table stores it.
//! Missing columns deserialize to empty strings. Nothing here interprets a
//! value; that is the job of [`super::coerce`].

use serde::{Deserialize, Serialize};

/// GAME_CONFIG: one row per space.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceRow {
    pub space_name: String,
    pub phase: String,
    pub path_type: String,
    pub is_starting_space: String,
    pub is_ending_space: String,
    pub requires_dice_roll: String,
}

/// SPACE_CONTENT: per-visit space properties.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceContentRow {
    pub space_name: String,
    pub visit_type: String,
    pub can_negotiate: String,
}

/// MOVEMENT: per-visit movement rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementRow {
    pub space_name: String,
    pub visit_type: String,
    pub movement_type: String,
    pub destination_1: String,
    pub destination_2: String,
    pub destination_3: String,
    pub destination_4: String,
    pub destination_5: String,
}

impl MovementRow {
    /// Destination columns in order.
    #[must_use]
    pub fn destinations(&self) -> [&str; 5] {
        [
            &self.destination_1,
            &self.destination_2,
            &self.destination_3,
            &self.destination_4,
            &self.destination_5,
        ]
    }
}

/// DICE_OUTCOMES: roll → destination for dice movement.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiceOutcomeRow {
    pub space_name: String,
    pub visit_type: String,
    pub roll_1: String,
    pub roll_2: String,
    pub roll_3: String,
    pub roll_4: String,
    pub roll_5: String,
    pub roll_6: String,
}

impl DiceOutcomeRow {
    /// Roll columns in order (index 0 is roll 1).
    #[must_use]
    pub fn rolls(&self) -> [&str; 6] {
        [
            &self.roll_1,
            &self.roll_2,
            &self.roll_3,
            &self.roll_4,
            &self.roll_5,
            &self.roll_6,
        ]
    }
}

/// SPACE_EFFECTS: directives applied on entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceEffectRow {
    pub space_name: String,
    pub visit_type: String,
    pub effect_type: String,
    pub effect_action: String,
    pub effect_value: String,
    pub condition: String,
    pub description: String,
    pub trigger_type: String,
    pub target: String,
    pub duration: String,
}

/// DICE_EFFECTS: roll-indexed directives applied after rolling.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiceEffectRow {
    pub space_name: String,
    pub visit_type: String,
    pub effect_type: String,
    pub card_type: String,
    pub roll_1: String,
    pub roll_2: String,
    pub roll_3: String,
    pub roll_4: String,
    pub roll_5: String,
    pub roll_6: String,
}

impl DiceEffectRow {
    /// Roll columns in order (index 0 is roll 1).
    #[must_use]
    pub fn rolls(&self) -> [&str; 6] {
        [
            &self.roll_1,
            &self.roll_2,
            &self.roll_3,
            &self.roll_4,
            &self.roll_5,
            &self.roll_6,
        ]
    }
}

/// CARDS: one row per card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardRow {
    pub card_id: String,
    pub card_name: String,
    pub card_type: String,
    pub description: String,
    pub cost: String,
    pub phase_restriction: String,
    pub duration: String,
    pub duration_count: String,
    pub money_effect: String,
    pub tick_modifier: String,
    /// Read when `tick_modifier` is blank.
    pub time_effect: String,
    pub draw_cards: String,
    pub discard_cards: String,
    pub target: String,
    pub scope: String,
    pub transferable: String,
    pub loan_amount: String,
    pub loan_rate: String,
    pub investment_amount: String,
    pub work_cost: String,
    pub money_cost: String,
    pub turn_effect: String,
    pub activation_timing: String,
}

/// Every board table, as loaded by the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardTables {
    pub spaces: Vec<SpaceRow>,
    pub content: Vec<SpaceContentRow>,
    pub movement: Vec<MovementRow>,
    pub dice_outcomes: Vec<DiceOutcomeRow>,
    pub space_effects: Vec<SpaceEffectRow>,
    pub dice_effects: Vec<DiceEffectRow>,
}
