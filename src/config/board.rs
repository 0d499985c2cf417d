//! Typed board definition.
//!
//! ## Structure
//!
//! A [`Board`] is a set of [`SpaceDef`]s. Each space carries two rule
//! sets, one per [`VisitType`]: the movement directive, the entry effects
//! applied on arrival, the dice effects applied after rolling there, and
//! whether negotiation is allowed.
//!
//! Boards are built either programmatically with [`BoardBuilder`] or from
//! configuration rows with [`Board::from_tables`]. Both paths validate that
//! every movement destination exists.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

use super::coerce::{
    find_card_type, first_integer, is_blank, is_yes, parse_count, parse_duration, parse_percent,
    parse_quantity, parse_target, parse_visit_type, DirectiveIds,
};
use super::rows::{BoardTables, DiceEffectRow, MovementRow, SpaceEffectRow, SpaceRow};
use crate::cards::CardType;
use crate::core::{SpaceId, VisitType};
use crate::diagnostics::{Category, DiagnosticLog};
use crate::effects::{DirectiveKind, EffectDirective, Resource};
use crate::error::{EngineError, Result};
use crate::movement::{DiceTable, MovementDirective};

/// Rules for one visit type of a space.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisitRules {
    /// How a player leaves the space.
    pub movement: MovementDirective,
    /// Applied when the space is entered.
    pub entry_effects: Vec<EffectDirective>,
    /// Applied after a roll on the space, keyed by roll.
    pub dice_effects: BTreeMap<u8, Vec<EffectDirective>>,
    /// Negotiation (try again) allowed.
    pub negotiable: bool,
    /// Time charged when negotiating.
    pub try_again_penalty: i64,
}

/// A board space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpaceDef {
    /// Space name.
    pub id: SpaceId,
    /// Project phase the space belongs to (checked by card restrictions).
    pub phase: String,
    /// Path the space lies on.
    pub path: String,
    /// Players start here.
    pub starting: bool,
    /// Reaching this space wins the game.
    pub ending: bool,
    /// Leaving the space needs a dice roll.
    pub requires_dice_roll: bool,
    first: VisitRules,
    subsequent: VisitRules,
}

impl SpaceDef {
    /// Create a space with no effects that players stay on.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self {
            id: SpaceId::new(id),
            phase: String::new(),
            path: String::new(),
            starting: false,
            ending: false,
            requires_dice_roll: true,
            first: VisitRules::default(),
            subsequent: VisitRules::default(),
        }
    }

    /// Builder: set the phase.
    #[must_use]
    pub fn in_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// Builder: mark as a starting space.
    #[must_use]
    pub fn starting(mut self) -> Self {
        self.starting = true;
        self
    }

    /// Builder: mark as an ending space.
    #[must_use]
    pub fn ending(mut self) -> Self {
        self.ending = true;
        self
    }

    /// Builder: leaving the space does not roll.
    #[must_use]
    pub fn without_roll(mut self) -> Self {
        self.requires_dice_roll = false;
        self
    }

    /// Builder: same movement for both visit types.
    #[must_use]
    pub fn with_movement(mut self, movement: MovementDirective) -> Self {
        self.first.movement = movement.clone();
        self.subsequent.movement = movement;
        self
    }

    /// Builder: movement for one visit type.
    #[must_use]
    pub fn with_visit_movement(mut self, visit: VisitType, movement: MovementDirective) -> Self {
        self.rules_mut(visit).movement = movement;
        self
    }

    /// Builder: entry effect for one visit type.
    #[must_use]
    pub fn with_entry_effect(mut self, visit: VisitType, directive: EffectDirective) -> Self {
        self.rules_mut(visit).entry_effects.push(directive);
        self
    }

    /// Builder: dice effect for one visit type and roll.
    #[must_use]
    pub fn with_dice_effect(mut self, visit: VisitType, roll: u8, directive: EffectDirective) -> Self {
        self.rules_mut(visit)
            .dice_effects
            .entry(roll)
            .or_default()
            .push(directive);
        self
    }

    /// Builder: allow negotiation on both visit types.
    #[must_use]
    pub fn negotiable(mut self) -> Self {
        self.first.negotiable = true;
        self.subsequent.negotiable = true;
        self
    }

    /// Builder: allow trying again on one visit type for `time_penalty`.
    #[must_use]
    pub fn with_try_again(mut self, visit: VisitType, time_penalty: i64) -> Self {
        let rules = self.rules_mut(visit);
        rules.negotiable = true;
        rules.try_again_penalty = time_penalty;
        self
    }

    /// Rules for `visit`.
    #[must_use]
    pub fn rules(&self, visit: VisitType) -> &VisitRules {
        match visit {
            VisitType::First => &self.first,
            VisitType::Subsequent => &self.subsequent,
        }
    }

    /// Rules for `visit`, for editing.
    pub fn rules_mut(&mut self, visit: VisitType) -> &mut VisitRules {
        match visit {
            VisitType::First => &mut self.first,
            VisitType::Subsequent => &mut self.subsequent,
        }
    }

    /// Every directive defined on this space.
    pub fn directives(&self) -> impl Iterator<Item = &EffectDirective> {
        [&self.first, &self.subsequent].into_iter().flat_map(|rules| {
            rules
                .entry_effects
                .iter()
                .chain(rules.dice_effects.values().flatten())
        })
    }
}

/// The board: every space by name.
#[derive(Clone, Debug, Default)]
pub struct Board {
    spaces: FxHashMap<SpaceId, SpaceDef>,
    order: Vec<SpaceId>,
}

impl Board {
    /// Start building a board.
    #[must_use]
    pub fn builder() -> BoardBuilder {
        BoardBuilder::default()
    }

    /// Look up a space.
    pub fn space(&self, id: &SpaceId) -> Result<&SpaceDef> {
        self.spaces
            .get(id)
            .ok_or_else(|| EngineError::NotFound(format!("space {id}")))
    }

    /// Rules for a space and visit type.
    pub fn rules(&self, id: &SpaceId, visit: VisitType) -> Result<&VisitRules> {
        Ok(self.space(id)?.rules(visit))
    }

    /// Does the space exist?
    #[must_use]
    pub fn contains(&self, id: &SpaceId) -> bool {
        self.spaces.contains_key(id)
    }

    /// Number of spaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// No spaces?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Spaces in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &SpaceDef> {
        self.order.iter().filter_map(|id| self.spaces.get(id))
    }

    /// The first space flagged as starting, else the first space defined.
    pub fn starting_space(&self) -> Result<&SpaceId> {
        self.iter()
            .find(|s| s.starting)
            .or_else(|| self.iter().next())
            .map(|s| &s.id)
            .ok_or_else(|| EngineError::Config("board has no spaces".into()))
    }

    /// Check that every movement destination exists and directive ids are unique.
    pub fn validate(&self) -> Result<()> {
        let mut seen = rustc_hash::FxHashSet::default();
        for space in self.iter() {
            for visit in [VisitType::First, VisitType::Subsequent] {
                for destination in destinations(&space.rules(visit).movement) {
                    if !self.contains(destination) {
                        return Err(EngineError::Config(format!(
                            "{} moves to unknown space {destination}",
                            space.id
                        )));
                    }
                }
            }
            for directive in space.directives() {
                if let DirectiveKind::Move(movement) = &directive.kind {
                    if let Some(unknown) = destinations(movement).find(|d| !self.contains(d)) {
                        return Err(EngineError::Config(format!(
                            "{} on {} moves to unknown space {unknown}",
                            directive.id, space.id
                        )));
                    }
                }
                if !seen.insert(directive.id) {
                    return Err(EngineError::Config(format!(
                        "{} used twice on the board",
                        directive.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Build a board from configuration rows.
    ///
    /// Directive ids are taken from `ids`; lenient coercions are reported
    /// to `log`. Unknown tokens and references to undefined spaces are
    /// configuration errors.
    pub fn from_tables(
        tables: &BoardTables,
        ids: &mut DirectiveIds,
        log: &DiagnosticLog,
    ) -> Result<Board> {
        let mut builder = Board::builder();
        for row in &tables.spaces {
            builder = builder.space(space_from_row(row));
        }

        for row in &tables.content {
            let visit = parse_visit_type(&row.visit_type)?;
            builder.space_mut(&row.space_name)?.rules_mut(visit).negotiable =
                is_yes(&row.can_negotiate);
        }

        for row in &tables.movement {
            let visit = parse_visit_type(&row.visit_type)?;
            let movement = movement_from_row(row, tables, log)?;
            builder.space_mut(&row.space_name)?.rules_mut(visit).movement = movement;
        }

        for row in &tables.space_effects {
            let visit = parse_visit_type(&row.visit_type)?;
            let directives = space_effect_from_row(row, ids, log)?;
            let rules = builder.space_mut(&row.space_name)?.rules_mut(visit);
            for directive in directives {
                match directive.kind {
                    DirectiveKind::TryAgain { time_penalty } => {
                        rules.negotiable = true;
                        rules.try_again_penalty = time_penalty;
                    }
                    _ => rules.entry_effects.push(directive),
                }
            }
        }

        for row in &tables.dice_effects {
            let visit = parse_visit_type(&row.visit_type)?;
            let by_roll = dice_effects_from_row(row, ids, log)?;
            let rules = builder.space_mut(&row.space_name)?.rules_mut(visit);
            for (roll, directive) in by_roll {
                rules.dice_effects.entry(roll).or_default().push(directive);
            }
        }

        builder.build()
    }
}

fn destinations(movement: &MovementDirective) -> Box<dyn Iterator<Item = &SpaceId> + '_> {
    match movement {
        MovementDirective::Fixed(space) => Box::new(std::iter::once(space)),
        MovementDirective::Dice(table) => Box::new(table.iter().map(|(_, space)| space)),
        MovementDirective::Choice(spaces) => Box::new(spaces.iter()),
        MovementDirective::Stay => Box::new(std::iter::empty()),
    }
}

/// Programmatic board construction.
///
/// ## Example
///
/// ```
/// use rust_board::config::{Board, SpaceDef};
/// use rust_board::core::SpaceId;
/// use rust_board::movement::MovementDirective;
///
/// let board = Board::builder()
///     .space(SpaceDef::new("START").starting().with_movement(MovementDirective::Fixed(SpaceId::new("END"))))
///     .space(SpaceDef::new("END").ending())
///     .build()
///     .unwrap();
///
/// assert_eq!(board.starting_space().unwrap(), &SpaceId::new("START"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct BoardBuilder {
    board: Board,
    duplicate: Option<SpaceId>,
}

impl BoardBuilder {
    /// Add a space. A repeated name fails at `build`.
    #[must_use]
    pub fn space(mut self, space: SpaceDef) -> Self {
        if self.board.spaces.contains_key(&space.id) {
            self.duplicate.get_or_insert(space.id.clone());
            return self;
        }
        self.board.order.push(space.id.clone());
        self.board.spaces.insert(space.id.clone(), space);
        self
    }

    fn space_mut(&mut self, name: &str) -> Result<&mut SpaceDef> {
        let id = SpaceId::new(name);
        self.board
            .spaces
            .get_mut(&id)
            .ok_or_else(|| EngineError::Config(format!("row refers to undefined space {id}")))
    }

    /// Validate and finish.
    pub fn build(self) -> Result<Board> {
        if let Some(id) = self.duplicate {
            return Err(EngineError::Config(format!("space {id} defined twice")));
        }
        self.board.validate()?;
        Ok(self.board)
    }
}

fn space_from_row(row: &SpaceRow) -> SpaceDef {
    SpaceDef {
        phase: row.phase.trim().to_string(),
        path: row.path_type.trim().to_string(),
        starting: is_yes(&row.is_starting_space),
        ending: is_yes(&row.is_ending_space),
        requires_dice_roll: is_blank(&row.requires_dice_roll) || is_yes(&row.requires_dice_roll),
        ..SpaceDef::new(&row.space_name)
    }
}

fn movement_from_row(
    row: &MovementRow,
    tables: &BoardTables,
    log: &DiagnosticLog,
) -> Result<MovementDirective> {
    let named: Vec<SpaceId> = row
        .destinations()
        .into_iter()
        .filter(|d| !is_blank(d))
        .map(SpaceId::new)
        .collect();

    match row.movement_type.trim().to_ascii_lowercase().as_str() {
        "" | "none" | "stay" => Ok(MovementDirective::Stay),
        "fixed" => named
            .into_iter()
            .next()
            .map(MovementDirective::Fixed)
            .ok_or_else(|| {
                EngineError::Config(format!("fixed movement on {} has no destination", row.space_name.trim()))
            }),
        "choice" => Ok(MovementDirective::Choice(named)),
        "dice" => {
            let mut table = DiceTable::new();
            let outcomes = tables.dice_outcomes.iter().filter(|o| {
                SpaceId::new(&o.space_name) == SpaceId::new(&row.space_name)
                    && o.visit_type.trim().eq_ignore_ascii_case(row.visit_type.trim())
            });
            for outcome in outcomes {
                for (index, destination) in outcome.rolls().into_iter().enumerate() {
                    if !is_blank(destination) {
                        table.insert(index as u8 + 1, SpaceId::new(destination));
                    }
                }
            }
            if table.is_empty() {
                log.minimal(
                    Category::Coerce,
                    format!(
                        "dice movement on {} ({}) has no outcomes; every roll is unmapped",
                        row.space_name.trim(),
                        row.visit_type.trim()
                    ),
                );
            }
            Ok(MovementDirective::Dice(table))
        }
        other => Err(EngineError::Config(format!("unknown movement type {other:?}"))),
    }
}

fn space_effect_from_row(
    row: &SpaceEffectRow,
    ids: &mut DirectiveIds,
    log: &DiagnosticLog,
) -> Result<Vec<EffectDirective>> {
    let trigger = row.trigger_type.trim().to_ascii_lowercase();
    if !(trigger.is_empty() || trigger == "auto") {
        log.minimal(
            Category::Coerce,
            format!(
                "{}: {:?} trigger is not applied automatically, skipped",
                row.space_name.trim(),
                row.trigger_type.trim()
            ),
        );
        return Ok(Vec::new());
    }
    if !is_blank(&row.condition) {
        log.minimal(
            Category::Coerce,
            format!(
                "{}: condition {:?} is not evaluated, effect applies unconditionally",
                row.space_name.trim(),
                row.condition.trim()
            ),
        );
    }

    let field = format!("{} effect_value", row.space_name.trim());
    let target = parse_target(&row.target)?;
    let turns = parse_duration(&row.duration, "", &field, log);
    let kinds = effect_kinds(&row.effect_type, &row.effect_action, &row.effect_value, &field, log)?;

    Ok(kinds
        .into_iter()
        .map(|kind| {
            EffectDirective::new(ids.allocate(), kind)
                .targeting(target)
                .lasting(turns)
        })
        .collect())
}

/// Directive kinds for an effect type, action and value cell.
fn effect_kinds(
    effect_type: &str,
    action: &str,
    value: &str,
    field: &str,
    log: &DiagnosticLog,
) -> Result<Vec<DirectiveKind>> {
    let effect_type = effect_type.trim().to_ascii_lowercase();
    let action = action.trim().to_ascii_lowercase();
    let deducting = ["deduct", "subtract", "remove", "pay", "lose"]
        .iter()
        .any(|verb| action.starts_with(verb));
    let signed = |magnitude: i64| if deducting { -magnitude.abs() } else { magnitude };

    let kind = match effect_type.as_str() {
        "" => return Ok(Vec::new()),
        "time" | "days" | "ticks" => DirectiveKind::Adjust {
            resource: Resource::Time,
            amount: signed(parse_quantity(value, field, log)),
            allow_debt: false,
        },
        "money" => match parse_percent(value) {
            Some(percent) => DirectiveKind::PercentFee {
                percent: if deducting { percent.abs() } else { -percent.abs() },
            },
            None => DirectiveKind::Adjust {
                resource: Resource::Money,
                amount: signed(parse_quantity(value, field, log)),
                allow_debt: false,
            },
        },
        "fee" | "fees" => match parse_percent(value) {
            Some(percent) => DirectiveKind::PercentFee {
                percent: percent.abs(),
            },
            None => DirectiveKind::Adjust {
                resource: Resource::Money,
                amount: -parse_quantity(value, field, log).abs(),
                allow_debt: false,
            },
        },
        "try_again" | "try again" | "tryagain" => DirectiveKind::TryAgain {
            time_penalty: first_integer(value).unwrap_or(0).max(0),
        },
        "move" => DirectiveKind::Move(MovementDirective::Fixed(SpaceId::new(value))),
        cards if cards.contains("card") => {
            return card_kinds(cards, &action, value, field, log);
        }
        other => {
            return Err(EngineError::Config(format!("unknown effect type {other:?}")));
        }
    };
    Ok(vec![kind])
}

/// `cards` effects: `draw`, `discard`/`remove` or `replace` (discard then draw).
fn card_kinds(
    effect_type: &str,
    action: &str,
    value: &str,
    field: &str,
    log: &DiagnosticLog,
) -> Result<Vec<DirectiveKind>> {
    let deck = find_card_type(effect_type)
        .or_else(|| find_card_type(action))
        .or_else(|| find_card_type(value));
    let count = parse_count(value, field, log);

    let draw = |deck: Option<CardType>| -> Result<DirectiveKind> {
        let deck = deck.ok_or_else(|| {
            EngineError::Config(format!("{field}: card draw names no card type"))
        })?;
        Ok(DirectiveKind::Draw { deck, count })
    };

    if action.starts_with("draw") || action.is_empty() {
        Ok(vec![draw(deck)?])
    } else if action.starts_with("discard") || action.starts_with("remove") {
        Ok(vec![DirectiveKind::Discard { deck, count }])
    } else if action.starts_with("replace") {
        Ok(vec![DirectiveKind::Discard { deck, count }, draw(deck)?])
    } else {
        Err(EngineError::Config(format!("unknown card action {action:?}")))
    }
}

fn dice_effects_from_row(
    row: &DiceEffectRow,
    ids: &mut DirectiveIds,
    log: &DiagnosticLog,
) -> Result<Vec<(u8, EffectDirective)>> {
    let mut effects = Vec::new();
    let effect_type = if is_blank(&row.card_type) {
        row.effect_type.clone()
    } else {
        format!("{} {}", row.card_type.trim(), row.effect_type.trim())
    };

    for (index, cell) in row.rolls().into_iter().enumerate() {
        if is_blank(cell) {
            continue;
        }
        let roll = index as u8 + 1;
        let field = format!("{} roll_{roll}", row.space_name.trim());
        let lower = cell.to_ascii_lowercase();
        let action = if lower.contains("discard") || lower.contains("remove") {
            "discard"
        } else if lower.contains("replace") {
            "replace"
        } else if lower.starts_with('-') {
            "deduct"
        } else {
            ""
        };
        for kind in effect_kinds(&effect_type, action, cell, &field, log)? {
            effects.push((roll, EffectDirective::new(ids.allocate(), kind)));
        }
    }
    Ok(effects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::rows::{DiceOutcomeRow, SpaceContentRow};
    use crate::core::DirectiveId;
    use crate::effects::TargetSelector;

    fn space_row(name: &str, start: bool, end: bool) -> SpaceRow {
        SpaceRow {
            space_name: name.into(),
            phase: "SETUP".into(),
            is_starting_space: if start { "Yes" } else { "No" }.into(),
            is_ending_space: if end { "Yes" } else { "No" }.into(),
            ..SpaceRow::default()
        }
    }

    fn tables() -> BoardTables {
        BoardTables {
            spaces: vec![
                space_row("START", true, false),
                space_row("S", false, false),
                space_row("A", false, false),
                space_row("B", false, false),
                space_row("C", false, true),
            ],
            content: vec![SpaceContentRow {
                space_name: "S".into(),
                visit_type: "First".into(),
                can_negotiate: "YES".into(),
            }],
            movement: vec![
                MovementRow {
                    space_name: "START".into(),
                    visit_type: "First".into(),
                    movement_type: "fixed".into(),
                    destination_1: "S".into(),
                    ..MovementRow::default()
                },
                MovementRow {
                    space_name: "S".into(),
                    visit_type: "First".into(),
                    movement_type: "dice".into(),
                    ..MovementRow::default()
                },
            ],
            dice_outcomes: vec![DiceOutcomeRow {
                space_name: "S".into(),
                visit_type: "First".into(),
                roll_1: "A".into(),
                roll_2: "A".into(),
                roll_3: "B".into(),
                roll_4: "B".into(),
                roll_5: "C".into(),
                roll_6: "C".into(),
            }],
            space_effects: vec![
                SpaceEffectRow {
                    space_name: "S".into(),
                    visit_type: "First".into(),
                    effect_type: "time".into(),
                    effect_action: "add".into(),
                    effect_value: "5 days".into(),
                    trigger_type: "auto".into(),
                    ..SpaceEffectRow::default()
                },
                SpaceEffectRow {
                    space_name: "S".into(),
                    visit_type: "First".into(),
                    effect_type: "W_cards".into(),
                    effect_action: "draw".into(),
                    effect_value: "Draw 3".into(),
                    target: "OTHER_PLAYER_CHOICE".into(),
                    ..SpaceEffectRow::default()
                },
                SpaceEffectRow {
                    space_name: "S".into(),
                    visit_type: "First".into(),
                    effect_type: "fee".into(),
                    effect_action: "deduct".into(),
                    effect_value: "5%".into(),
                    ..SpaceEffectRow::default()
                },
            ],
            dice_effects: vec![DiceEffectRow {
                space_name: "S".into(),
                visit_type: "First".into(),
                effect_type: "cards".into(),
                card_type: "E".into(),
                roll_3: "Draw 2".into(),
                ..DiceEffectRow::default()
            }],
        }
    }

    #[test]
    fn test_from_tables() {
        let log = DiagnosticLog::new();
        let mut ids = DirectiveIds::new();
        let board = Board::from_tables(&tables(), &mut ids, &log).unwrap();

        assert_eq!(board.len(), 5);
        assert_eq!(board.starting_space().unwrap(), &SpaceId::new("START"));
        assert!(board.space(&SpaceId::new("C")).unwrap().ending);

        let s = board.rules(&SpaceId::new("S"), VisitType::First).unwrap();
        assert!(s.negotiable);
        let MovementDirective::Dice(table) = &s.movement else {
            panic!("expected dice movement");
        };
        assert_eq!(table.get(5), Some(&SpaceId::new("C")));
        assert_eq!(table.get(7), None);

        assert_eq!(s.entry_effects.len(), 3);
        assert_eq!(
            s.entry_effects[0].kind,
            DirectiveKind::Adjust {
                resource: Resource::Time,
                amount: 5,
                allow_debt: false
            }
        );
        assert_eq!(
            s.entry_effects[1].kind,
            DirectiveKind::Draw {
                deck: CardType::Work,
                count: 3
            }
        );
        assert_eq!(s.entry_effects[1].target, TargetSelector::OtherPlayerChoice);
        assert_eq!(s.entry_effects[2].kind, DirectiveKind::PercentFee { percent: 5 });

        let on_three = &s.dice_effects[&3];
        assert_eq!(
            on_three[0].kind,
            DirectiveKind::Draw {
                deck: CardType::Expeditor,
                count: 2
            }
        );
        assert!(log.entries().is_empty());

        let subsequent = board.rules(&SpaceId::new("S"), VisitType::Subsequent).unwrap();
        assert!(!subsequent.negotiable);
        assert_eq!(subsequent.movement, MovementDirective::Stay);
    }

    #[test]
    fn test_directive_ids_are_sequential() {
        let log = DiagnosticLog::new();
        let mut ids = DirectiveIds::new();
        let board = Board::from_tables(&tables(), &mut ids, &log).unwrap();
        let mut all: Vec<DirectiveId> = board.iter().flat_map(|s| s.directives()).map(|d| d.id).collect();
        all.sort();
        assert_eq!(all, (0..4).map(DirectiveId).collect::<Vec<_>>());
    }

    #[test]
    fn test_unknown_destination_rejected() {
        let mut t = tables();
        t.movement[0].destination_1 = "NOWHERE".into();
        let err = Board::from_tables(&t, &mut DirectiveIds::new(), &DiagnosticLog::new()).unwrap_err();
        assert!(matches!(err, EngineError::Config(msg) if msg.contains("NOWHERE")));
    }

    #[test]
    fn test_row_for_undefined_space_rejected() {
        let mut t = tables();
        t.content[0].space_name = "MISSING".into();
        assert!(Board::from_tables(&t, &mut DirectiveIds::new(), &DiagnosticLog::new()).is_err());
    }

    #[test]
    fn test_lenient_value_warns() {
        let mut t = tables();
        t.space_effects[0].effect_value = "a few days".into();
        let log = DiagnosticLog::new();
        let board = Board::from_tables(&t, &mut DirectiveIds::new(), &log).unwrap();

        let s = board.rules(&SpaceId::new("S"), VisitType::First).unwrap();
        assert!(matches!(
            s.entry_effects[0].kind,
            DirectiveKind::Adjust { amount: 0, .. }
        ));
        assert_eq!(log.entries_in(Category::Coerce).len(), 1);
    }

    #[test]
    fn test_unknown_effect_type_rejected() {
        let mut t = tables();
        t.space_effects[0].effect_type = "reputation".into();
        let err = Board::from_tables(&t, &mut DirectiveIds::new(), &DiagnosticLog::new()).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_manual_trigger_skipped() {
        let mut t = tables();
        t.space_effects[0].trigger_type = "manual".into();
        let log = DiagnosticLog::new();
        let board = Board::from_tables(&t, &mut DirectiveIds::new(), &log).unwrap();
        let s = board.rules(&SpaceId::new("S"), VisitType::First).unwrap();
        assert_eq!(s.entry_effects.len(), 2);
        assert_eq!(log.entries_in(Category::Coerce).len(), 1);
    }

    #[test]
    fn test_try_again_row_enables_negotiation() {
        let mut t = tables();
        t.space_effects.push(SpaceEffectRow {
            space_name: "B".into(),
            visit_type: "First".into(),
            effect_type: "try_again".into(),
            effect_value: "1 day".into(),
            ..SpaceEffectRow::default()
        });
        let board = Board::from_tables(&t, &mut DirectiveIds::new(), &DiagnosticLog::new()).unwrap();
        let b = board.rules(&SpaceId::new("B"), VisitType::First).unwrap();
        assert!(b.negotiable);
        assert_eq!(b.try_again_penalty, 1);
        assert!(b.entry_effects.is_empty());
    }

    #[test]
    fn test_builder_rejects_duplicates() {
        let err = Board::builder()
            .space(SpaceDef::new("A"))
            .space(SpaceDef::new("A"))
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_empty_board_has_no_start() {
        let board = Board::builder().build().unwrap();
        assert!(board.starting_space().is_err());
    }
}
