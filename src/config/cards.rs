//! Card catalog from CARDS rows.
//!
//! Each non-blank effect column becomes one directive, in column order:
//! loan (`loan_amount` for Bank cards, `investment_amount` for Investor
//! cards) and its `loan_rate` interest, `money_effect`, `tick_modifier`
//! (or `time_effect`), `draw_cards`, `discard_cards`. The row's target,
//! scope and duration apply to all of them.
//!
//! A blank `cost` falls back to `work_cost` for Work cards, then to
//! `money_cost`.

use super::coerce::{
    find_card_type, is_blank, parse_card_type, parse_count, parse_duration, parse_flag,
    parse_percent, parse_quantity, parse_target, DirectiveIds,
};
use super::rows::CardRow;
use crate::cards::{CardCatalog, CardDefinition, CardType};
use crate::core::CardId;
use crate::diagnostics::{Category, DiagnosticLog};
use crate::effects::{DirectiveKind, EffectDirective, Resource, TargetSelector};
use crate::error::{EngineError, Result};

/// Coerce card rows into a catalog.
pub fn catalog_from_rows(
    rows: &[CardRow],
    ids: &mut DirectiveIds,
    log: &DiagnosticLog,
) -> Result<CardCatalog> {
    let mut catalog = CardCatalog::new();
    for row in rows {
        catalog.register(card_from_row(row, ids, log)?)?;
    }
    Ok(catalog)
}

/// Coerce one card row.
pub fn card_from_row(
    row: &CardRow,
    ids: &mut DirectiveIds,
    log: &DiagnosticLog,
) -> Result<CardDefinition> {
    if is_blank(&row.card_id) {
        return Err(EngineError::Config(format!(
            "card {:?} has no id",
            row.card_name.trim()
        )));
    }
    let id = CardId::new(&row.card_id);
    let card_type = parse_card_type(&row.card_type)?;
    let field = |column: &str| format!("{} {column}", id.as_str());

    let cost_column = match card_type {
        _ if !is_blank(&row.cost) => Some(("cost", &row.cost)),
        CardType::Work if !is_blank(&row.work_cost) => Some(("work_cost", &row.work_cost)),
        _ if !is_blank(&row.money_cost) => Some(("money_cost", &row.money_cost)),
        _ => None,
    };
    let cost = cost_column.map_or(0, |(column, text)| parse_quantity(text, &field(column), log));
    if cost < 0 {
        log.minimal(
            Category::Coerce,
            format!("{}: negative cost {cost}, using 0", field("cost")),
        );
    }

    let mut kinds = Vec::new();
    let loan_column = match card_type {
        CardType::Bank => Some(("loan_amount", &row.loan_amount)),
        CardType::Investor => Some(("investment_amount", &row.investment_amount)),
        _ => None,
    };
    if let Some((column, text)) = loan_column.filter(|(_, text)| !is_blank(text)) {
        let principal = parse_quantity(text, &field(column), log).max(0);
        if principal > 0 {
            kinds.push(DirectiveKind::Adjust {
                resource: Resource::Money,
                amount: principal,
                allow_debt: false,
            });
            let rate = if is_blank(&row.loan_rate) {
                0
            } else {
                parse_quantity(&row.loan_rate, &field("loan_rate"), log).max(0)
            };
            let interest = principal.saturating_mul(rate) / 100;
            if interest > 0 {
                kinds.push(DirectiveKind::Adjust {
                    resource: Resource::Money,
                    amount: -interest,
                    allow_debt: false,
                });
            }
        }
    }
    if !is_blank(&row.money_effect) {
        kinds.push(match parse_percent(&row.money_effect) {
            Some(percent) => DirectiveKind::PercentFee {
                percent: -percent,
            },
            None => DirectiveKind::Adjust {
                resource: Resource::Money,
                amount: parse_quantity(&row.money_effect, &field("money_effect"), log),
                allow_debt: false,
            },
        });
    }
    let time_column = if is_blank(&row.tick_modifier) {
        ("time_effect", &row.time_effect)
    } else {
        ("tick_modifier", &row.tick_modifier)
    };
    if !is_blank(time_column.1) {
        kinds.push(DirectiveKind::Adjust {
            resource: Resource::Time,
            amount: parse_quantity(time_column.1, &field(time_column.0), log),
            allow_debt: false,
        });
    }
    if !is_blank(&row.draw_cards) {
        kinds.push(DirectiveKind::Draw {
            deck: find_card_type(&row.draw_cards).unwrap_or(card_type),
            count: parse_count(&row.draw_cards, &field("draw_cards"), log),
        });
    }
    if !is_blank(&row.discard_cards) {
        kinds.push(DirectiveKind::Discard {
            deck: find_card_type(&row.discard_cards),
            count: parse_count(&row.discard_cards, &field("discard_cards"), log),
        });
    }

    let target = widen_by_scope(parse_target(&row.target)?, &row.scope, &field("scope"), log);
    let mut turns = parse_duration(&row.duration, &row.duration_count, &field("duration"), log);
    match activation_timing(&row.activation_timing) {
        Some(delay) => turns = turns.max(delay),
        None => log.minimal(
            Category::Coerce,
            format!(
                "{}: {:?} not supported, playing immediately",
                field("activation_timing"),
                row.activation_timing.trim()
            ),
        ),
    }
    if !is_blank(&row.turn_effect) {
        log.minimal(
            Category::Coerce,
            format!("{}: {:?} ignored", field("turn_effect"), row.turn_effect.trim()),
        );
    }

    let mut card = CardDefinition::new(id, row.card_name.trim(), card_type)
        .with_cost(cost.max(0))
        .with_description(row.description.trim())
        .with_phase_restriction(row.phase_restriction.as_str());
    if parse_flag(&row.transferable) {
        card = card.transferable();
    }
    for kind in kinds {
        card = card.with_directive(
            EffectDirective::new(ids.allocate(), kind)
                .targeting(target)
                .lasting(turns),
        );
    }
    Ok(card)
}

/// A card scoped to everyone reaches every playing player unless its
/// target already names a group.
fn widen_by_scope(target: TargetSelector, scope: &str, field: &str, log: &DiagnosticLog) -> TargetSelector {
    match scope.trim().to_ascii_lowercase().as_str() {
        "" | "single" | "individual" => target,
        "all" | "global" | "multiple" | "everyone" => match target {
            TargetSelector::SelfPlayer => TargetSelector::AllPlayers,
            other => other,
        },
        other => {
            log.minimal(Category::Coerce, format!("{field}: unknown scope {other:?}, ignored"));
            target
        }
    }
}

/// Turns to wait before the card's directives apply. `None` for timings
/// that are not understood.
fn activation_timing(text: &str) -> Option<u32> {
    let keyword: String = text
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    match keyword.as_str() {
        "" | "immediate" | "immediately" | "onplay" => Some(0),
        "nextturn" | "startofnextturn" => Some(1),
        _ => None,
    }
}
