//! The coercion layer: text cells to typed values.
//!
//! This is the only place that tolerates loosely-typed input.
//!
//! ## Lenient
//!
//! - Quantities: the first integer embedded in the text is used
//!   (`"Draw 3"` is 3, `"$1,500"` is 1500, `"-2 days"` is -2). Text
//!   without any integer yields 0 and a `coerce` warning.
//! - Yes/no cells: only `yes` (any case) is true.
//!
//! ## Strict
//!
//! Enumerated tokens (card types, visit types, target selectors, effect
//! and movement types) must be recognised. An unknown token is a
//! [`EngineError::Config`] error: the configuration is wrong and the game
//! should not start.

use crate::cards::CardType;
use crate::core::{DirectiveId, VisitType};
use crate::diagnostics::{Category, DiagnosticLog};
use crate::effects::TargetSelector;
use crate::error::{EngineError, Result};

/// Hands out directive ids while a configuration is being coerced.
#[derive(Clone, Debug, Default)]
pub struct DirectiveIds {
    next: u32,
}

impl DirectiveIds {
    /// Start at id 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start after ids already in use.
    #[must_use]
    pub fn starting_at(next: u32) -> Self {
        Self { next }
    }

    /// Allocate the next id.
    pub fn allocate(&mut self) -> DirectiveId {
        let id = DirectiveId(self.next);
        self.next += 1;
        id
    }
}

/// Is the cell empty?
#[must_use]
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// First integer embedded in `text`.
///
/// A `-` immediately before the digits (or before a `$` sign preceding
/// them) makes the value negative. Commas between digit groups are
/// thousands separators. Runs too long for an `i64` saturate.
#[must_use]
pub fn first_integer(text: &str) -> Option<i64> {
    scan_integer(text).map(|(value, _)| value)
}

/// The first integer and whether it had to be saturated to fit an `i64`.
fn scan_integer(text: &str) -> Option<(i64, bool)> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;

    let negative = match start.checked_sub(1).map(|i| bytes[i]) {
        Some(b'-') => true,
        Some(b'$') => start >= 2 && bytes[start - 2] == b'-',
        _ => false,
    };

    let mut magnitude: i64 = 0;
    let mut overflowed = false;
    let mut index = start;
    while index < bytes.len() {
        match bytes[index] {
            b if b.is_ascii_digit() => {
                let digit = i64::from(b - b'0');
                match magnitude.checked_mul(10).and_then(|m| m.checked_add(digit)) {
                    Some(next) => magnitude = next,
                    None => {
                        magnitude = i64::MAX;
                        overflowed = true;
                    }
                }
            }
            b',' if bytes.get(index + 1).is_some_and(u8::is_ascii_digit) => {}
            _ => break,
        }
        index += 1;
    }

    Some((if negative { -magnitude } else { magnitude }, overflowed))
}

/// Quantity from a value expression, defaulting to 0 with a warning.
///
/// Values too large for an `i64` saturate, also with a warning.
pub fn parse_quantity(text: &str, field: &str, log: &DiagnosticLog) -> i64 {
    match scan_integer(text) {
        Some((value, false)) => value,
        Some((value, true)) => {
            log.minimal(
                Category::Coerce,
                format!("{field}: {:?} overflows, using {value}", text.trim()),
            );
            value
        }
        None => {
            log.minimal(
                Category::Coerce,
                format!("{field}: no number in {:?}, using 0", text.trim()),
            );
            0
        }
    }
}

/// Non-negative count from a value expression.
pub fn parse_count(text: &str, field: &str, log: &DiagnosticLog) -> usize {
    let value = parse_quantity(text, field, log);
    usize::try_from(value.unsigned_abs()).unwrap_or(usize::MAX)
}

/// Percentage from text such as `"5%"`. `None` if the text has no `%`.
#[must_use]
pub fn parse_percent(text: &str) -> Option<i64> {
    if text.contains('%') {
        first_integer(text)
    } else {
        None
    }
}

/// Case-insensitive `yes`.
#[must_use]
pub fn is_yes(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("yes")
}

/// Yes/no style flag: `yes`, `true`, `y` or `1` (any case).
#[must_use]
pub fn parse_flag(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "yes" | "y" | "true" | "1"
    )
}

/// Card type from a code (`W`) or name (`Work`).
pub fn parse_card_type(text: &str) -> Result<CardType> {
    find_card_type_token(text.trim())
        .ok_or_else(|| EngineError::Config(format!("unknown card type {:?}", text.trim())))
}

/// Card type mentioned anywhere in `text`, e.g. `"Draw 2 W cards"`.
#[must_use]
pub fn find_card_type(text: &str) -> Option<CardType> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .find_map(find_card_type_token)
}

fn find_card_type_token(token: &str) -> Option<CardType> {
    let lower = token.to_ascii_lowercase();
    CardType::ALL.into_iter().find(|t| {
        (token.len() == 1 && token.eq_ignore_ascii_case(&t.code().to_string())) || lower == t.name()
    })
}

/// Visit type: `First` or `Subsequent`.
pub fn parse_visit_type(text: &str) -> Result<VisitType> {
    match text.trim().to_ascii_lowercase().as_str() {
        "first" => Ok(VisitType::First),
        "subsequent" => Ok(VisitType::Subsequent),
        other => Err(EngineError::Config(format!("unknown visit type {other:?}"))),
    }
}

/// Target selector token such as `OTHER_PLAYER_CHOICE`. Blank is the actor.
pub fn parse_target(text: &str) -> Result<TargetSelector> {
    let normalized: String = text
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    match normalized.as_str() {
        "" | "self" | "selfplayer" | "currentplayer" => Ok(TargetSelector::SelfPlayer),
        "otherplayerchoice" | "chooseplayer" | "otherplayer" => Ok(TargetSelector::OtherPlayerChoice),
        "allothers" | "allotherplayers" => Ok(TargetSelector::AllOthers),
        "spaceoccupants" | "samespace" => Ok(TargetSelector::SpaceOccupants),
        "allplayers" | "all" => Ok(TargetSelector::AllPlayers),
        _ => Err(EngineError::Config(format!("unknown target {:?}", text.trim()))),
    }
}

/// Number of turns a directive is deferred by.
///
/// `count` wins over `duration` when both are present; blank,
/// `Immediate` and `Permanent` durations mean zero.
pub fn parse_duration(duration: &str, count: &str, field: &str, log: &DiagnosticLog) -> u32 {
    let text = if is_blank(count) { duration } else { count };
    let keyword = text.trim().to_ascii_lowercase();
    if keyword.is_empty() || keyword == "immediate" || keyword == "permanent" {
        return 0;
    }
    u32::try_from(parse_count(text, field, log)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_integer() {
        assert_eq!(first_integer("Draw 3"), Some(3));
        assert_eq!(first_integer("3 cards, then 2"), Some(3));
        assert_eq!(first_integer("$1,500"), Some(1500));
        assert_eq!(first_integer("-2 days"), Some(-2));
        assert_eq!(first_integer("pay -$500"), Some(-500));
        assert_eq!(first_integer("1,2"), Some(12));
        assert_eq!(first_integer("one, two"), None);
        assert_eq!(first_integer("W-3"), Some(-3));
        assert_eq!(first_integer("a 7,"), Some(7));
    }

    #[test]
    fn test_parse_quantity_defaults_with_warning() {
        let log = DiagnosticLog::new();
        assert_eq!(parse_quantity("Draw some", "effect_value", &log), 0);
        let warnings = log.entries_in(Category::Coerce);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("Draw some"));

        assert_eq!(parse_quantity("Draw 3", "effect_value", &log), 3);
        assert_eq!(log.entries().len(), 1);
    }

    #[test]
    fn test_oversized_numbers_saturate_with_warning() {
        assert_eq!(first_integer("99999999999999999999"), Some(i64::MAX));
        assert_eq!(first_integer("-$99,999,999,999,999,999,999"), Some(-i64::MAX));

        let log = DiagnosticLog::new();
        assert_eq!(parse_quantity("$123456789012345678901", "cost", &log), i64::MAX);
        let warnings = log.entries_in(Category::Coerce);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("overflows"));
    }

    #[test]
    fn test_parse_count_ignores_sign() {
        let log = DiagnosticLog::new();
        assert_eq!(parse_count("-2", "discard_cards", &log), 2);
    }

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent("5%"), Some(5));
        assert_eq!(parse_percent("5"), None);
    }

    #[test]
    fn test_yes_is_case_insensitive_and_exact() {
        assert!(is_yes("YES"));
        assert!(is_yes(" yes "));
        assert!(!is_yes("y"));
        assert!(!is_yes("No"));
        assert!(parse_flag("y"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_card_types() {
        assert_eq!(parse_card_type("W").unwrap(), CardType::Work);
        assert_eq!(parse_card_type(" expeditor ").unwrap(), CardType::Expeditor);
        assert!(matches!(parse_card_type("X"), Err(EngineError::Config(_))));
        assert_eq!(find_card_type("Draw 2 b cards"), Some(CardType::Bank));
        assert_eq!(find_card_type("Draw 2 cards"), None);
    }

    #[test]
    fn test_visit_and_target_tokens() {
        assert_eq!(parse_visit_type("Subsequent").unwrap(), VisitType::Subsequent);
        assert!(parse_visit_type("second").is_err());
        assert_eq!(
            parse_target("OTHER_PLAYER_CHOICE").unwrap(),
            TargetSelector::OtherPlayerChoice
        );
        assert_eq!(parse_target("All Others").unwrap(), TargetSelector::AllOthers);
        assert_eq!(parse_target("").unwrap(), TargetSelector::SelfPlayer);
        assert!(parse_target("the bank").is_err());
    }

    #[test]
    fn test_duration() {
        let log = DiagnosticLog::new();
        assert_eq!(parse_duration("", "", "duration", &log), 0);
        assert_eq!(parse_duration("Turns", "3", "duration", &log), 3);
        assert_eq!(parse_duration("2 turns", "", "duration", &log), 2);
        assert_eq!(parse_duration("Permanent", "", "duration", &log), 0);
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_directive_ids() {
        let mut ids = DirectiveIds::starting_at(10);
        assert_eq!(ids.allocate(), DirectiveId(10));
        assert_eq!(ids.allocate(), DirectiveId(11));
    }
}
