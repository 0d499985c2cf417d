//! Effect directives: the typed instructions the engine applies.
//!
//! Directives are produced once, at the configuration boundary, from
//! loosely-typed table rows (see [`crate::config::coerce`]). By the time a
//! directive reaches the engine every quantity is an integer and every
//! token has been resolved to a variant.

use serde::{Deserialize, Serialize};

use super::targeting::TargetSelector;
use crate::cards::DeckId;
use crate::core::{DirectiveId, SpaceId};
use crate::movement::MovementDirective;

/// A player resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    /// Money balance.
    Money,
    /// Elapsed time.
    Time,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Money => f.write_str("money"),
            Resource::Time => f.write_str("time"),
        }
    }
}

/// What a directive does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectiveKind {
    /// Add `amount` (possibly negative) to a resource.
    ///
    /// A balance that would go negative is clamped to zero, unless
    /// `allow_debt` is set for money.
    Adjust {
        /// Resource to change.
        resource: Resource,
        /// Signed change.
        amount: i64,
        /// Money may go below zero.
        allow_debt: bool,
    },
    /// Deduct `percent` of the target's current money (rounded down).
    PercentFee {
        /// Whole percent.
        percent: i64,
    },
    /// Draw up to `count` cards from `deck`.
    Draw {
        /// Pool to draw from.
        deck: DeckId,
        /// Cards wanted.
        count: usize,
    },
    /// Discard up to `count` held cards, oldest first.
    Discard {
        /// Only cards from this deck; `None` means any.
        deck: Option<DeckId>,
        /// Cards to give up.
        count: usize,
    },
    /// Change the target's position.
    Move(MovementDirective),
    /// Roll the turn back to the arrival checkpoint.
    TryAgain {
        /// Time added after the rollback.
        time_penalty: i64,
    },
}

impl std::fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectiveKind::Adjust {
                resource, amount, ..
            } => write!(f, "{resource} {amount:+}"),
            DirectiveKind::PercentFee { percent } => write!(f, "fee {percent}%"),
            DirectiveKind::Draw { deck, count } => write!(f, "draw {count} {deck}"),
            DirectiveKind::Discard { deck: Some(deck), count } => {
                write!(f, "discard {count} {deck}")
            }
            DirectiveKind::Discard { deck: None, count } => write!(f, "discard {count}"),
            DirectiveKind::Move(movement) => write!(f, "move {movement}"),
            DirectiveKind::TryAgain { time_penalty } => {
                write!(f, "try again (+{time_penalty} time)")
            }
        }
    }
}

/// When a directive takes effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Duration {
    /// Applied during the pass that dispatches it.
    #[default]
    Immediate,
    /// Applied `n` global turns after the current one.
    Turns(u32),
}

/// A single typed instruction.
///
/// ## Example
///
/// ```
/// use rust_board::cards::CardType;
/// use rust_board::core::DirectiveId;
/// use rust_board::effects::{Duration, EffectDirective, TargetSelector};
///
/// let gift = EffectDirective::draw(DirectiveId::new(7), CardType::Work, 3)
///     .targeting(TargetSelector::OtherPlayerChoice);
///
/// assert_eq!(gift.target, TargetSelector::OtherPlayerChoice);
/// assert_eq!(gift.duration, Duration::Immediate);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDirective {
    /// Identity used by the applied-effect log.
    pub id: DirectiveId,
    /// What to do.
    pub kind: DirectiveKind,
    /// Who to do it to.
    pub target: TargetSelector,
    /// When to do it.
    pub duration: Duration,
}

impl EffectDirective {
    /// Create an immediate directive aimed at the actor.
    #[must_use]
    pub fn new(id: DirectiveId, kind: DirectiveKind) -> Self {
        Self {
            id,
            kind,
            target: TargetSelector::SelfPlayer,
            duration: Duration::Immediate,
        }
    }

    /// Money change; negative balances are clamped.
    #[must_use]
    pub fn adjust_money(id: DirectiveId, amount: i64) -> Self {
        Self::new(
            id,
            DirectiveKind::Adjust {
                resource: Resource::Money,
                amount,
                allow_debt: false,
            },
        )
    }

    /// Time change.
    #[must_use]
    pub fn adjust_time(id: DirectiveId, amount: i64) -> Self {
        Self::new(
            id,
            DirectiveKind::Adjust {
                resource: Resource::Time,
                amount,
                allow_debt: false,
            },
        )
    }

    /// Percentage fee on money.
    #[must_use]
    pub fn fee_percent(id: DirectiveId, percent: i64) -> Self {
        Self::new(id, DirectiveKind::PercentFee { percent })
    }

    /// Draw from a deck.
    #[must_use]
    pub fn draw(id: DirectiveId, deck: DeckId, count: usize) -> Self {
        Self::new(id, DirectiveKind::Draw { deck, count })
    }

    /// Discard from hand.
    #[must_use]
    pub fn discard(id: DirectiveId, deck: Option<DeckId>, count: usize) -> Self {
        Self::new(id, DirectiveKind::Discard { deck, count })
    }

    /// Fixed relocation.
    #[must_use]
    pub fn move_to(id: DirectiveId, space: SpaceId) -> Self {
        Self::new(id, DirectiveKind::Move(MovementDirective::Fixed(space)))
    }

    /// Roll back to the arrival checkpoint.
    #[must_use]
    pub fn try_again(id: DirectiveId, time_penalty: i64) -> Self {
        Self::new(id, DirectiveKind::TryAgain { time_penalty })
    }

    /// Builder: set the target selector.
    #[must_use]
    pub fn targeting(mut self, target: TargetSelector) -> Self {
        self.target = target;
        self
    }

    /// Builder: defer by `turns` global turns. Zero keeps it immediate.
    #[must_use]
    pub fn lasting(mut self, turns: u32) -> Self {
        self.duration = if turns == 0 {
            Duration::Immediate
        } else {
            Duration::Turns(turns)
        };
        self
    }

    /// Builder: allow the money balance to go negative.
    #[must_use]
    pub fn allowing_debt(mut self) -> Self {
        if let DirectiveKind::Adjust {
            resource: Resource::Money,
            allow_debt,
            ..
        } = &mut self.kind
        {
            *allow_debt = true;
        }
        self
    }

    /// The same directive, to be applied immediately.
    #[must_use]
    pub fn immediate(&self) -> Self {
        Self {
            duration: Duration::Immediate,
            ..self.clone()
        }
    }
}

impl std::fmt::Display for EffectDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] -> {:?}", self.id, self.kind, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardType;

    #[test]
    fn test_lasting_zero_is_immediate() {
        let d = EffectDirective::adjust_time(DirectiveId(1), 2).lasting(0);
        assert_eq!(d.duration, Duration::Immediate);
        let d = d.lasting(3);
        assert_eq!(d.duration, Duration::Turns(3));
        assert_eq!(d.immediate().duration, Duration::Immediate);
        assert_eq!(d.immediate().id, d.id);
    }

    #[test]
    fn test_allowing_debt_only_affects_money() {
        let loan = EffectDirective::adjust_money(DirectiveId(1), -500).allowing_debt();
        assert!(matches!(
            loan.kind,
            DirectiveKind::Adjust { allow_debt: true, .. }
        ));

        let time = EffectDirective::adjust_time(DirectiveId(2), -5).allowing_debt();
        assert!(matches!(
            time.kind,
            DirectiveKind::Adjust { allow_debt: false, .. }
        ));
    }

    #[test]
    fn test_display() {
        let d = EffectDirective::draw(DirectiveId(4), CardType::Expeditor, 2);
        assert_eq!(d.kind.to_string(), "draw 2 E");
        let fee = EffectDirective::fee_percent(DirectiveId(5), 5);
        assert_eq!(fee.kind.to_string(), "fee 5%");
    }
}
