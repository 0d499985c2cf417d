//! Effect passes: applying a directive list to a snapshot.
//!
//! ## Pass semantics
//!
//! A pass applies an [`EffectBatch`] in declaration order. For each
//! directive:
//!
//! 1. Skip it if `(pass, directive)` is already in the effect log.
//! 2. A lasting directive is scheduled for `turn + n` instead of applied.
//! 3. Resolve targets. `OtherPlayerChoice` with several candidates offers a
//!    choice and suspends the pass; one candidate applies at once.
//! 4. Apply the directive to every target. A directive move may also
//!    suspend the pass for a destination choice.
//! 5. Record `(pass, directive)` in the log and the turn record.
//!
//! A suspended pass is stored in the pending choice as a [`Resume`] and
//! continues from the same directive once the choice is resolved.

use serde::{Deserialize, Serialize};
use smallvec::smallvec;

use super::directive::{DirectiveKind, Duration, EffectDirective, Resource};
use super::targeting::{TargetList, Targets};
use crate::cards::{CardCatalog, CardLifecycle};
use crate::choice::{Candidate, ChoiceContext, Offer, Resume};
use crate::config::Board;
use crate::core::{
    AppliedEffect, ChoiceId, DeferredDirective, GameSnapshot, PassId, PlayerId, Stage, TurnPhase,
};
use crate::diagnostics::{Category, DiagnosticLog};
use crate::error::{EngineError, Result};
use crate::movement::{MoveResolution, MovementResolver};

/// Directives applied together under one pass id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectBatch {
    /// Effect-log key of this pass.
    pub pass: PassId,
    /// Player the directives act for.
    pub actor: PlayerId,
    /// Directives in declaration order.
    pub directives: Vec<EffectDirective>,
    /// A try-again directive rolls the turn back to its checkpoint.
    /// Without a checkpoint it is skipped.
    pub rollback: bool,
}

impl EffectBatch {
    /// Create a batch.
    #[must_use]
    pub fn new(pass: PassId, actor: PlayerId, directives: Vec<EffectDirective>) -> Self {
        Self {
            pass,
            actor,
            directives,
            rollback: false,
        }
    }

    /// Builder: honour try-again directives.
    #[must_use]
    pub fn with_rollback(mut self) -> Self {
        self.rollback = true;
        self
    }

    /// Number of directives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// No directives?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

/// How a pass ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every directive has been processed.
    Complete(GameSnapshot),
    /// Waiting for a choice; the snapshot is in `AwaitingChoice`.
    Suspended(GameSnapshot, ChoiceId),
    /// A try-again directive fired. The caller restores its checkpoint.
    TryAgain {
        /// Time charged for trying again.
        time_penalty: i64,
    },
}

/// Targets of the directive a pass resumes on.
struct Partial {
    applied: TargetList,
    remaining: TargetList,
}

enum Step {
    Done,
    Suspended(ChoiceId),
}

enum TargetStep {
    Apply(TargetList),
    Suspend(ChoiceId),
}

/// Applies effect batches.
#[derive(Clone, Copy)]
pub struct EffectEngine<'a> {
    board: &'a Board,
    cards: CardLifecycle<'a>,
    log: &'a DiagnosticLog,
}

impl<'a> EffectEngine<'a> {
    /// Create an engine.
    #[must_use]
    pub fn new(board: &'a Board, catalog: &'a CardCatalog, log: &'a DiagnosticLog) -> Self {
        Self {
            board,
            cards: CardLifecycle::new(catalog, log),
            log,
        }
    }

    /// Run a pass from its first directive.
    ///
    /// `followup` is the turn step to continue with if the pass suspends
    /// and is later completed through a choice.
    pub fn run(&self, snapshot: &GameSnapshot, batch: EffectBatch, followup: Stage) -> Result<PassOutcome> {
        self.log.verbose(
            Category::Effects,
            format!(
                "{} for {}: {} directive(s)",
                batch.pass,
                batch.actor,
                batch.len()
            ),
        );
        self.run_from(snapshot.clone(), batch, 0, None, followup)
    }

    /// Continue a pass suspended on a target choice with the selected player.
    pub fn resume_with_target(
        &self,
        snapshot: &GameSnapshot,
        resume: Resume,
        target: PlayerId,
        followup: Stage,
    ) -> Result<PassOutcome> {
        let mut remaining: TargetList = smallvec![target];
        remaining.extend(resume.remaining);
        let partial = Partial {
            applied: resume.applied,
            remaining,
        };
        self.run_from(snapshot.clone(), resume.batch, resume.index, Some(partial), followup)
    }

    /// Continue a pass suspended on a destination choice, after the mover
    /// has been moved.
    pub fn resume_after_move(
        &self,
        snapshot: &GameSnapshot,
        resume: Resume,
        followup: Stage,
    ) -> Result<PassOutcome> {
        let partial = Partial {
            applied: resume.applied,
            remaining: resume.remaining,
        };
        self.run_from(snapshot.clone(), resume.batch, resume.index, Some(partial), followup)
    }

    fn run_from(
        &self,
        mut snapshot: GameSnapshot,
        batch: EffectBatch,
        start: usize,
        mut partial: Option<Partial>,
        followup: Stage,
    ) -> Result<PassOutcome> {
        for index in start..batch.directives.len() {
            let directive = &batch.directives[index];

            let (mut applied, pending) = match partial.take() {
                Some(partial) => (partial.applied, partial.remaining),
                None => {
                    if snapshot.has_applied(batch.pass, directive.id) {
                        self.log.verbose(
                            Category::Effects,
                            format!("{} already applied in {}, skipped", directive.id, batch.pass),
                        );
                        continue;
                    }
                    if let Duration::Turns(turns) = directive.duration {
                        self.schedule(&mut snapshot, &batch, directive, turns);
                        continue;
                    }
                    if let DirectiveKind::TryAgain { time_penalty } = directive.kind {
                        if batch.rollback {
                            self.log.normal(
                                Category::Effects,
                                format!("{} tries again (+{time_penalty} time)", batch.actor),
                            );
                            return Ok(PassOutcome::TryAgain { time_penalty });
                        }
                        self.log.minimal(
                            Category::Effects,
                            format!("{}: no checkpoint to try again from, skipped", directive.id),
                        );
                        self.finish(&mut snapshot, &batch, directive, TargetList::new());
                        continue;
                    }

                    match self.targets(&mut snapshot, &batch, index, followup)? {
                        TargetStep::Apply(targets) => (TargetList::new(), targets),
                        TargetStep::Suspend(choice) => {
                            snapshot.phase = TurnPhase::AwaitingChoice;
                            return Ok(PassOutcome::Suspended(snapshot, choice));
                        }
                    }
                }
            };

            for (position, &target) in pending.iter().enumerate() {
                let mut done = applied.clone();
                done.push(target);
                let resume = Resume {
                    batch: batch.clone(),
                    index,
                    applied: done,
                    remaining: pending[position + 1..].iter().copied().collect(),
                };
                match self.apply(&mut snapshot, directive, target, resume, followup)? {
                    Step::Done => applied.push(target),
                    Step::Suspended(choice) => {
                        snapshot.phase = TurnPhase::AwaitingChoice;
                        return Ok(PassOutcome::Suspended(snapshot, choice));
                    }
                }
            }

            self.finish(&mut snapshot, &batch, directive, applied);
        }
        Ok(PassOutcome::Complete(snapshot))
    }

    /// Resolve the targets of `batch.directives[index]`, offering a choice
    /// when the selector needs one.
    fn targets(
        &self,
        snapshot: &mut GameSnapshot,
        batch: &EffectBatch,
        index: usize,
        followup: Stage,
    ) -> Result<TargetStep> {
        let directive = &batch.directives[index];
        let candidates = match directive.target.evaluate(snapshot, batch.actor)? {
            Targets::Resolved(targets) => return Ok(TargetStep::Apply(targets)),
            Targets::Choose(candidates) => candidates,
        };

        let context = ChoiceContext::Target(Resume {
            batch: batch.clone(),
            index,
            applied: TargetList::new(),
            remaining: TargetList::new(),
        });
        let offered = snapshot.choices.offer(
            candidates.into_iter().map(Candidate::Player).collect(),
            batch.actor,
            context,
            followup,
        );
        match offered {
            Ok(Offer::Auto(Candidate::Player(player))) => {
                self.log.verbose(
                    Category::Choice,
                    format!("{} auto-resolved to {player}", directive.id),
                );
                Ok(TargetStep::Apply(smallvec![player]))
            }
            Ok(Offer::Auto(Candidate::Space(space))) => Err(EngineError::NoValidTarget(format!(
                "{} offered space {space} as a player target",
                directive.id
            ))),
            Ok(Offer::External(choice)) => {
                self.log.normal(
                    Category::Choice,
                    format!("{} chooses a target for {} ({choice})", batch.actor, directive.id),
                );
                Ok(TargetStep::Suspend(choice))
            }
            Err(EngineError::NoValidTarget(reason)) => {
                self.log.minimal(
                    Category::Effects,
                    format!("{} has no valid target ({reason}), nothing applied", directive.id),
                );
                Ok(TargetStep::Apply(TargetList::new()))
            }
            Err(other) => Err(other),
        }
    }

    fn apply(
        &self,
        snapshot: &mut GameSnapshot,
        directive: &EffectDirective,
        target: PlayerId,
        resume: Resume,
        followup: Stage,
    ) -> Result<Step> {
        match &directive.kind {
            DirectiveKind::Adjust {
                resource: Resource::Money,
                amount,
                allow_debt,
            } => {
                let player = snapshot.player_mut(target)?;
                if *allow_debt {
                    player.flags.debt_permitted = true;
                }
                let balance = player.money.saturating_add(*amount);
                player.money = if balance < 0 && !player.flags.debt_permitted {
                    self.log.normal(
                        Category::Effects,
                        format!("{target} money clamped at 0 ({balance} requested)"),
                    );
                    0
                } else {
                    balance
                };
            }
            DirectiveKind::Adjust {
                resource: Resource::Time,
                amount,
                ..
            } => {
                let player = snapshot.player_mut(target)?;
                let total = player.time.saturating_add(*amount);
                if total < 0 {
                    self.log.normal(
                        Category::Effects,
                        format!("{target} time clamped at 0 ({total} requested)"),
                    );
                }
                player.time = total.max(0);
            }
            DirectiveKind::PercentFee { percent } => {
                let player = snapshot.player_mut(target)?;
                let fee = player.money.max(0).saturating_mul(*percent) / 100;
                player.money = if player.flags.debt_permitted {
                    player.money - fee
                } else {
                    (player.money - fee).max(0)
                };
            }
            DirectiveKind::Draw { deck, count } => {
                self.cards.draw(snapshot, target, *deck, *count)?;
            }
            DirectiveKind::Discard { deck, count } => {
                self.cards.discard_oldest(snapshot, target, *deck, *count)?;
            }
            DirectiveKind::Move(movement) => {
                let origin = snapshot.player(target)?.space.clone();
                let roll = snapshot.record.roll;
                let context = ChoiceContext::Destination {
                    mover: target,
                    resume: Some(resume),
                };
                let resolution = MovementResolver::resolve(
                    movement,
                    &origin,
                    roll,
                    &mut snapshot.choices,
                    target,
                    context,
                    followup,
                )?;
                match resolution {
                    MoveResolution::Arrive(space) => {
                        self.board.space(&space)?;
                        snapshot.player_mut(target)?.relocate(space.clone());
                        self.log.normal(
                            Category::Effects,
                            format!("{target} moved from {origin} to {space}"),
                        );
                    }
                    MoveResolution::Stay => {}
                    MoveResolution::Pending(choice) => return Ok(Step::Suspended(choice)),
                }
            }
            DirectiveKind::TryAgain { .. } => {}
        }
        self.log.verbose(
            Category::Effects,
            format!("{} [{}] applied to {target}", directive.id, directive.kind),
        );
        Ok(Step::Done)
    }

    fn schedule(
        &self,
        snapshot: &mut GameSnapshot,
        batch: &EffectBatch,
        directive: &EffectDirective,
        turns: u32,
    ) {
        let activation_turn = snapshot.turn.saturating_add(turns);
        snapshot.deferred.push_back(DeferredDirective {
            activation_turn,
            owner: batch.actor,
            directive: directive.immediate(),
        });
        self.log.normal(
            Category::Effects,
            format!(
                "{} [{}] scheduled for turn {activation_turn}",
                directive.id, directive.kind
            ),
        );
        self.finish(snapshot, batch, directive, TargetList::new());
    }

    fn finish(
        &self,
        snapshot: &mut GameSnapshot,
        batch: &EffectBatch,
        directive: &EffectDirective,
        targets: TargetList,
    ) {
        snapshot.mark_applied(batch.pass, directive.id);
        snapshot.record.effects.push_back(AppliedEffect {
            pass: batch.pass,
            directive: directive.id,
            targets,
        });
    }
}
