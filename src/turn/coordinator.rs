//! The turn coordinator: the action surface of a game.
//!
//! ## Turn flow
//!
//! ```text
//! AwaitingRoll --roll_dice--> ResolvingEffects (dice effects, movement,
//!     entry effects) --> AwaitingAction --EndTurn--> TurnComplete
//!     (deferred directives) --> AwaitingRoll (next player)
//! ```
//!
//! Any effect pass may stop in `AwaitingChoice`; `resolve_choice` picks it
//! up where it stopped. Reaching an ending space ends the game in
//! `GameWon`. When nobody is left playing the game ends in `GameOver`.
//!
//! ## Checkpoints
//!
//! The snapshot committed when the active player's arrival completes is
//! kept as the turn's checkpoint. Trying again (a card's try-again
//! directive, or negotiating) commits the checkpoint's value again, so the
//! turn resumes in `AwaitingAction` exactly as it was on arrival. Time
//! penalties charged by earlier try-agains and a negotiation already made
//! this turn survive the rollback. The checkpoint is dropped when the turn
//! ends; deferred directives never roll back.
//!
//! Every method commits at most one snapshot. A failed call commits
//! nothing, except a roll that cannot be moved on: the roll is committed
//! so the next attempt rolls again.

use std::sync::Arc;

use tokio::sync::watch;

use super::setup::initial_snapshot;
use crate::ai::{CancelSignal, Decision, DecisionRequest};
use crate::cards::{CardCatalog, CardLifecycle};
use crate::choice::{Candidate, ChoiceContext, PendingChoice};
use crate::config::{Board, GameSettings};
use crate::core::{
    Action, ChoiceId, Controller, GameSnapshot, PlayerId, PlayerStatus, Stage, TurnPhase,
    TurnRecord,
};
use crate::diagnostics::{Category, DiagnosticLog, OutputMode, Verbosity};
use crate::effects::{EffectBatch, EffectDirective, EffectEngine, PassOutcome};
use crate::error::{EngineError, Result};
use crate::movement::{MoveResolution, MovementResolver};
use crate::rules::{GameResult, RulesEngine};
use crate::store::{Checkpoint, SnapshotStore, Subscription};

/// Where a transition left the game.
enum Progress {
    /// A snapshot to commit. `entered` marks the end of the active
    /// player's arrival.
    Settled { snapshot: GameSnapshot, entered: bool },
    /// Roll back to the checkpoint. `negotiated` marks a negotiation.
    TryAgain { time_penalty: i64, negotiated: bool },
}

impl Progress {
    fn settled(snapshot: GameSnapshot) -> Self {
        Progress::Settled {
            snapshot,
            entered: false,
        }
    }
}

/// Borrowed view of everything a transition needs.
#[derive(Clone, Copy)]
struct Flow<'a> {
    board: &'a Board,
    catalog: &'a CardCatalog,
    log: &'a DiagnosticLog,
    rollback: bool,
}

impl<'a> Flow<'a> {
    fn rules(&self) -> RulesEngine<'a> {
        RulesEngine::new(self.board)
    }

    fn effects(&self) -> EffectEngine<'a> {
        EffectEngine::new(self.board, self.catalog, self.log)
    }

    fn cards(&self) -> CardLifecycle<'a> {
        CardLifecycle::new(self.catalog, self.log)
    }

    /// Run a fresh pass for `actor`, then continue with `followup`.
    fn run_pass(
        &self,
        mut snapshot: GameSnapshot,
        actor: PlayerId,
        directives: Vec<EffectDirective>,
        followup: Stage,
    ) -> Result<Progress> {
        if directives.is_empty() {
            return self.proceed(snapshot, followup);
        }
        let mut batch = EffectBatch::new(snapshot.allocate_pass(), actor, directives);
        if self.rollback && snapshot.checkpoint_turn == Some(snapshot.turn) {
            batch = batch.with_rollback();
        }
        let outcome = self.effects().run(&snapshot, batch, followup)?;
        self.after_pass(outcome, followup)
    }

    fn after_pass(&self, outcome: PassOutcome, followup: Stage) -> Result<Progress> {
        match outcome {
            PassOutcome::Complete(snapshot) => self.proceed(snapshot, followup),
            PassOutcome::Suspended(snapshot, choice) => {
                self.log.normal(Category::Turn, format!("waiting on {choice}"));
                Ok(Progress::settled(snapshot))
            }
            PassOutcome::TryAgain { time_penalty } => Ok(Progress::TryAgain {
                time_penalty,
                negotiated: false,
            }),
        }
    }

    /// Drive the turn forward from `stage` until it needs outside input.
    fn proceed(&self, mut snapshot: GameSnapshot, mut stage: Stage) -> Result<Progress> {
        snapshot.phase = TurnPhase::ResolvingEffects;
        loop {
            if let Some(winner) = self.rules().winner(&snapshot, snapshot.active)? {
                declare_winner(&mut snapshot, winner, self.log)?;
                return Ok(Progress::settled(snapshot));
            }

            let active = snapshot.active;
            match stage {
                Stage::DiceEffects => {
                    let player = snapshot.player(active)?;
                    let rules = self.board.rules(&player.space, player.visit)?;
                    let directives = snapshot
                        .record
                        .roll
                        .and_then(|roll| rules.dice_effects.get(&roll))
                        .cloned()
                        .unwrap_or_default();
                    return self.run_pass(snapshot, active, directives, Stage::Movement);
                }
                Stage::Movement => {
                    let player = snapshot.player(active)?;
                    let origin = player.space.clone();
                    let rules = self.board.rules(&origin, player.visit)?;
                    let context = ChoiceContext::Destination {
                        mover: active,
                        resume: None,
                    };
                    let roll = snapshot.record.roll;
                    let resolution = MovementResolver::resolve(
                        &rules.movement,
                        &origin,
                        roll,
                        &mut snapshot.choices,
                        active,
                        context,
                        Stage::Arrival,
                    )?;
                    let destination = match resolution {
                        MoveResolution::Arrive(space) => space,
                        MoveResolution::Stay => origin.clone(),
                        MoveResolution::Pending(choice) => {
                            snapshot.phase = TurnPhase::AwaitingChoice;
                            self.log
                                .normal(Category::Turn, format!("{active} chooses a destination ({choice})"));
                            return Ok(Progress::settled(snapshot));
                        }
                    };
                    self.board.space(&destination)?;
                    snapshot.player_mut(active)?.relocate(destination.clone());
                    self.log
                        .normal(Category::Turn, format!("{active} moves from {origin} to {destination}"));
                    stage = Stage::Arrival;
                }
                Stage::Arrival => {
                    let player = snapshot.player(active)?;
                    let (space, visit) = (player.space.clone(), player.visit);
                    snapshot.record.arrival = Some((space.clone(), visit));
                    let directives = self.board.rules(&space, visit)?.entry_effects.clone();
                    self.log
                        .verbose(Category::Turn, format!("{active} enters {space} ({visit:?} visit)"));
                    return self.run_pass(snapshot, active, directives, Stage::Entered);
                }
                Stage::Entered => {
                    snapshot.phase = TurnPhase::AwaitingAction;
                    snapshot.checkpoint_turn = Some(snapshot.turn);
                    return Ok(Progress::Settled {
                        snapshot,
                        entered: true,
                    });
                }
                Stage::Action => {
                    snapshot.phase = TurnPhase::AwaitingAction;
                    return Ok(Progress::settled(snapshot));
                }
                Stage::Deferred => {
                    let turn = snapshot.turn;
                    let Some(index) = snapshot
                        .deferred
                        .iter()
                        .position(|d| d.activation_turn <= turn)
                    else {
                        snapshot.phase = TurnPhase::AwaitingRoll;
                        self.log
                            .normal(Category::Turn, format!("turn {turn}: {active} to roll"));
                        return Ok(Progress::settled(snapshot));
                    };
                    let due = snapshot.deferred.remove(index);
                    if !snapshot.player(due.owner)?.is_playing() {
                        self.log.normal(
                            Category::Effects,
                            format!("{} dropped: {} has left the game", due.directive.id, due.owner),
                        );
                        continue;
                    }
                    return self.run_pass(snapshot, due.owner, vec![due.directive], Stage::Deferred);
                }
            }
        }
    }

    /// Archive the turn and hand over to the next playing player.
    fn end_turn(&self, mut snapshot: GameSnapshot) -> Result<Progress> {
        snapshot.phase = TurnPhase::TurnComplete;
        let finished = std::mem::replace(
            &mut snapshot.record,
            TurnRecord::new(snapshot.turn + 1, snapshot.active),
        );
        snapshot.history.push_back(finished);
        snapshot.effect_log.clear();
        snapshot.checkpoint_turn = None;
        for player in snapshot.players.iter_mut() {
            player.flags.negotiated_this_turn = false;
        }
        snapshot.turn += 1;

        let Some(next) = snapshot.next_playing_after(snapshot.active) else {
            snapshot.phase = TurnPhase::GameOver;
            self.log
                .normal(Category::Turn, "nobody is left playing, game over".to_string());
            return Ok(Progress::settled(snapshot));
        };
        snapshot.active = next;
        snapshot.record = TurnRecord::new(snapshot.turn, next);
        self.proceed(snapshot, Stage::Deferred)
    }

    fn act(&self, mut snapshot: GameSnapshot, player: PlayerId, action: &Action) -> Result<Progress> {
        match action {
            Action::PlayCard(card) => {
                let directives = self.cards().play(&mut snapshot, self.board, player, card)?;
                snapshot.phase = TurnPhase::ResolvingEffects;
                self.run_pass(snapshot, player, directives, Stage::Action)
            }
            Action::DiscardCard(card) => {
                self.cards().discard(&mut snapshot, player, card)?;
                Ok(Progress::settled(snapshot))
            }
            Action::TransferCard { card, to } => {
                self.cards().transfer(&mut snapshot, player, *to, card)?;
                Ok(Progress::settled(snapshot))
            }
            Action::Negotiate => {
                let current = snapshot.player(player)?;
                let rules = self.board.rules(&current.space, current.visit)?;
                if !self.rules().can_negotiate(&current.space, current.visit)? {
                    return Err(EngineError::InvalidAction(format!(
                        "no negotiation on {}",
                        current.space
                    )));
                }
                if current.flags.negotiated_this_turn {
                    return Err(EngineError::InvalidAction(format!(
                        "{player} already negotiated this turn"
                    )));
                }
                if !self.rollback {
                    return Err(EngineError::InvalidAction(
                        "nothing to negotiate: no arrival this turn".into(),
                    ));
                }
                Ok(Progress::TryAgain {
                    time_penalty: rules.try_again_penalty,
                    negotiated: true,
                })
            }
            Action::Forfeit => {
                snapshot.player_mut(player)?.status = PlayerStatus::Eliminated;
                self.log.normal(Category::Turn, format!("{player} forfeits"));
                self.end_turn(snapshot)
            }
            Action::EndTurn => self.end_turn(snapshot),
        }
    }

    fn resolve(&self, mut snapshot: GameSnapshot, pending: PendingChoice, selection: Candidate) -> Result<Progress> {
        snapshot.phase = TurnPhase::ResolvingEffects;
        let followup = pending.followup;
        match (pending.context, selection) {
            (ChoiceContext::Target(resume), Candidate::Player(target)) => {
                let outcome = self.effects().resume_with_target(&snapshot, resume, target, followup)?;
                self.after_pass(outcome, followup)
            }
            (ChoiceContext::Destination { mover, resume }, Candidate::Space(space)) => {
                self.board.space(&space)?;
                let origin = snapshot.player(mover)?.space.clone();
                snapshot.player_mut(mover)?.relocate(space.clone());
                self.log
                    .normal(Category::Turn, format!("{mover} moves from {origin} to {space}"));
                match resume {
                    Some(resume) => {
                        let outcome = self.effects().resume_after_move(&snapshot, resume, followup)?;
                        self.after_pass(outcome, followup)
                    }
                    None => self.proceed(snapshot, followup),
                }
            }
            (_, selection) => Err(EngineError::InvalidSelection {
                choice: pending.id,
                reason: format!("{selection} does not fit this choice"),
            }),
        }
    }
}

fn declare_winner(snapshot: &mut GameSnapshot, winner: PlayerId, log: &DiagnosticLog) -> Result<()> {
    snapshot.player_mut(winner)?.status = PlayerStatus::Finished;
    snapshot.winner = Some(winner);
    snapshot.phase = TurnPhase::GameWon(winner);
    snapshot.choices.clear();
    log.minimal(
        Category::Turn,
        format!("{winner} reached {} and wins", snapshot.player(winner)?.space),
    );
    Ok(())
}

/// Drives one game: validates actions, runs effects, commits snapshots.
pub struct TurnCoordinator {
    store: Arc<SnapshotStore>,
    board: Arc<Board>,
    catalog: Arc<CardCatalog>,
    settings: GameSettings,
    initial: Checkpoint,
    checkpoint: Option<Checkpoint>,
    log: DiagnosticLog,
    generation: watch::Sender<u64>,
}

impl TurnCoordinator {
    /// Set up a game.
    ///
    /// ## Errors
    ///
    /// `Config` for unusable settings, `NotFound` for an unknown start
    /// space.
    pub fn new(board: Board, catalog: CardCatalog, settings: GameSettings) -> Result<Self> {
        let output = if settings.verbosity == Verbosity::Silent {
            OutputMode::Memory
        } else {
            OutputMode::Both
        };
        let log = DiagnosticLog::with_verbosity(settings.verbosity).with_output_mode(output);
        let initial = initial_snapshot(&board, &catalog, &settings, &log)?;
        let store = Arc::new(SnapshotStore::new(initial)?);
        let (generation, _) = watch::channel(0);

        Ok(Self {
            initial: store.checkpoint(),
            store,
            board: Arc::new(board),
            catalog: Arc::new(catalog),
            settings,
            checkpoint: None,
            log,
            generation,
        })
    }

    /// The committed snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<GameSnapshot> {
        self.store.current()
    }

    /// The store, for observers that outlive a borrow of the coordinator.
    #[must_use]
    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Notify `observer` after every commit.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&Arc<GameSnapshot>) + Send + Sync + 'static,
    {
        self.store.subscribe(observer)
    }

    /// The board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The card catalog.
    #[must_use]
    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    /// Session settings.
    #[must_use]
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Diagnostics recorded so far.
    #[must_use]
    pub fn log(&self) -> &DiagnosticLog {
        &self.log
    }

    /// The live checkpoint, if the active player has arrived this turn.
    #[must_use]
    pub fn checkpoint(&self) -> Option<&Checkpoint> {
        self.checkpoint.as_ref()
    }

    /// Restart count.
    #[must_use]
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// How the game ended, if it has.
    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        GameResult::of(&self.snapshot())
    }

    /// The choice waiting to be resolved, if any.
    #[must_use]
    pub fn pending_choice(&self) -> Option<PendingChoice> {
        self.snapshot().choices.current().cloned()
    }

    /// Roll the die for the active player and resolve the move.
    ///
    /// ## Errors
    ///
    /// `UnmappedRoll` or `NoValidTarget` when the move cannot be resolved.
    /// The roll itself is still committed: the player stays put, may roll
    /// again, and may end the turn or forfeit instead.
    pub fn roll_dice(&mut self, player: PlayerId) -> Result<Arc<GameSnapshot>> {
        let die_sides = self.settings.die_sides;
        let mut failure = None;
        let committed = self.commit(|flow, current| {
            expect_phase(current, TurnPhase::AwaitingRoll, "roll")?;
            expect_active(flow, current, player)?;

            let mut next = current.clone();
            let space = flow.board.space(&next.player(player)?.space)?;
            next.record.roll = if space.requires_dice_roll {
                Some(next.roll_die(die_sides))
            } else {
                None
            };
            next.record.roll_failed = false;
            match next.record.roll {
                Some(roll) => flow.log.normal(Category::Turn, format!("{player} rolls {roll}")),
                None => flow.log.normal(Category::Turn, format!("{player} moves without rolling")),
            }

            let rolled = next.clone();
            match flow.proceed(next, Stage::DiceEffects) {
                Err(err @ (EngineError::UnmappedRoll { .. } | EngineError::NoValidTarget(_))) => {
                    flow.log
                        .normal(Category::Turn, format!("{player} cannot move: {err}"));
                    let mut stuck = rolled;
                    stuck.record.roll_failed = true;
                    failure = Some(err);
                    Ok(Progress::settled(stuck))
                }
                progress => progress,
            }
        })?;
        match failure {
            Some(err) => Err(err),
            None => Ok(committed),
        }
    }

    /// Perform an action for the active player.
    pub fn submit_action(&mut self, player: PlayerId, action: Action) -> Result<Arc<GameSnapshot>> {
        self.commit(|flow, current| {
            let after_failed_roll = current.phase == TurnPhase::AwaitingRoll
                && match action {
                    Action::Forfeit => true,
                    Action::EndTurn => current.record.roll_failed,
                    _ => false,
                };
            if !current.phase.accepts_actions() && !after_failed_roll {
                return Err(EngineError::InvalidAction(format!(
                    "{} not accepted in {:?}",
                    action.name(),
                    current.phase
                )));
            }
            expect_active(flow, current, player)?;

            let mut next = current.clone();
            next.record.push_action(player, action.clone());
            flow.log.verbose(Category::Turn, format!("{player}: {}", action.name()));
            flow.act(next, player, &action)
        })
    }

    /// Resolve a pending choice.
    ///
    /// ## Errors
    ///
    /// `NotFound` for an unknown choice, `InvalidSelection` if `selection`
    /// is not one of its candidates. The choice stays pending in both
    /// cases.
    pub fn resolve_choice(&mut self, choice: ChoiceId, selection: Candidate) -> Result<Arc<GameSnapshot>> {
        self.commit(|flow, current| {
            expect_phase(current, TurnPhase::AwaitingChoice, "choice")?;
            let mut next = current.clone();
            let pending = next.choices.resolve(choice, &selection)?;
            flow.log.normal(
                Category::Choice,
                format!("{} picks {selection} for {choice}", pending.chooser),
            );
            flow.resolve(next, pending, selection)
        })
    }

    /// Start over from the initial snapshot.
    ///
    /// Outstanding AI requests are cancelled and their decisions refused.
    pub fn restart_game(&mut self) -> Arc<GameSnapshot> {
        self.generation.send_modify(|generation| *generation += 1);
        self.checkpoint = None;
        self.log.normal(
            Category::Turn,
            format!("game restarted (generation {})", self.generation()),
        );
        self.store.restore(&self.initial)
    }

    /// A request for the pending choice when an AI player has to make it.
    #[must_use]
    pub fn ai_request(&self) -> Option<DecisionRequest> {
        let snapshot = self.snapshot();
        let choice = snapshot.choices.current()?.clone();
        let chooser = snapshot.player(choice.chooser).ok()?;
        if chooser.controller != Controller::Ai {
            return None;
        }
        self.log
            .verbose(Category::Ai, format!("{} asked to decide {}", chooser.id, choice.id));
        Some(DecisionRequest {
            choice,
            snapshot,
            signal: CancelSignal::new(self.generation.subscribe(), self.generation()),
        })
    }

    /// Apply an AI decision.
    ///
    /// ## Errors
    ///
    /// `Cancelled` if the game was restarted after the request was made.
    pub fn apply_decision(&mut self, decision: Decision) -> Result<Arc<GameSnapshot>> {
        let current = self.generation();
        if decision.generation != current {
            self.log.normal(
                Category::Ai,
                format!("stale decision for {} ignored", decision.choice),
            );
            return Err(EngineError::Cancelled {
                requested: decision.generation,
                current,
            });
        }
        self.resolve_choice(decision.choice, decision.selection)
    }

    /// Run `transition` against the committed snapshot and commit its result.
    fn commit<F>(&mut self, transition: F) -> Result<Arc<GameSnapshot>>
    where
        F: FnOnce(Flow<'_>, &GameSnapshot) -> Result<Progress>,
    {
        let flow = Flow {
            board: &self.board,
            catalog: &self.catalog,
            log: &self.log,
            rollback: self.checkpoint.is_some(),
        };
        let checkpoint = self.checkpoint.as_ref();

        let (committed, entered) = self.store.apply_with(|current| {
            match transition(flow, current)? {
                Progress::Settled { snapshot, entered } => Ok((snapshot, entered)),
                Progress::TryAgain {
                    time_penalty,
                    negotiated,
                } => {
                    let checkpoint = checkpoint.ok_or_else(|| {
                        EngineError::InvalidAction("no checkpoint to try again from".into())
                    })?;
                    let charged = current.record.try_again_time.saturating_add(time_penalty);
                    let already_negotiated = current.player(current.active)?.flags.negotiated_this_turn;
                    let mut restored = GameSnapshot::clone(checkpoint.snapshot());
                    restored.record.try_again_time = charged;
                    let player = restored.player_mut(current.active)?;
                    player.time = player.time.saturating_add(charged).max(0);
                    player.flags.negotiated_this_turn = already_negotiated || negotiated;
                    flow.log.normal(
                        Category::Turn,
                        format!("turn {} rolled back to arrival", restored.turn),
                    );
                    Ok((restored, false))
                }
            }
        })?;

        if entered {
            self.checkpoint = Some(self.store.checkpoint());
        } else if committed.checkpoint_turn.is_none() {
            self.checkpoint = None;
        }
        Ok(committed)
    }
}

fn expect_phase(snapshot: &GameSnapshot, phase: TurnPhase, what: &str) -> Result<()> {
    if snapshot.phase == phase {
        Ok(())
    } else {
        Err(EngineError::InvalidAction(format!(
            "{what} not accepted in {:?}",
            snapshot.phase
        )))
    }
}

fn expect_active(flow: Flow<'_>, snapshot: &GameSnapshot, player: PlayerId) -> Result<()> {
    if flow.rules().is_active_turn(snapshot, player)? {
        Ok(())
    } else {
        Err(EngineError::InvalidAction(format!(
            "it is {}'s turn, not {player}'s",
            snapshot.active
        )))
    }
}

impl std::fmt::Debug for TurnCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnCoordinator")
            .field("store", &self.store)
            .field("generation", &self.generation())
            .field("checkpoint", &self.checkpoint.as_ref().map(Checkpoint::turn))
            .finish()
    }
}
