//! Session events and the pure fold that applies them.

use std::fmt;

use thiserror::Error;

use crate::state::{
    persons::PersonAttrs,
    snapshot::{Replic, Role, SessionSnapshot},
    stage::{PauseChange, StageError, StagePhase},
    stakes::{StakeError, StakeWindow},
    timers::{PauseSource, TimerId},
    validation::Duel,
};

/// Everything that can happen to a session, whether pushed by the server or
/// produced by the local user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Server moved the game to another phase.
    StageChanged {
        /// New phase.
        phase: StagePhase,
    },
    /// A new question turn begins.
    TurnStart {
        /// Theme of the question.
        theme_index: usize,
        /// Question price.
        price: i32,
    },
    /// Pause or resume the game.
    PauseToggle {
        /// Who asks.
        source: PauseSource,
    },
    /// A decision is expected, optionally from a specific player.
    DecisionNeeded {
        /// Player who must decide.
        decider: Option<String>,
    },
    /// The pending decision has been made.
    DecisionResolved,
    /// Press-to-answer window opened or closed.
    AnsweringWindow {
        /// `true` to open.
        opens: bool,
    },
    /// The question has been played out.
    QuestionEnded,
    /// A stake round starts.
    StakeRoundOpen(StakeWindow),
    /// A stake value is proposed.
    StakeProposed {
        /// Proposed wager.
        value: i32,
    },
    /// The stake round is over.
    StakeRoundClose,
    /// Transient stake panel message.
    StakeMessage {
        /// Message text.
        message: String,
    },
    /// An answer must be judged.
    DuelOpen(Duel),
    /// Judging is over.
    DuelClose,
    /// Full roster, in seat order.
    RosterAnnounced {
        /// Persons with their attributes.
        persons: Vec<(String, PersonAttrs)>,
    },
    /// Insert or replace one person.
    PersonUpsert {
        /// Person name.
        name: String,
        /// New attributes.
        attrs: PersonAttrs,
    },
    /// A person left.
    PersonRemove {
        /// Person name.
        name: String,
    },
    /// Readiness update.
    PersonReady {
        /// Person name.
        name: String,
        /// Ready flag.
        is_ready: bool,
    },
    /// A person said something.
    PersonReplic {
        /// Speaker.
        name: String,
        /// Spoken text.
        text: String,
    },
    /// A player's score changed.
    PlayerSum {
        /// Player name.
        name: String,
        /// New score.
        sum: i32,
    },
    /// Arm a timer with a new maximum.
    TimerStart {
        /// Target timer.
        timer: TimerId,
        /// Cap, `0` for unbounded.
        maximum: u32,
    },
    /// Engage one pause source on a timer.
    TimerPause {
        /// Target timer.
        timer: TimerId,
        /// Pause source.
        source: PauseSource,
    },
    /// Release one pause source on a timer.
    TimerResume {
        /// Target timer.
        timer: TimerId,
        /// Pause source.
        source: PauseSource,
    },
    /// Wall-clock time passed.
    TimerTick {
        /// Target timer.
        timer: TimerId,
        /// Elapsed tenths of a second since the previous tick.
        delta: u32,
    },
    /// Show or hide the round timer.
    MainTimerVisibility {
        /// Visible flag.
        visible: bool,
    },
    /// Local viewer capacity changed.
    RoleAssigned {
        /// New role.
        role: Role,
    },
    /// Local pending answer text changed.
    AnswerChanged {
        /// Answer text, `None` to clear.
        answer: Option<String>,
    },
    /// Target-picking prompt toggled.
    SelectionChanged {
        /// Prompt active.
        is_enabled: bool,
        /// Prompt text.
        message: String,
    },
    /// Hint replaced.
    HintChanged {
        /// Hint text, `None` to clear.
        hint: Option<String>,
    },
    /// Game button enabled or disabled.
    GameButtonToggled {
        /// Enabled flag.
        enabled: bool,
    },
    /// Sum editing allowed or not.
    SumsEditableToggled {
        /// Editable flag.
        editable: bool,
    },
    /// Reading pace changed.
    ReadingSpeedChanged {
        /// Characters per second.
        speed: u32,
    },
    /// The session is over.
    SessionEnd,
}

/// Discriminant of a [`SessionEvent`], used in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`SessionEvent::StageChanged`]
    StageChanged,
    /// [`SessionEvent::TurnStart`]
    TurnStart,
    /// [`SessionEvent::PauseToggle`]
    PauseToggle,
    /// [`SessionEvent::DecisionNeeded`]
    DecisionNeeded,
    /// [`SessionEvent::DecisionResolved`]
    DecisionResolved,
    /// [`SessionEvent::AnsweringWindow`]
    AnsweringWindow,
    /// [`SessionEvent::QuestionEnded`]
    QuestionEnded,
    /// [`SessionEvent::StakeRoundOpen`]
    StakeRoundOpen,
    /// [`SessionEvent::StakeProposed`]
    StakeProposed,
    /// [`SessionEvent::StakeRoundClose`]
    StakeRoundClose,
    /// [`SessionEvent::StakeMessage`]
    StakeMessage,
    /// [`SessionEvent::DuelOpen`]
    DuelOpen,
    /// [`SessionEvent::DuelClose`]
    DuelClose,
    /// [`SessionEvent::RosterAnnounced`]
    RosterAnnounced,
    /// [`SessionEvent::PersonUpsert`]
    PersonUpsert,
    /// [`SessionEvent::PersonRemove`]
    PersonRemove,
    /// [`SessionEvent::PersonReady`]
    PersonReady,
    /// [`SessionEvent::PersonReplic`]
    PersonReplic,
    /// [`SessionEvent::PlayerSum`]
    PlayerSum,
    /// [`SessionEvent::TimerStart`]
    TimerStart,
    /// [`SessionEvent::TimerPause`]
    TimerPause,
    /// [`SessionEvent::TimerResume`]
    TimerResume,
    /// [`SessionEvent::TimerTick`]
    TimerTick,
    /// [`SessionEvent::MainTimerVisibility`]
    MainTimerVisibility,
    /// [`SessionEvent::RoleAssigned`]
    RoleAssigned,
    /// [`SessionEvent::AnswerChanged`]
    AnswerChanged,
    /// [`SessionEvent::SelectionChanged`]
    SelectionChanged,
    /// [`SessionEvent::HintChanged`]
    HintChanged,
    /// [`SessionEvent::GameButtonToggled`]
    GameButtonToggled,
    /// [`SessionEvent::SumsEditableToggled`]
    SumsEditableToggled,
    /// [`SessionEvent::ReadingSpeedChanged`]
    ReadingSpeedChanged,
    /// [`SessionEvent::SessionEnd`]
    SessionEnd,
    /// Tag that is not part of the catalog.
    Unknown,
}

impl EventKind {
    /// Wire name of the event kind.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::StageChanged => "stage_changed",
            EventKind::TurnStart => "turn_start",
            EventKind::PauseToggle => "pause_toggle",
            EventKind::DecisionNeeded => "decision_needed",
            EventKind::DecisionResolved => "decision_resolved",
            EventKind::AnsweringWindow => "answering_window",
            EventKind::QuestionEnded => "question_ended",
            EventKind::StakeRoundOpen => "stake_round_open",
            EventKind::StakeProposed => "stake_proposed",
            EventKind::StakeRoundClose => "stake_round_close",
            EventKind::StakeMessage => "stake_message",
            EventKind::DuelOpen => "duel_open",
            EventKind::DuelClose => "duel_close",
            EventKind::RosterAnnounced => "roster_announced",
            EventKind::PersonUpsert => "person_upsert",
            EventKind::PersonRemove => "person_remove",
            EventKind::PersonReady => "person_ready",
            EventKind::PersonReplic => "person_replic",
            EventKind::PlayerSum => "player_sum",
            EventKind::TimerStart => "timer_start",
            EventKind::TimerPause => "timer_pause",
            EventKind::TimerResume => "timer_resume",
            EventKind::TimerTick => "timer_tick",
            EventKind::MainTimerVisibility => "main_timer_visibility",
            EventKind::RoleAssigned => "role_assigned",
            EventKind::AnswerChanged => "answer_changed",
            EventKind::SelectionChanged => "selection_changed",
            EventKind::HintChanged => "hint_changed",
            EventKind::GameButtonToggled => "game_button_toggled",
            EventKind::SumsEditableToggled => "sums_editable_toggled",
            EventKind::ReadingSpeedChanged => "reading_speed_changed",
            EventKind::SessionEnd => "session_end",
            EventKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SessionEvent {
    /// Discriminant of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            SessionEvent::StageChanged { .. } => EventKind::StageChanged,
            SessionEvent::TurnStart { .. } => EventKind::TurnStart,
            SessionEvent::PauseToggle { .. } => EventKind::PauseToggle,
            SessionEvent::DecisionNeeded { .. } => EventKind::DecisionNeeded,
            SessionEvent::DecisionResolved => EventKind::DecisionResolved,
            SessionEvent::AnsweringWindow { .. } => EventKind::AnsweringWindow,
            SessionEvent::QuestionEnded => EventKind::QuestionEnded,
            SessionEvent::StakeRoundOpen(_) => EventKind::StakeRoundOpen,
            SessionEvent::StakeProposed { .. } => EventKind::StakeProposed,
            SessionEvent::StakeRoundClose => EventKind::StakeRoundClose,
            SessionEvent::StakeMessage { .. } => EventKind::StakeMessage,
            SessionEvent::DuelOpen(_) => EventKind::DuelOpen,
            SessionEvent::DuelClose => EventKind::DuelClose,
            SessionEvent::RosterAnnounced { .. } => EventKind::RosterAnnounced,
            SessionEvent::PersonUpsert { .. } => EventKind::PersonUpsert,
            SessionEvent::PersonRemove { .. } => EventKind::PersonRemove,
            SessionEvent::PersonReady { .. } => EventKind::PersonReady,
            SessionEvent::PersonReplic { .. } => EventKind::PersonReplic,
            SessionEvent::PlayerSum { .. } => EventKind::PlayerSum,
            SessionEvent::TimerStart { .. } => EventKind::TimerStart,
            SessionEvent::TimerPause { .. } => EventKind::TimerPause,
            SessionEvent::TimerResume { .. } => EventKind::TimerResume,
            SessionEvent::TimerTick { .. } => EventKind::TimerTick,
            SessionEvent::MainTimerVisibility { .. } => EventKind::MainTimerVisibility,
            SessionEvent::RoleAssigned { .. } => EventKind::RoleAssigned,
            SessionEvent::AnswerChanged { .. } => EventKind::AnswerChanged,
            SessionEvent::SelectionChanged { .. } => EventKind::SelectionChanged,
            SessionEvent::HintChanged { .. } => EventKind::HintChanged,
            SessionEvent::GameButtonToggled { .. } => EventKind::GameButtonToggled,
            SessionEvent::SumsEditableToggled { .. } => EventKind::SumsEditableToggled,
            SessionEvent::ReadingSpeedChanged { .. } => EventKind::ReadingSpeedChanged,
            SessionEvent::SessionEnd => EventKind::SessionEnd,
        }
    }
}

/// Side notifications produced by a fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// The timer reached its maximum on this tick.
    TimerElapsed(TimerId),
}

/// Result of folding one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Snapshot after the event.
    pub snapshot: SessionSnapshot,
    /// Notifications raised while folding.
    pub effects: Vec<Effect>,
}

/// Reasons an event is dropped. None of them ends the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FoldError {
    /// Payload fails its shape or range contract.
    #[error("malformed {kind} event: {reason}")]
    Malformed {
        /// Event kind.
        kind: EventKind,
        /// What is wrong.
        reason: String,
    },
    /// Well-formed event that the current state forbids.
    #[error("illegal {kind} transition: {reason}")]
    IllegalTransition {
        /// Event kind.
        kind: EventKind,
        /// Rule that was violated.
        reason: String,
    },
    /// The session already ended.
    #[error("session has ended; {kind} rejected")]
    SessionEnded {
        /// Event kind.
        kind: EventKind,
    },
}

impl FoldError {
    /// Kind of the rejected event.
    pub fn kind(&self) -> EventKind {
        match self {
            FoldError::Malformed { kind, .. }
            | FoldError::IllegalTransition { kind, .. }
            | FoldError::SessionEnded { kind } => *kind,
        }
    }

    fn illegal(kind: EventKind, err: StageError) -> Self {
        FoldError::IllegalTransition {
            kind,
            reason: err.to_string(),
        }
    }

    fn stake(kind: EventKind, err: StakeError) -> Self {
        match err {
            StakeError::NotOpen => FoldError::IllegalTransition {
                kind,
                reason: err.to_string(),
            },
            other => FoldError::Malformed {
                kind,
                reason: other.to_string(),
            },
        }
    }
}

/// Apply one event to `current`, producing the next snapshot.
///
/// Deterministic and free of side effects: `current` is never modified and
/// the same pair always yields the same result. Rejected events return an
/// error and the caller keeps `current`. Events naming an unknown person are
/// accepted as no-ops and return a snapshot equal to `current`.
pub fn fold(current: &SessionSnapshot, event: SessionEvent) -> Result<Transition, FoldError> {
    let kind = event.kind();
    if current.is_ended {
        return Err(FoldError::SessionEnded { kind });
    }

    let mut next = current.clone();
    let mut effects = Vec::new();

    match event {
        SessionEvent::StageChanged { phase } => next
            .stage
            .change_phase(phase)
            .map_err(|err| FoldError::illegal(kind, err))?,
        SessionEvent::TurnStart { theme_index, price } => {
            next.stage
                .start_turn(theme_index, price)
                .map_err(|err| FoldError::illegal(kind, err))?;
            next.persons.mark_deciding(None);
            next.answer = None;
        }
        SessionEvent::PauseToggle { source } => {
            let change = next
                .stage
                .toggle_pause(source)
                .map_err(|err| FoldError::illegal(kind, err))?;
            match change {
                PauseChange::Unchanged => {}
                PauseChange::Paused(source) => next.timers.pause_all(source),
                PauseChange::Resumed(source) => next.timers.resume_all(source),
            }
        }
        SessionEvent::DecisionNeeded { decider } => {
            next.stage
                .need_decision()
                .map_err(|err| FoldError::illegal(kind, err))?;
            if decider.is_some() {
                next.persons.mark_deciding(decider.as_deref());
            }
        }
        SessionEvent::DecisionResolved => {
            next.stage.resolve_decision();
            next.persons.mark_deciding(None);
        }
        SessionEvent::AnsweringWindow { opens } => next
            .stage
            .set_answering(opens, current.decision_was_needed)
            .map_err(|err| FoldError::illegal(kind, err))?,
        SessionEvent::QuestionEnded => next
            .stage
            .end_question()
            .map_err(|err| FoldError::illegal(kind, err))?,
        SessionEvent::StakeRoundOpen(window) => next
            .stakes
            .open(window)
            .map_err(|err| FoldError::stake(kind, err))?,
        SessionEvent::StakeProposed { value } => next
            .stakes
            .propose(value)
            .map_err(|err| FoldError::stake(kind, err))?,
        SessionEvent::StakeRoundClose => next.stakes.close(),
        SessionEvent::StakeMessage { message } => next.stakes.message = message,
        SessionEvent::DuelOpen(duel) => next.validation.open(duel),
        SessionEvent::DuelClose => next.validation.close(),
        SessionEvent::RosterAnnounced { persons } => next.persons.replace_roster(persons),
        SessionEvent::PersonUpsert { name, attrs } => next.persons.upsert(name, attrs),
        SessionEvent::PersonRemove { name } => {
            next.persons.remove(&name);
        }
        SessionEvent::PersonReady { name, is_ready } => {
            next.persons.set_ready(&name, is_ready);
        }
        SessionEvent::PersonReplic { name, text } => {
            if next.persons.set_replic(&name, text.clone()) {
                next.last_replic = Some(Replic { sender: name, text });
            }
        }
        SessionEvent::PlayerSum { name, sum } => {
            next.persons.set_sum(&name, sum);
        }
        SessionEvent::TimerStart { timer, maximum } => {
            let paused_by_user = next.stage.is_paused_by_user();
            let armed = next.timers.get_mut(timer);
            armed.start(maximum);
            if !paused_by_user {
                armed.resume(PauseSource::User);
            }
        }
        SessionEvent::TimerPause { timer, source } => next.timers.get_mut(timer).pause(source),
        SessionEvent::TimerResume { timer, source } => next.timers.get_mut(timer).resume(source),
        SessionEvent::TimerTick { timer, delta } => {
            if next.timers.get_mut(timer).tick(delta) {
                effects.push(Effect::TimerElapsed(timer));
            }
        }
        SessionEvent::MainTimerVisibility { visible } => next.show_main_timer = visible,
        SessionEvent::RoleAssigned { role } => next.role = role,
        SessionEvent::AnswerChanged { answer } => next.answer = answer,
        SessionEvent::SelectionChanged {
            is_enabled,
            message,
        } => {
            next.selection.is_enabled = is_enabled;
            next.selection.message = message;
        }
        SessionEvent::HintChanged { hint } => next.hint = hint,
        SessionEvent::GameButtonToggled { enabled } => next.is_game_button_enabled = enabled,
        SessionEvent::SumsEditableToggled { editable } => next.are_sums_editable = editable,
        SessionEvent::ReadingSpeedChanged { speed } => {
            if speed == 0 {
                return Err(FoldError::Malformed {
                    kind,
                    reason: "reading speed must be positive".into(),
                });
            }
            next.reading_speed = speed;
        }
        SessionEvent::SessionEnd => {
            next.stage.reset();
            next.stakes.close();
            next.validation.close();
            next.selection = Default::default();
            next.timers.pause_all(PauseSource::System);
            next.persons.mark_deciding(None);
            next.is_ended = true;
        }
    }

    if next.stage != current.stage {
        next.persons.clear_replics();
        next.decision_was_needed = current.stage.is_decision_needed;
    }

    if next != *current {
        next.version = current.version + 1;
    }

    Ok(Transition {
        snapshot: next,
        effects,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{persons::PersonKind, stage::Stage, stakes::AllowedStakeTypes};

    fn apply(snapshot: &SessionSnapshot, event: SessionEvent) -> SessionSnapshot {
        fold(snapshot, event).unwrap().snapshot
    }

    fn apply_all(events: Vec<SessionEvent>) -> SessionSnapshot {
        events
            .into_iter()
            .fold(SessionSnapshot::default(), |snapshot, event| {
                apply(&snapshot, event)
            })
    }

    fn player(name: &str) -> SessionEvent {
        SessionEvent::PersonUpsert {
            name: name.into(),
            attrs: PersonAttrs {
                is_ready: false,
                kind: PersonKind::Player {
                    sum: 0,
                    stake: None,
                    is_deciding: false,
                },
            },
        }
    }

    fn started() -> SessionSnapshot {
        apply_all(vec![SessionEvent::StageChanged {
            phase: StagePhase::Round,
        }])
    }

    fn duel(answerer: &str, right: &[&str], wrong: &[&str]) -> SessionEvent {
        SessionEvent::DuelOpen(Duel {
            header: "Judge".into(),
            answerer: answerer.into(),
            message: String::new(),
            right_answers: right.iter().map(|s| s.to_string()).collect(),
            wrong_answers: wrong.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn stake_round(minimum: i32, maximum: i32, step: i32) -> SessionEvent {
        SessionEvent::StakeRoundOpen(StakeWindow {
            minimum,
            maximum,
            step,
            allowed: AllowedStakeTypes {
                nominal: false,
                sum: true,
                pass: true,
                all_in: true,
            },
            are_simple: false,
            message: String::new(),
        })
    }

    #[test]
    fn fold_never_mutates_input_and_is_deterministic() {
        let base = started();
        let before = base.clone();

        let first = fold(&base, SessionEvent::TurnStart { theme_index: 2, price: 300 }).unwrap();
        let second = fold(&base, SessionEvent::TurnStart { theme_index: 2, price: 300 }).unwrap();

        assert_eq!(base, before);
        assert_eq!(first, second);
        assert_eq!(first.snapshot.version, base.version + 1);
        assert_eq!(first.snapshot.stage.current_price, 300);
    }

    #[test]
    fn later_duel_replaces_earlier_one() {
        let snapshot = apply_all(vec![
            duel("Alice", &["Paris"], &["London"]),
            duel("Bob", &["42"], &[]),
        ]);

        assert!(snapshot.validation.is_visible);
        assert_eq!(snapshot.validation.name, "Bob");
        assert_eq!(snapshot.validation.right_answers, vec!["42".to_string()]);
        assert!(snapshot.validation.wrong_answers.is_empty());

        let closed = apply(&snapshot, SessionEvent::DuelClose);
        assert!(!closed.validation.is_visible);
        assert!(closed.validation.name.is_empty());
    }

    #[test]
    fn paused_timer_does_not_advance() {
        let snapshot = apply_all(vec![
            SessionEvent::TimerStart {
                timer: TimerId::Round,
                maximum: 10,
            },
            SessionEvent::TimerResume {
                timer: TimerId::Round,
                source: PauseSource::System,
            },
            SessionEvent::TimerTick {
                timer: TimerId::Round,
                delta: 4,
            },
            SessionEvent::TimerPause {
                timer: TimerId::Round,
                source: PauseSource::System,
            },
            SessionEvent::TimerTick {
                timer: TimerId::Round,
                delta: 100,
            },
        ]);

        assert_eq!(snapshot.timers.round.value, 4);
    }

    #[test]
    fn timer_start_waits_for_system_resume() {
        let snapshot = apply_all(vec![SessionEvent::TimerStart {
            timer: TimerId::Press,
            maximum: 50,
        }]);
        assert!(snapshot.timers.press.is_paused_by_system);
        assert!(!snapshot.timers.press.is_paused_by_user);
    }

    #[test]
    fn timer_start_keeps_user_pause_while_game_paused_by_user() {
        let paused = apply(&started(), SessionEvent::PauseToggle { source: PauseSource::User });
        let armed = apply(
            &paused,
            SessionEvent::TimerStart {
                timer: TimerId::Decision,
                maximum: 30,
            },
        );
        assert!(armed.timers.decision.is_paused_by_user);

        let resumed = apply(&armed, SessionEvent::PauseToggle { source: PauseSource::User });
        assert!(!resumed.timers.decision.is_paused_by_user);
    }

    #[test]
    fn elapsed_effect_is_edge_triggered() {
        let mut snapshot = apply_all(vec![
            SessionEvent::TimerStart {
                timer: TimerId::Press,
                maximum: 5,
            },
            SessionEvent::TimerResume {
                timer: TimerId::Press,
                source: PauseSource::System,
            },
        ]);

        let mut elapsed = 0;
        for _ in 0..10 {
            let transition = fold(
                &snapshot,
                SessionEvent::TimerTick {
                    timer: TimerId::Press,
                    delta: 2,
                },
            )
            .unwrap();
            elapsed += transition
                .effects
                .iter()
                .filter(|effect| **effect == Effect::TimerElapsed(TimerId::Press))
                .count();
            snapshot = transition.snapshot;
        }

        assert_eq!(elapsed, 1);
        assert_eq!(snapshot.timers.press.value, 5);
    }

    #[test]
    fn stake_proposals_are_validated() {
        let open = apply(&SessionSnapshot::default(), stake_round(100, 500, 100));
        assert_eq!(open.stakes.stake, 100);

        let err = fold(&open, SessionEvent::StakeProposed { value: 250 }).unwrap_err();
        assert!(matches!(
            err,
            FoldError::Malformed {
                kind: EventKind::StakeProposed,
                ..
            }
        ));
        assert_eq!(open.stakes.stake, 100);

        let accepted = apply(&open, SessionEvent::StakeProposed { value: 300 });
        assert_eq!(accepted.stakes.stake, 300);
    }

    #[test]
    fn stake_without_round_is_illegal() {
        let err = fold(
            &SessionSnapshot::default(),
            SessionEvent::StakeProposed { value: 100 },
        )
        .unwrap_err();
        assert!(matches!(err, FoldError::IllegalTransition { .. }));
    }

    #[test]
    fn inverted_stake_window_is_malformed() {
        let err = fold(&SessionSnapshot::default(), stake_round(500, 100, 100)).unwrap_err();
        assert!(matches!(err, FoldError::Malformed { .. }));
    }

    #[test]
    fn unknown_person_updates_are_silent_noops() {
        let snapshot = apply_all(vec![
            player("Alice"),
            player("Carl"),
            SessionEvent::PersonRemove {
                name: "Carl".into(),
            },
        ]);

        let transition = fold(
            &snapshot,
            SessionEvent::PersonReady {
                name: "Carl".into(),
                is_ready: true,
            },
        )
        .unwrap();
        assert_eq!(transition.snapshot, snapshot);
        assert!(transition.effects.is_empty());
    }

    #[test]
    fn answering_needs_a_decision_window() {
        let base = started();
        let err = fold(&base, SessionEvent::AnsweringWindow { opens: true }).unwrap_err();
        assert!(matches!(
            err,
            FoldError::IllegalTransition {
                kind: EventKind::AnsweringWindow,
                ..
            }
        ));

        let deciding = apply(&base, SessionEvent::DecisionNeeded { decider: None });
        let resolved = apply(&deciding, SessionEvent::DecisionResolved);
        // The previous snapshot still had a pending decision.
        let answering = apply(&resolved, SessionEvent::AnsweringWindow { opens: true });
        assert!(answering.stage.is_answering);

        let late = apply(&resolved, SessionEvent::QuestionEnded);
        assert!(fold(&late, SessionEvent::AnsweringWindow { opens: true }).is_err());
    }

    #[test]
    fn decision_allowance_survives_unrelated_events() {
        let resolved = apply_all(vec![
            SessionEvent::StageChanged {
                phase: StagePhase::Round,
            },
            SessionEvent::TimerStart {
                timer: TimerId::Round,
                maximum: 0,
            },
            SessionEvent::TimerResume {
                timer: TimerId::Round,
                source: PauseSource::System,
            },
            SessionEvent::DecisionNeeded { decider: None },
            SessionEvent::DecisionResolved,
        ]);
        let ticked = apply(
            &resolved,
            SessionEvent::TimerTick {
                timer: TimerId::Round,
                delta: 1,
            },
        );
        let chatted = apply(&ticked, SessionEvent::HintChanged { hint: Some("x".into()) });
        assert_eq!(chatted.version, resolved.version + 2);

        let answering = apply(&chatted, SessionEvent::AnsweringWindow { opens: true });
        assert!(answering.stage.is_answering);
    }

    #[test]
    fn game_resume_leaves_idle_timers_paused() {
        let resumed = apply_all(vec![
            SessionEvent::StageChanged {
                phase: StagePhase::Round,
            },
            SessionEvent::TimerStart {
                timer: TimerId::Round,
                maximum: 0,
            },
            SessionEvent::TimerResume {
                timer: TimerId::Round,
                source: PauseSource::System,
            },
            SessionEvent::PauseToggle {
                source: PauseSource::System,
            },
            SessionEvent::PauseToggle {
                source: PauseSource::System,
            },
        ]);
        assert!(!resumed.stage.is_game_paused);
        assert!(resumed.timers.round.is_running());
        assert!(resumed.timers.press.is_paused_by_system);

        let ticked = apply(
            &resumed,
            SessionEvent::TimerTick {
                timer: TimerId::Press,
                delta: 7,
            },
        );
        assert_eq!(ticked.timers.press.value, 0);
    }

    #[test]
    fn pause_before_start_is_accepted_without_change() {
        let base = SessionSnapshot::default();
        let transition = fold(&base, SessionEvent::PauseToggle { source: PauseSource::User }).unwrap();
        assert_eq!(transition.snapshot, base);
    }

    #[test]
    fn pause_toggle_drives_timer_flags() {
        let paused = apply(&started(), SessionEvent::PauseToggle { source: PauseSource::User });
        assert!(paused.stage.is_game_paused);
        assert!(TimerId::ALL.iter().all(|id| paused.timers.get(*id).is_paused_by_user));

        let err = fold(&paused, SessionEvent::PauseToggle { source: PauseSource::System }).unwrap_err();
        assert!(matches!(err, FoldError::IllegalTransition { .. }));
    }

    #[test]
    fn stage_change_clears_replics_but_replic_event_does_not() {
        let snapshot = apply(&started(), player("Alice"));
        let spoke = apply(
            &snapshot,
            SessionEvent::PersonReplic {
                name: "Alice".into(),
                text: "Movies for 200".into(),
            },
        );
        assert_eq!(
            spoke.persons.players["Alice"].replic.as_deref(),
            Some("Movies for 200")
        );
        assert_eq!(spoke.last_replic.as_ref().unwrap().sender, "Alice");

        let turn = apply(&spoke, SessionEvent::TurnStart { theme_index: 0, price: 200 });
        assert!(turn.persons.players["Alice"].replic.is_none());
    }

    #[test]
    fn decision_marks_the_decider() {
        let snapshot = apply_all(vec![
            SessionEvent::StageChanged {
                phase: StagePhase::Round,
            },
            player("Alice"),
            player("Bob"),
            SessionEvent::DecisionNeeded {
                decider: Some("Bob".into()),
            },
        ]);
        assert!(snapshot.persons.players["Bob"].is_deciding);

        let next = apply(&snapshot, SessionEvent::TurnStart { theme_index: 1, price: 100 });
        assert!(!next.persons.players["Bob"].is_deciding);
    }

    #[test]
    fn session_end_is_terminal() {
        let snapshot = apply_all(vec![
            SessionEvent::StageChanged {
                phase: StagePhase::Round,
            },
            SessionEvent::DecisionNeeded { decider: None },
            stake_round(0, 100, 10),
            duel("Alice", &["a"], &[]),
            SessionEvent::SessionEnd,
        ]);

        assert!(snapshot.is_ended);
        assert_eq!(snapshot.stage, Stage::default());
        assert!(!snapshot.stakes.are_visible);
        assert!(!snapshot.validation.is_visible);

        let err = fold(&snapshot, SessionEvent::TurnStart { theme_index: 0, price: 100 }).unwrap_err();
        assert_eq!(
            err,
            FoldError::SessionEnded {
                kind: EventKind::TurnStart
            }
        );
        assert!(fold(&snapshot, SessionEvent::SessionEnd).is_err());
    }

    #[test]
    fn version_only_moves_on_change() {
        let base = SessionSnapshot::default();
        let changed = apply(&base, SessionEvent::GameButtonToggled { enabled: false });
        assert_eq!(changed.version, 1);

        let same = apply(&changed, SessionEvent::GameButtonToggled { enabled: false });
        assert_eq!(same.version, 1);
    }

    #[test]
    fn zero_reading_speed_is_malformed() {
        let err = fold(
            &SessionSnapshot::default(),
            SessionEvent::ReadingSpeedChanged { speed: 0 },
        )
        .unwrap_err();
        assert_eq!(err.kind(), EventKind::ReadingSpeedChanged);
    }

    #[test]
    fn retained_snapshots_are_unaffected_by_later_folds() {
        let first = apply(&SessionSnapshot::default(), player("Alice"));
        let history = vec![first.clone()];
        let _second = apply(
            &first,
            SessionEvent::PlayerSum {
                name: "Alice".into(),
                sum: 500,
            },
        );
        assert_eq!(history[0].persons.players["Alice"].sum, 0);
    }
}
