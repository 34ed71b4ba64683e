//! Top-level phase and turn facets of the session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::timers::PauseSource;

/// Named phase of the game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePhase {
    /// Waiting for the game to begin.
    #[default]
    Before,
    /// Opening announcements.
    Begin,
    /// A regular round is being played.
    Round,
    /// Final round.
    Final,
    /// Game is over, results are shown.
    After,
}

/// Transition refused by the stage rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    /// The event needs a started game.
    #[error("game has not started")]
    NotStarted,
    /// A started game cannot go back to the `before` phase.
    #[error("game already started; cannot return to {0:?}")]
    AlreadyStarted(StagePhase),
    /// Answering opened without a decision point.
    #[error("answering window requires a pending decision")]
    AnsweringOutsideDecision,
    /// Resume requested by a different source than the one that paused.
    #[error("game paused by {paused_by:?} cannot be resumed by {requested:?}")]
    PausedByOtherSource {
        /// Source holding the pause.
        paused_by: PauseSource,
        /// Source asking to resume.
        requested: PauseSource,
    },
}

/// Outcome of a pause toggle, telling the caller what to do with timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseChange {
    /// Nothing happened (game not started).
    Unchanged,
    /// Game paused by the given source.
    Paused(PauseSource),
    /// Game resumed; the given source was released.
    Resumed(PauseSource),
}

/// Stage facets. Several facets may hold at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    /// Phase name.
    pub name: StagePhase,
    /// Game paused.
    pub is_game_paused: bool,
    /// Source that paused the game.
    pub pause_source: Option<PauseSource>,
    /// Game started.
    pub is_game_started: bool,
    /// A decision is pending.
    pub is_decision_needed: bool,
    /// Someone is answering.
    pub is_answering: bool,
    /// The question has been played out.
    pub is_after_question: bool,
    /// Theme of the current question.
    pub theme_index: Option<usize>,
    /// Price of the current question.
    pub current_price: i32,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            name: StagePhase::Before,
            is_game_paused: false,
            pause_source: None,
            is_game_started: false,
            is_decision_needed: false,
            is_answering: false,
            is_after_question: false,
            theme_index: None,
            current_price: 0,
        }
    }
}

impl Stage {
    /// Enter a phase. Any phase past `before` starts the game.
    pub fn change_phase(&mut self, phase: StagePhase) -> Result<(), StageError> {
        if phase == StagePhase::Before && self.is_game_started {
            return Err(StageError::AlreadyStarted(phase));
        }
        self.name = phase;
        if phase != StagePhase::Before {
            self.is_game_started = true;
        }
        Ok(())
    }

    /// Flip the paused facet. No-op before the game starts.
    pub fn toggle_pause(&mut self, source: PauseSource) -> Result<PauseChange, StageError> {
        if !self.is_game_started {
            return Ok(PauseChange::Unchanged);
        }

        match self.pause_source {
            None => {
                self.is_game_paused = true;
                self.pause_source = Some(source);
                Ok(PauseChange::Paused(source))
            }
            Some(paused_by) if paused_by == source => {
                self.is_game_paused = false;
                self.pause_source = None;
                Ok(PauseChange::Resumed(source))
            }
            Some(paused_by) => Err(StageError::PausedByOtherSource {
                paused_by,
                requested: source,
            }),
        }
    }

    /// Whether the game is paused by a person.
    pub fn is_paused_by_user(&self) -> bool {
        self.pause_source == Some(PauseSource::User)
    }

    /// Start a turn, replacing the question metadata wholesale.
    pub fn start_turn(&mut self, theme_index: usize, price: i32) -> Result<(), StageError> {
        self.require_started()?;
        self.theme_index = Some(theme_index);
        self.current_price = price;
        self.is_decision_needed = false;
        self.is_answering = false;
        self.is_after_question = false;
        Ok(())
    }

    /// Raise the decision-needed facet.
    pub fn need_decision(&mut self) -> Result<(), StageError> {
        self.require_started()?;
        self.is_decision_needed = true;
        Ok(())
    }

    /// Clear the decision-needed facet.
    pub fn resolve_decision(&mut self) {
        self.is_decision_needed = false;
    }

    /// Open or close the answering window.
    ///
    /// Opening is legal while a decision is pending or when one was pending
    /// in the snapshot just before this one.
    pub fn set_answering(
        &mut self,
        opens: bool,
        decision_was_needed: bool,
    ) -> Result<(), StageError> {
        if opens && !(self.is_decision_needed || decision_was_needed) {
            return Err(StageError::AnsweringOutsideDecision);
        }
        self.is_answering = opens;
        Ok(())
    }

    /// Mark the question as played out.
    pub fn end_question(&mut self) -> Result<(), StageError> {
        self.require_started()?;
        self.is_after_question = true;
        self.is_answering = false;
        Ok(())
    }

    /// Return every facet to its initial value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn require_started(&self) -> Result<(), StageError> {
        if self.is_game_started {
            Ok(())
        } else {
            Err(StageError::NotStarted)
        }
    }
}
