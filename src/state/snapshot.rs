//! Immutable aggregate describing the live session.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use uuid::Uuid;

use crate::state::{
    persons::Persons, stage::Stage, stakes::StakeState, timers::Timers,
    validation::ValidationState,
};

/// Default reading pace, in characters per second.
pub const DEFAULT_READING_SPEED: u32 = 20;

/// Capacity in which the local viewer takes part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Plays and answers.
    #[default]
    Player,
    /// Hosts and judges.
    Showman,
    /// Watches only.
    Viewer,
}

/// Target-picking prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Prompt active.
    pub is_enabled: bool,
    /// Prompt text.
    pub message: String,
}

/// Latest thing someone said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replic {
    /// Speaker.
    pub sender: String,
    /// Spoken text.
    pub text: String,
}

/// One version of the session model. Snapshots are never edited in place;
/// each accepted event yields a fresh one.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Identifier assigned when the session was joined.
    pub session_id: Uuid,
    /// Incremented by every fold that changes the model.
    pub version: u64,
    /// Set by `session-end`; no further events are accepted.
    pub is_ended: bool,
    /// Showman and players.
    pub persons: Persons,
    /// Local viewer capacity.
    pub role: Role,
    /// Locally typed answer not yet sent.
    pub answer: Option<String>,
    /// Latest replic across all persons.
    pub last_replic: Option<Replic>,
    /// Phase and turn facets.
    pub stage: Stage,
    /// Round, press and decision timers.
    pub timers: Timers,
    /// Whether the round timer is displayed.
    pub show_main_timer: bool,
    /// Target-picking prompt.
    pub selection: Selection,
    /// Stake panel.
    pub stakes: StakeState,
    /// Duel overlay.
    pub validation: ValidationState,
    /// Hint displayed to the viewer.
    pub hint: Option<String>,
    /// Game button enabled.
    pub is_game_button_enabled: bool,
    /// Showman may edit player sums.
    pub are_sums_editable: bool,
    /// Question text reading pace.
    pub reading_speed: u32,
    /// Decision facet of the stage before its last change, used to validate
    /// the answering window.
    #[serde(skip)]
    pub(crate) decision_was_needed: bool,
}

impl SessionSnapshot {
    /// Baseline snapshot for a freshly joined session.
    pub fn joined(role: Role, reading_speed: u32) -> Self {
        Self::with_id(Uuid::new_v4(), role, reading_speed)
    }

    /// Baseline snapshot with a caller-chosen identifier.
    pub fn with_id(session_id: Uuid, role: Role, reading_speed: u32) -> Self {
        Self {
            session_id,
            version: 0,
            is_ended: false,
            persons: Persons::default(),
            role,
            answer: None,
            last_replic: None,
            stage: Stage::default(),
            timers: Timers::default(),
            show_main_timer: false,
            selection: Selection::default(),
            stakes: StakeState::default(),
            validation: ValidationState::default(),
            hint: None,
            is_game_button_enabled: true,
            are_sums_editable: false,
            reading_speed,
            decision_was_needed: false,
        }
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::with_id(Uuid::nil(), Role::default(), DEFAULT_READING_SPEED)
    }
}
