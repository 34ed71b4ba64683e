//! Wire representation of inbound session events.
//!
//! Every message is a JSON object tagged by `"type"`. Payloads are validated
//! before they are turned into [`SessionEvent`]s; a message failing its shape
//! contract is rejected as a whole.

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dto::validation::{validate_answer_list, validate_person_name, validate_roster},
    error::DecodeError,
    state::{
        Role, SessionEvent,
        persons::{PersonAttrs, PersonKind},
        stage::StagePhase,
        stakes::{AllowedStakeTypes, StakeType, StakeWindow},
        timers::{PauseSource, TimerId},
        validation::Duel,
    },
};

/// Slowest and fastest accepted reading pace, in characters per second.
const READING_SPEED_RANGE: std::ops::RangeInclusive<u32> = 1..=100;

/// Messages accepted from the server connection or the local UI.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Game moved to another phase.
    StageChanged {
        /// New phase.
        phase: StagePhase,
    },
    /// A question was picked.
    TurnStart {
        /// Zero-based theme of the picked question.
        theme_index: usize,
        /// Nominal price.
        price: i32,
    },
    /// Pause button pressed.
    PauseToggle {
        /// Who pressed it.
        source: PauseSource,
    },
    /// Someone has to choose.
    DecisionNeeded {
        /// Player making the choice, if a single one does.
        #[serde(default)]
        decider: Option<String>,
    },
    /// The pending choice was made.
    DecisionResolved,
    /// Answering opens or closes.
    AnsweringWindow {
        /// `true` to open.
        opens: bool,
    },
    /// The current question is over.
    QuestionEnded,
    /// Stake round begins.
    StakeRoundOpen(StakeRoundPayload),
    /// Local wager proposal.
    StakeProposed {
        /// Proposed wager.
        value: i32,
    },
    /// Stake round is over.
    StakeRoundClose,
    /// Transient stake panel message.
    StakeMessage {
        /// Text to show.
        message: String,
    },
    /// An answer must be judged.
    DuelOpen(DuelPayload),
    /// Judging is over.
    DuelClose,
    /// Full roster in seat order.
    RosterAnnounced {
        /// Every person at the table.
        persons: Vec<PersonPayload>,
    },
    /// One person joined or changed.
    PersonUpsert(PersonPayload),
    /// One person left.
    PersonRemove {
        /// Person name.
        name: String,
    },
    /// Readiness changed.
    PersonReady {
        /// Person name.
        name: String,
        /// New readiness.
        is_ready: bool,
    },
    /// A person said something.
    PersonReplic {
        /// Speaker name.
        name: String,
        /// Spoken text.
        text: String,
    },
    /// Player score changed.
    PlayerSum {
        /// Player name.
        name: String,
        /// New score.
        sum: i32,
    },
    /// Arm a timer.
    TimerStart {
        /// Timer to arm.
        timer: TimerId,
        /// Cap in tenths of a second; `0` is unbounded.
        #[serde(default)]
        maximum: u32,
    },
    /// Engage one pause flag of a timer.
    TimerPause {
        /// Target timer.
        timer: TimerId,
        /// Flag to engage.
        source: PauseSource,
    },
    /// Release one pause flag of a timer.
    TimerResume {
        /// Target timer.
        timer: TimerId,
        /// Flag to release.
        source: PauseSource,
    },
    /// Advance a timer.
    TimerTick {
        /// Target timer.
        timer: TimerId,
        /// Elapsed tenths of a second.
        delta: u32,
    },
    /// Show or hide the main timer.
    MainTimerVisibility {
        /// Whether it is shown.
        visible: bool,
    },
    /// Local capacity changed.
    RoleAssigned {
        /// New role.
        role: Role,
    },
    /// Local pending answer edited.
    AnswerChanged {
        /// Answer text, `None` to clear.
        #[serde(default)]
        answer: Option<String>,
    },
    /// Selection prompt changed.
    SelectionChanged {
        /// Whether selecting is allowed.
        is_enabled: bool,
        /// Prompt text.
        #[serde(default)]
        message: String,
    },
    /// Hint changed.
    HintChanged {
        /// Hint text, `None` to clear.
        #[serde(default)]
        hint: Option<String>,
    },
    /// Game button enabled or disabled.
    GameButtonToggled {
        /// Whether it is enabled.
        enabled: bool,
    },
    /// Score editing enabled or disabled.
    SumsEditableToggled {
        /// Whether scores are editable.
        editable: bool,
    },
    /// Reading pace changed.
    ReadingSpeedChanged {
        /// Characters per second.
        speed: u32,
    },
    /// The session is over.
    SessionEnd,
    /// Tag outside the catalog.
    #[serde(other)]
    Unknown,
}

/// Stake window announced by the server.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_stake_bounds"))]
pub struct StakeRoundPayload {
    /// Smallest accepted wager.
    pub minimum: i32,
    /// Largest accepted wager.
    pub maximum: i32,
    /// Granularity above `minimum`; `0` accepts any value.
    #[serde(default)]
    #[validate(range(min = 0))]
    pub step: i32,
    /// Stake types on offer.
    #[serde(default)]
    pub allowed: Vec<StakeType>,
    /// Only pass and all-in are offered.
    #[serde(default)]
    pub are_simple: bool,
    /// Panel message.
    #[serde(default)]
    #[validate(length(max = 512))]
    pub message: String,
}

/// Duel contents sent when an answer must be judged.
#[derive(Debug, Deserialize, Validate)]
pub struct DuelPayload {
    /// Panel title.
    #[serde(default)]
    #[validate(length(max = 256))]
    pub header: String,
    /// Player whose answer is judged.
    #[validate(custom(function = "validate_person_name"))]
    pub answerer: String,
    /// The answer given.
    #[serde(default)]
    pub message: String,
    /// Reference answers counted as correct.
    #[serde(default)]
    #[validate(custom(function = "validate_answer_list"))]
    pub right_answers: Vec<String>,
    /// Reference answers counted as wrong.
    #[serde(default)]
    #[validate(custom(function = "validate_answer_list"))]
    pub wrong_answers: Vec<String>,
}

/// Seat taken by an announced person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonRole {
    /// Host seat.
    Showman,
    /// Contestant seat.
    Player,
}

/// One person as announced by the server.
#[derive(Debug, Deserialize, Validate)]
pub struct PersonPayload {
    /// Display name, unique at the table.
    #[validate(custom(function = "validate_person_name"))]
    pub name: String,
    /// Seat taken.
    pub role: PersonRole,
    /// Ready flag.
    #[serde(default)]
    pub is_ready: bool,
    /// Score; ignored for the showman.
    #[serde(default)]
    pub sum: i32,
    /// Current wager; ignored for the showman.
    #[serde(default)]
    pub stake: Option<i32>,
    /// Whether this player is choosing; ignored for the showman.
    #[serde(default)]
    pub is_deciding: bool,
}

fn validate_stake_bounds(payload: &StakeRoundPayload) -> Result<(), ValidationError> {
    if payload.minimum > payload.maximum {
        let mut err = ValidationError::new("stake_bounds");
        err.message = Some(
            format!(
                "Stake minimum {} exceeds maximum {}",
                payload.minimum, payload.maximum
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

impl Validate for InboundEvent {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        match self {
            InboundEvent::StakeRoundOpen(payload) => return payload.validate(),
            InboundEvent::DuelOpen(payload) => return payload.validate(),
            InboundEvent::PersonUpsert(payload) => return payload.validate(),
            InboundEvent::RosterAnnounced { persons } => {
                for person in persons {
                    person.validate()?;
                }
                let entries = persons
                    .iter()
                    .map(|person| (person.name.as_str(), person.role == PersonRole::Showman));
                if let Err(e) = validate_roster(entries) {
                    errors.add("persons", e);
                }
            }
            InboundEvent::DecisionNeeded {
                decider: Some(name),
            }
            | InboundEvent::PersonRemove { name }
            | InboundEvent::PersonReady { name, .. }
            | InboundEvent::PersonReplic { name, .. }
            | InboundEvent::PlayerSum { name, .. } => {
                if let Err(e) = validate_person_name(name) {
                    errors.add("name", e);
                }
            }
            InboundEvent::ReadingSpeedChanged { speed } => {
                if !READING_SPEED_RANGE.contains(speed) {
                    let mut err = ValidationError::new("reading_speed_range");
                    err.message = Some(
                        format!(
                            "Reading speed must be within {}..={} (got {speed})",
                            READING_SPEED_RANGE.start(),
                            READING_SPEED_RANGE.end()
                        )
                        .into(),
                    );
                    errors.add("speed", err);
                }
            }
            _ => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl InboundEvent {
    /// Parse and validate a JSON message into a [`SessionEvent`].
    pub fn decode(text: &str) -> Result<SessionEvent, DecodeError> {
        let inbound: InboundEvent = serde_json::from_str(text)?;
        SessionEvent::try_from(inbound)
    }
}

impl From<PersonPayload> for (String, PersonAttrs) {
    fn from(value: PersonPayload) -> Self {
        let kind = match value.role {
            PersonRole::Showman => PersonKind::Showman,
            PersonRole::Player => PersonKind::Player {
                sum: value.sum,
                stake: value.stake,
                is_deciding: value.is_deciding,
            },
        };
        (
            value.name,
            PersonAttrs {
                is_ready: value.is_ready,
                kind,
            },
        )
    }
}

impl From<StakeRoundPayload> for StakeWindow {
    fn from(value: StakeRoundPayload) -> Self {
        let mut allowed = AllowedStakeTypes::default();
        for kind in value.allowed {
            match kind {
                StakeType::Nominal => allowed.nominal = true,
                StakeType::Sum => allowed.sum = true,
                StakeType::Pass => allowed.pass = true,
                StakeType::AllIn => allowed.all_in = true,
            }
        }
        Self {
            minimum: value.minimum,
            maximum: value.maximum,
            step: value.step,
            allowed,
            are_simple: value.are_simple,
            message: value.message,
        }
    }
}

impl From<DuelPayload> for Duel {
    fn from(value: DuelPayload) -> Self {
        Self {
            header: value.header,
            answerer: value.answerer,
            message: value.message,
            right_answers: value.right_answers,
            wrong_answers: value.wrong_answers,
        }
    }
}

impl TryFrom<InboundEvent> for SessionEvent {
    type Error = DecodeError;

    fn try_from(value: InboundEvent) -> Result<Self, Self::Error> {
        value.validate()?;

        let event = match value {
            InboundEvent::StageChanged { phase } => SessionEvent::StageChanged { phase },
            InboundEvent::TurnStart { theme_index, price } => {
                SessionEvent::TurnStart { theme_index, price }
            }
            InboundEvent::PauseToggle { source } => SessionEvent::PauseToggle { source },
            InboundEvent::DecisionNeeded { decider } => SessionEvent::DecisionNeeded { decider },
            InboundEvent::DecisionResolved => SessionEvent::DecisionResolved,
            InboundEvent::AnsweringWindow { opens } => SessionEvent::AnsweringWindow { opens },
            InboundEvent::QuestionEnded => SessionEvent::QuestionEnded,
            InboundEvent::StakeRoundOpen(payload) => SessionEvent::StakeRoundOpen(payload.into()),
            InboundEvent::StakeProposed { value } => SessionEvent::StakeProposed { value },
            InboundEvent::StakeRoundClose => SessionEvent::StakeRoundClose,
            InboundEvent::StakeMessage { message } => SessionEvent::StakeMessage { message },
            InboundEvent::DuelOpen(payload) => SessionEvent::DuelOpen(payload.into()),
            InboundEvent::DuelClose => SessionEvent::DuelClose,
            InboundEvent::RosterAnnounced { persons } => SessionEvent::RosterAnnounced {
                persons: persons.into_iter().map(Into::into).collect(),
            },
            InboundEvent::PersonUpsert(payload) => {
                let (name, attrs) = payload.into();
                SessionEvent::PersonUpsert { name, attrs }
            }
            InboundEvent::PersonRemove { name } => SessionEvent::PersonRemove { name },
            InboundEvent::PersonReady { name, is_ready } => {
                SessionEvent::PersonReady { name, is_ready }
            }
            InboundEvent::PersonReplic { name, text } => SessionEvent::PersonReplic { name, text },
            InboundEvent::PlayerSum { name, sum } => SessionEvent::PlayerSum { name, sum },
            InboundEvent::TimerStart { timer, maximum } => {
                SessionEvent::TimerStart { timer, maximum }
            }
            InboundEvent::TimerPause { timer, source } => SessionEvent::TimerPause { timer, source },
            InboundEvent::TimerResume { timer, source } => {
                SessionEvent::TimerResume { timer, source }
            }
            InboundEvent::TimerTick { timer, delta } => SessionEvent::TimerTick { timer, delta },
            InboundEvent::MainTimerVisibility { visible } => {
                SessionEvent::MainTimerVisibility { visible }
            }
            InboundEvent::RoleAssigned { role } => SessionEvent::RoleAssigned { role },
            InboundEvent::AnswerChanged { answer } => SessionEvent::AnswerChanged { answer },
            InboundEvent::SelectionChanged {
                is_enabled,
                message,
            } => SessionEvent::SelectionChanged {
                is_enabled,
                message,
            },
            InboundEvent::HintChanged { hint } => SessionEvent::HintChanged { hint },
            InboundEvent::GameButtonToggled { enabled } => {
                SessionEvent::GameButtonToggled { enabled }
            }
            InboundEvent::SumsEditableToggled { editable } => {
                SessionEvent::SumsEditableToggled { editable }
            }
            InboundEvent::ReadingSpeedChanged { speed } => {
                SessionEvent::ReadingSpeedChanged { speed }
            }
            InboundEvent::SessionEnd => SessionEvent::SessionEnd,
            InboundEvent::Unknown => return Err(DecodeError::UnknownEvent),
        };

        Ok(event)
    }
}
