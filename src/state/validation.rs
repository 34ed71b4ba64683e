//! Answer-judging overlay ("duel").

use serde::Serialize;

/// Contents of a duel to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duel {
    /// Overlay title.
    pub header: String,
    /// Player whose answer is judged.
    pub answerer: String,
    /// Text of the given answer or a prompt.
    pub message: String,
    /// Candidate right answers, in display order.
    pub right_answers: Vec<String>,
    /// Candidate wrong answers, in display order.
    pub wrong_answers: Vec<String>,
}

/// Duel overlay state. At most one duel is visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationState {
    /// Overlay shown.
    pub is_visible: bool,
    /// Overlay title.
    pub header: String,
    /// Answering player.
    pub name: String,
    /// Given answer or prompt.
    pub message: String,
    /// Candidate right answers.
    pub right_answers: Vec<String>,
    /// Candidate wrong answers.
    pub wrong_answers: Vec<String>,
}

impl ValidationState {
    /// Show `duel`, replacing whatever duel was open.
    pub fn open(&mut self, duel: Duel) {
        *self = Self {
            is_visible: true,
            header: duel.header,
            name: duel.answerer,
            message: duel.message,
            right_answers: duel.right_answers,
            wrong_answers: duel.wrong_answers,
        };
    }

    /// Hide the overlay and drop its contents.
    pub fn close(&mut self) {
        *self = Self::default();
    }
}
