//! Wager window for auction-style questions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kinds of stake a player can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeType {
    /// Play for the nominal question price.
    Nominal,
    /// Wager an explicit amount.
    Sum,
    /// Decline to bid.
    Pass,
    /// Wager the whole sum.
    AllIn,
}

/// Which stake types the server currently allows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedStakeTypes {
    /// [`StakeType::Nominal`] allowed.
    pub nominal: bool,
    /// [`StakeType::Sum`] allowed.
    pub sum: bool,
    /// [`StakeType::Pass`] allowed.
    pub pass: bool,
    /// [`StakeType::AllIn`] allowed.
    pub all_in: bool,
}

impl AllowedStakeTypes {
    /// Raw lookup, ignoring simple mode.
    pub fn contains(&self, kind: StakeType) -> bool {
        match kind {
            StakeType::Nominal => self.nominal,
            StakeType::Sum => self.sum,
            StakeType::Pass => self.pass,
            StakeType::AllIn => self.all_in,
        }
    }
}

/// Bounds announced by the server when a stake round opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeWindow {
    /// Smallest legal stake.
    pub minimum: i32,
    /// Largest legal stake.
    pub maximum: i32,
    /// Increment between legal stakes; `0` disables the step rule.
    pub step: i32,
    /// Allowed stake kinds.
    pub allowed: AllowedStakeTypes,
    /// Restrict the round to pass / all-in.
    pub are_simple: bool,
    /// Prompt shown with the panel.
    pub message: String,
}

/// Reasons a stake round or proposal is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakeError {
    /// The window bounds are inverted.
    #[error("stake window is empty (minimum {minimum} > maximum {maximum})")]
    EmptyWindow {
        /// Announced minimum.
        minimum: i32,
        /// Announced maximum.
        maximum: i32,
    },
    /// Negative step.
    #[error("stake step must not be negative (got {0})")]
    NegativeStep(i32),
    /// No stake round is open.
    #[error("no stake round is open")]
    NotOpen,
    /// Proposal falls outside the window.
    #[error("stake {value} is outside [{minimum}, {maximum}]")]
    OutOfRange {
        /// Proposed value.
        value: i32,
        /// Window minimum.
        minimum: i32,
        /// Window maximum.
        maximum: i32,
    },
    /// Proposal is not a multiple of the step above the minimum.
    #[error("stake {value} is not on a step of {step} from {minimum}")]
    OffStep {
        /// Proposed value.
        value: i32,
        /// Window minimum.
        minimum: i32,
        /// Window step.
        step: i32,
    },
}

/// Stake panel state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeState {
    /// Panel shown.
    pub are_visible: bool,
    /// Only pass / all-in are offered.
    pub are_simple: bool,
    /// Stake kinds announced by the server.
    pub allowed_stake_types: AllowedStakeTypes,
    /// Smallest legal stake.
    pub minimum: i32,
    /// Largest legal stake.
    pub maximum: i32,
    /// Step between legal stakes.
    pub step: i32,
    /// Current stake.
    pub stake: i32,
    /// Transient message.
    pub message: String,
}

impl StakeState {
    /// Open a round, superseding any round that is still open.
    pub fn open(&mut self, window: StakeWindow) -> Result<(), StakeError> {
        if window.minimum > window.maximum {
            return Err(StakeError::EmptyWindow {
                minimum: window.minimum,
                maximum: window.maximum,
            });
        }
        if window.step < 0 {
            return Err(StakeError::NegativeStep(window.step));
        }

        *self = Self {
            are_visible: true,
            are_simple: window.are_simple,
            allowed_stake_types: window.allowed,
            minimum: window.minimum,
            maximum: window.maximum,
            step: window.step,
            stake: window.minimum,
            message: window.message,
        };
        Ok(())
    }

    /// Check a proposal against the open window without applying it.
    pub fn check(&self, value: i32) -> Result<(), StakeError> {
        if !self.are_visible {
            return Err(StakeError::NotOpen);
        }
        if value < self.minimum || value > self.maximum {
            return Err(StakeError::OutOfRange {
                value,
                minimum: self.minimum,
                maximum: self.maximum,
            });
        }
        // i64 keeps `value - minimum` from overflowing on extreme windows.
        if self.step > 0 && (i64::from(value) - i64::from(self.minimum)) % i64::from(self.step) != 0
        {
            return Err(StakeError::OffStep {
                value,
                minimum: self.minimum,
                step: self.step,
            });
        }
        Ok(())
    }

    /// Accept `value` as the current stake if it is legal.
    pub fn propose(&mut self, value: i32) -> Result<(), StakeError> {
        self.check(value)?;
        self.stake = value;
        Ok(())
    }

    /// Hide the panel and withdraw every stake type.
    pub fn close(&mut self) {
        self.are_visible = false;
        self.allowed_stake_types = AllowedStakeTypes::default();
    }

    /// Whether `kind` may be offered, taking simple mode into account.
    pub fn is_allowed(&self, kind: StakeType) -> bool {
        if !self.are_visible {
            return false;
        }
        if self.are_simple {
            return matches!(kind, StakeType::Pass | StakeType::AllIn);
        }
        self.allowed_stake_types.contains(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(minimum: i32, maximum: i32, step: i32) -> StakeWindow {
        StakeWindow {
            minimum,
            maximum,
            step,
            allowed: AllowedStakeTypes {
                nominal: true,
                sum: true,
                pass: true,
                all_in: false,
            },
            are_simple: false,
            message: "make your stake".into(),
        }
    }

    #[test]
    fn open_seeds_stake_with_minimum() {
        let mut stakes = StakeState::default();
        stakes.open(window(100, 500, 100)).unwrap();
        assert!(stakes.are_visible);
        assert_eq!(stakes.stake, 100);
        assert_eq!(stakes.message, "make your stake");
    }

    #[test]
    fn off_step_proposal_is_rejected_then_valid_one_accepted() {
        let mut stakes = StakeState::default();
        stakes.open(window(100, 500, 100)).unwrap();

        let err = stakes.propose(250).unwrap_err();
        assert_eq!(
            err,
            StakeError::OffStep {
                value: 250,
                minimum: 100,
                step: 100
            }
        );
        assert_eq!(stakes.stake, 100);

        stakes.propose(300).unwrap();
        assert_eq!(stakes.stake, 300);
    }

    #[test]
    fn out_of_range_proposals_leave_stake_unchanged() {
        let mut stakes = StakeState::default();
        stakes.open(window(100, 500, 0)).unwrap();
        stakes.propose(420).unwrap();

        assert!(matches!(
            stakes.propose(99),
            Err(StakeError::OutOfRange { .. })
        ));
        assert!(matches!(
            stakes.propose(501),
            Err(StakeError::OutOfRange { .. })
        ));
        assert_eq!(stakes.stake, 420);
    }

    #[test]
    fn proposal_without_open_round_is_refused() {
        let mut stakes = StakeState::default();
        assert_eq!(stakes.propose(0), Err(StakeError::NotOpen));
    }

    #[test]
    fn inverted_or_negative_windows_are_refused() {
        let mut stakes = StakeState::default();
        assert!(matches!(
            stakes.open(window(500, 100, 100)),
            Err(StakeError::EmptyWindow { .. })
        ));
        assert_eq!(
            stakes.open(window(0, 100, -5)),
            Err(StakeError::NegativeStep(-5))
        );
        assert!(!stakes.are_visible);
    }

    #[test]
    fn new_round_supersedes_open_round() {
        let mut stakes = StakeState::default();
        stakes.open(window(100, 500, 100)).unwrap();
        stakes.propose(400).unwrap();

        stakes.open(window(1000, 2000, 500)).unwrap();
        assert_eq!(stakes.stake, 1000);
        assert_eq!(stakes.maximum, 2000);
    }

    #[test]
    fn close_hides_panel_and_clears_types() {
        let mut stakes = StakeState::default();
        stakes.open(window(100, 500, 100)).unwrap();
        stakes.close();
        assert!(!stakes.are_visible);
        assert_eq!(stakes.allowed_stake_types, AllowedStakeTypes::default());
        assert!(!stakes.is_allowed(StakeType::Pass));
    }

    #[test]
    fn simple_mode_only_offers_pass_and_all_in() {
        let mut stakes = StakeState::default();
        let mut simple = window(100, 500, 100);
        simple.are_simple = true;
        stakes.open(simple).unwrap();

        assert!(stakes.is_allowed(StakeType::Pass));
        assert!(stakes.is_allowed(StakeType::AllIn));
        assert!(!stakes.is_allowed(StakeType::Sum));
        assert!(!stakes.is_allowed(StakeType::Nominal));
        // Bounds still apply in simple mode.
        assert!(stakes.propose(150).is_err());
    }
}
