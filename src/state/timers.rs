//! Countdown timers driven by externally supplied ticks.
//!
//! Values are expressed in tenths of a second. Each timer has two pause
//! sources; it only advances while both are released.

use serde::{Deserialize, Serialize};

/// Identifies one of the three session timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerId {
    /// Whole-round countdown.
    Round,
    /// Window during which players may press to answer.
    Press,
    /// Time left for the current decision (choice, answer, stake).
    Decision,
}

impl TimerId {
    /// Every timer, in display order.
    pub const ALL: [TimerId; 3] = [TimerId::Round, TimerId::Press, TimerId::Decision];

    fn slot(self) -> usize {
        match self {
            TimerId::Round => 0,
            TimerId::Press => 1,
            TimerId::Decision => 2,
        }
    }
}

/// Who requested a pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseSource {
    /// The game flow itself (server or session logic).
    System,
    /// A person pressed the pause button.
    User,
}

/// A single countdown timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    /// Elapsed units since the last start.
    pub value: u32,
    /// Cap for `value`; `0` means unbounded.
    pub maximum: u32,
    /// Paused by the game flow.
    pub is_paused_by_system: bool,
    /// Paused by a person.
    pub is_paused_by_user: bool,
}

impl Default for Timer {
    fn default() -> Self {
        Self {
            value: 0,
            maximum: 0,
            is_paused_by_system: true,
            is_paused_by_user: false,
        }
    }
}

impl Timer {
    /// Whether ticks currently advance the timer.
    pub fn is_running(&self) -> bool {
        !self.is_paused_by_system && !self.is_paused_by_user
    }

    /// Whether the timer sits at its (non-zero) cap.
    pub fn is_elapsed(&self) -> bool {
        self.maximum > 0 && self.value >= self.maximum
    }

    /// Re-arm the timer: value back to zero, both pause sources engaged.
    pub fn start(&mut self, maximum: u32) {
        self.value = 0;
        self.maximum = maximum;
        self.is_paused_by_system = true;
        self.is_paused_by_user = true;
    }

    /// Whether the flag for `source` is engaged.
    pub fn is_paused_by(&self, source: PauseSource) -> bool {
        match source {
            PauseSource::System => self.is_paused_by_system,
            PauseSource::User => self.is_paused_by_user,
        }
    }

    /// Engage the pause flag for `source`.
    pub fn pause(&mut self, source: PauseSource) {
        *self.flag_mut(source) = true;
    }

    /// Release the pause flag for `source`.
    pub fn resume(&mut self, source: PauseSource) {
        *self.flag_mut(source) = false;
    }

    /// Advance by `delta` if running.
    ///
    /// Returns `true` only on the tick that first reaches the cap.
    pub fn tick(&mut self, delta: u32) -> bool {
        if !self.is_running() {
            return false;
        }

        let was_elapsed = self.is_elapsed();
        let advanced = self.value.saturating_add(delta);
        self.value = if self.maximum > 0 {
            advanced.min(self.maximum)
        } else {
            advanced
        };

        !was_elapsed && self.is_elapsed()
    }

    fn flag_mut(&mut self, source: PauseSource) -> &mut bool {
        match source {
            PauseSource::System => &mut self.is_paused_by_system,
            PauseSource::User => &mut self.is_paused_by_user,
        }
    }
}

/// The three session timers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Timers {
    /// Round timer.
    pub round: Timer,
    /// Press-to-answer timer.
    pub press: Timer,
    /// Decision timer.
    pub decision: Timer,
    /// Timers whose flag was engaged by the last [`Timers::pause_all`].
    #[serde(skip)]
    held: [bool; 3],
}

impl Timers {
    /// Borrow a timer by id.
    pub fn get(&self, id: TimerId) -> &Timer {
        match id {
            TimerId::Round => &self.round,
            TimerId::Press => &self.press,
            TimerId::Decision => &self.decision,
        }
    }

    /// Mutably borrow a timer by id.
    pub fn get_mut(&mut self, id: TimerId) -> &mut Timer {
        match id {
            TimerId::Round => &mut self.round,
            TimerId::Press => &mut self.press,
            TimerId::Decision => &mut self.decision,
        }
    }

    /// Apply `pause(source)` to every timer, remembering which ones had the
    /// flag released beforehand.
    pub fn pause_all(&mut self, source: PauseSource) {
        for id in TimerId::ALL {
            let timer = self.get_mut(id);
            let engaged = !timer.is_paused_by(source);
            timer.pause(source);
            self.held[id.slot()] = engaged;
        }
    }

    /// Undo the last [`Timers::pause_all`]: release `source` only on the
    /// timers that call engaged. Idle timers stay paused.
    pub fn resume_all(&mut self, source: PauseSource) {
        for id in TimerId::ALL {
            if std::mem::take(&mut self.held[id.slot()]) {
                self.get_mut(id).resume(source);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(maximum: u32) -> Timer {
        let mut timer = Timer::default();
        timer.start(maximum);
        timer.resume(PauseSource::System);
        timer.resume(PauseSource::User);
        timer
    }

    #[test]
    fn start_arms_the_timer_paused() {
        let mut timer = Timer::default();
        timer.value = 7;
        timer.start(10);

        assert_eq!(timer.value, 0);
        assert_eq!(timer.maximum, 10);
        assert!(timer.is_paused_by_system);
        assert!(timer.is_paused_by_user);
        assert!(!timer.tick(5));
        assert_eq!(timer.value, 0);
    }

    #[test]
    fn system_pause_freezes_value() {
        let mut timer = running(10);
        timer.tick(4);
        timer.pause(PauseSource::System);
        timer.tick(100);
        assert_eq!(timer.value, 4);
    }

    #[test]
    fn both_sources_must_be_released() {
        let mut timer = running(0);
        timer.pause(PauseSource::System);
        timer.pause(PauseSource::User);

        timer.resume(PauseSource::System);
        timer.tick(3);
        assert_eq!(timer.value, 0);

        timer.resume(PauseSource::User);
        timer.tick(3);
        assert_eq!(timer.value, 3);
    }

    #[test]
    fn elapsed_fires_once_per_cycle() {
        let mut timer = running(10);
        assert!(!timer.tick(6));
        assert!(timer.tick(6));
        assert_eq!(timer.value, 10);
        assert!(!timer.tick(1));
        assert!(!timer.tick(50));
        assert_eq!(timer.value, 10);

        timer.start(5);
        timer.resume(PauseSource::System);
        timer.resume(PauseSource::User);
        assert!(timer.tick(5));
    }

    #[test]
    fn unbounded_timer_never_elapses() {
        let mut timer = running(0);
        assert!(!timer.tick(u32::MAX));
        assert!(!timer.tick(10));
        assert_eq!(timer.value, u32::MAX);
    }

    #[test]
    fn value_stays_within_bounds_for_mixed_sequences() {
        let mut timer = Timer::default();
        let sources = [PauseSource::System, PauseSource::User];
        for step in 0u32..200 {
            match step % 7 {
                0 => timer.start(step % 13),
                1 | 4 => timer.resume(sources[(step % 2) as usize]),
                2 => timer.pause(sources[(step % 2) as usize]),
                _ => {
                    let before = timer.value;
                    let was_running = timer.is_running();
                    timer.tick(step % 5);
                    assert!(timer.value >= before);
                    if !was_running {
                        assert_eq!(timer.value, before);
                    }
                }
            }
            if timer.maximum > 0 {
                assert!(timer.value <= timer.maximum);
            }
        }
    }

    #[test]
    fn aggregate_addresses_each_timer_independently() {
        let mut timers = Timers::default();
        let press = timers.get_mut(TimerId::Press);
        press.start(30);
        press.resume(PauseSource::System);
        press.resume(PauseSource::User);

        timers.get_mut(TimerId::Press).tick(12);
        assert_eq!(timers.press.value, 12);
        assert_eq!(timers.round.value, 0);

        timers.pause_all(PauseSource::User);
        assert!(TimerId::ALL.iter().all(|id| !timers.get(*id).is_running()));
    }

    #[test]
    fn resume_all_only_releases_what_pause_all_engaged() {
        let mut timers = Timers::default();
        let round = timers.get_mut(TimerId::Round);
        round.start(100);
        round.resume(PauseSource::System);
        round.resume(PauseSource::User);

        timers.pause_all(PauseSource::System);
        assert!(!timers.round.is_running());

        timers.resume_all(PauseSource::System);
        assert!(timers.round.is_running());
        assert!(timers.press.is_paused_by_system);
        assert!(timers.decision.is_paused_by_system);

        // Nothing is held any more.
        timers.get_mut(TimerId::Round).pause(PauseSource::System);
        timers.resume_all(PauseSource::System);
        assert!(timers.round.is_paused_by_system);
    }
}
