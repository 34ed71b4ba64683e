use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval},
};
use tracing::{debug, info, warn};

use crate::{
    error::ServiceError,
    services::session_service::SessionHandle,
    state::{FoldError, SessionEvent, timers::TimerId},
};

const TENTH: Duration = Duration::from_millis(100);

/// Advance every timer of the session by the wall-clock time that elapsed
/// between wake-ups. Stops once the session ends or its driver goes away.
pub fn spawn_ticker(handle: SessionHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut clock = interval(period);
        clock.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut last = Instant::now();
        let mut carry = Duration::ZERO;

        loop {
            clock.tick().await;
            if handle.snapshot().is_ended {
                info!("session ended; ticker stopped");
                return;
            }

            let now = Instant::now();
            carry += now - last;
            last = now;

            let (delta, rest) = split_tenths(carry);
            carry = rest;
            if delta == 0 {
                continue;
            }

            if !advance_all(&handle, delta).await {
                return;
            }
        }
    })
}

/// Tick every timer by `delta`. Returns `false` once the session can no
/// longer accept ticks.
async fn advance_all(handle: &SessionHandle, delta: u32) -> bool {
    for timer in TimerId::ALL {
        match handle.submit(SessionEvent::TimerTick { timer, delta }).await {
            Ok(_) => {}
            Err(ServiceError::Rejected(FoldError::SessionEnded { .. })) => {
                info!("session ended; ticker stopped");
                return false;
            }
            Err(ServiceError::Closed) => {
                debug!("session driver closed; ticker stopped");
                return false;
            }
            Err(err) => warn!(?timer, error = %err, "timer tick rejected"),
        }
    }
    true
}

/// Whole tenths of a second in `elapsed` and the remainder to carry over.
fn split_tenths(elapsed: Duration) -> (u32, Duration) {
    let tenths = elapsed.as_millis() / TENTH.as_millis();
    let delta = u32::try_from(tenths).unwrap_or(u32::MAX);
    let consumed = TENTH * delta;
    (delta, elapsed.saturating_sub(consumed))
}
