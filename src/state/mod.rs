//! Session model and the fold that advances it.

pub mod persons;
pub mod snapshot;
pub mod stage;
pub mod stakes;
pub mod state_machine;
pub mod timers;
pub mod validation;

pub use self::snapshot::{Role, SessionSnapshot};
pub use self::state_machine::{Effect, EventKind, FoldError, SessionEvent, Transition, fold};
