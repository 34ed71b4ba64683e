/// Task that owns the session snapshot and folds queued events.
pub mod session_service;
/// Periodic timer ticks derived from wall-clock time.
pub mod ticker;
