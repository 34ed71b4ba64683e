//! Client-side session state for a live quiz game: a pure fold over server
//! notifications plus an async driver that owns the current snapshot.

/// Driver configuration.
pub mod config;
/// Wire forms of inbound events.
pub mod dto;
/// Decoding and driver errors.
pub mod error;
/// Async driver and ticker.
pub mod services;
/// Session model and fold.
pub mod state;
