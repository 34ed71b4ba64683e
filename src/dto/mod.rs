//! Wire-level shapes exchanged with the excluded transport layer.

pub mod inbound;
pub mod validation;
