//! Core data models for the janken tracker.

mod hand;
mod record;
mod stats;

pub use hand::*;
pub use record::*;
pub use stats::*;
