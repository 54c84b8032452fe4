//! Route handlers, grouped by resource.

pub mod game;
pub mod sheets;
