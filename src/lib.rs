//! # Janken Tracker
//!
//! Rock-paper-scissors against the computer, with every round appended to a
//! spreadsheet and running statistics derived from the sheet's history.
//!
//! ## Architecture
//!
//! - **models**: Hands, results, game records, statistics
//! - **game**: Round resolution, opponent picking, the game session
//! - **history**: Raw sheet rows to round history
//! - **calculate**: Statistics computation
//! - **sheets**: Spreadsheet access (Google Sheets, in-memory)
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod game;
pub mod history;
pub mod models;
pub mod sheets;

pub use models::*;
