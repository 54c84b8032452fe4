//! Derived statistics models.

use serde::{Deserialize, Serialize};

/// Running totals over the round history. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,

    /// Win rate as a percentage (0.0 to 100.0), unrounded
    pub win_rate: f64,
}

impl Statistics {
    /// Win rate rounded to one decimal place, e.g. `"66.7%"`.
    pub fn win_rate_display(&self) -> String {
        format!("{:.1}%", self.win_rate)
    }
}
