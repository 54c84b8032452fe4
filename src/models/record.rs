//! One persisted round.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::{GameResult, Hand, Recorded};

/// A completed round as stored in the sheet, one row per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// ISO-8601 timestamp, e.g. `2024-01-01T00:00:00.000Z`
    pub timestamp: String,
    pub player_hand: Recorded<Hand>,
    pub computer_hand: Recorded<Hand>,
    pub result: Recorded<GameResult>,
}

impl GameRecord {
    /// Create a record for a round that was just played.
    pub fn new(at: DateTime<Utc>, player: Hand, computer: Hand, result: GameResult) -> Self {
        Self {
            timestamp: format_timestamp(at),
            player_hand: player.into(),
            computer_hand: computer.into(),
            result: result.into(),
        }
    }

    /// Row layout used in the sheet. The fifth column is reserved for remarks
    /// and always written empty.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.player_hand.to_string(),
            self.computer_hand.to_string(),
            self.result.to_string(),
            String::new(),
        ]
    }
}

/// Millisecond precision with a `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
