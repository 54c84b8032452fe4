//! Statistics calculation.
//!
//! Derives the running totals shown next to the game from round history.
//! Results are counted as recorded; they are never re-derived from hands.

use crate::models::{GameRecord, GameResult, Statistics};

/// Calculate win rate as a percentage of all games.
pub fn calculate_win_rate(wins: u32, total_games: u32) -> f64 {
    if total_games == 0 {
        0.0
    } else {
        wins as f64 / total_games as f64 * 100.0
    }
}

/// Aggregate round history into statistics. Order does not matter.
pub fn aggregate(records: &[GameRecord]) -> Statistics {
    let mut stats = Statistics {
        total_games: records.len() as u32,
        ..Statistics::default()
    };

    for record in records {
        match record.result.known() {
            Some(GameResult::Win) => stats.wins += 1,
            Some(GameResult::Lose) => stats.losses += 1,
            Some(GameResult::Draw) => stats.draws += 1,
            None => {}
        }
    }

    stats.win_rate = calculate_win_rate(stats.wins, stats.total_games);
    stats
}
