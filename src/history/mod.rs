//! Turning raw sheet rows into round history.
//!
//! The sheet may or may not start with a header row and may contain blank or
//! half-filled rows (manual edits, rows added from the table editor). Only
//! rows with all four required columns become records.
//!
//! Header detection is a heuristic: the first row is a header if its first
//! cell is a known label or does not contain a `T` (i.e. is not an ISO-8601
//! timestamp). A single data row whose timestamp lacks a `T` is therefore
//! dropped as a header. This is a known limitation kept for compatibility
//! with existing sheets.

use crate::models::{GameRecord, Recorded};

/// Header written by `init-sheet`.
pub const HEADER_ROW: [&str; 5] = [
    "タイムスタンプ",
    "プレイヤーの手",
    "コンピュータの手",
    "結果",
    "備考",
];

/// First-cell values that mark a header row.
pub const HEADER_LABELS: [&str; 2] = ["タイムスタンプ", "timestamp"];

const REQUIRED_COLUMNS: usize = 4;

/// Whether `row` should be treated as a header rather than a record.
pub fn is_header_row(row: &[String]) -> bool {
    match row.first() {
        Some(cell) => HEADER_LABELS.contains(&cell.as_str()) || !cell.contains('T'),
        None => true,
    }
}

/// Parse one row, or `None` if any required column is missing or empty.
pub fn parse_row(row: &[String]) -> Option<GameRecord> {
    if row.len() < REQUIRED_COLUMNS || row[..REQUIRED_COLUMNS].iter().any(|c| c.is_empty()) {
        return None;
    }

    Some(GameRecord {
        timestamp: row[0].clone(),
        player_hand: Recorded::parse(&row[1]),
        computer_hand: Recorded::parse(&row[2]),
        result: Recorded::parse(&row[3]),
    })
}

/// Convert rows in append order into records, newest first.
pub fn normalize(rows: &[Vec<String>]) -> Vec<GameRecord> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    let data = if is_header_row(first) { &rows[1..] } else { rows };

    let mut records: Vec<GameRecord> = data.iter().filter_map(|row| parse_row(row)).collect();
    records.reverse();
    records
}
