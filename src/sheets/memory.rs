//! In-process sheet.
//!
//! Behaves like the Sheets values API for the operations the game uses:
//! reads drop trailing empty cells and rows, appends land after the last
//! non-empty row of the range, updates write from the top-left cell and
//! refuse to spill outside a bounded range. Sheet names are matched
//! case-insensitively.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::range::{A1Range, MAX_ROWS};
use super::{Rows, SheetStore, SheetsError};

/// Sheet grids keyed by lowercased sheet name.
#[derive(Debug, Default)]
pub struct MemorySheet {
    sheets: RwLock<HashMap<String, Rows>>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `rows` in `sheet`, beginning at A1.
    pub fn with_rows(sheet: &str, rows: Rows) -> Self {
        let mut sheets = HashMap::new();
        sheets.insert(sheet_key(sheet), rows);
        Self {
            sheets: RwLock::new(sheets),
        }
    }
}

fn sheet_key(name: &str) -> String {
    name.to_lowercase()
}

fn write_row(grid: &mut Rows, row: usize, start_col: usize, values: Vec<String>) {
    if grid.len() <= row {
        grid.resize_with(row + 1, Vec::new);
    }
    let cells = &mut grid[row];
    let end = start_col + values.len();
    if cells.len() < end {
        cells.resize(end, String::new());
    }
    for (offset, value) in values.into_iter().enumerate() {
        cells[start_col + offset] = value;
    }
}

#[async_trait]
impl SheetStore for MemorySheet {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, range: &str) -> Result<Rows, SheetsError> {
        let range = A1Range::parse(range)?;
        let sheets = self.sheets.read().await;

        let Some(grid) = sheets.get(&sheet_key(&range.sheet)) else {
            return Ok(Vec::new());
        };

        let mut rows: Rows = grid
            .iter()
            .enumerate()
            .filter(|(i, _)| range.contains_row(*i))
            .map(|(_, row)| {
                let mut cells: Vec<String> = row
                    .iter()
                    .enumerate()
                    .filter(|(c, _)| range.contains_col(*c))
                    .map(|(_, value)| value.clone())
                    .collect();
                while cells.last().is_some_and(|c| c.is_empty()) {
                    cells.pop();
                }
                cells
            })
            .collect();

        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }

        Ok(rows)
    }

    async fn append(&self, range: &str, rows: Rows) -> Result<(), SheetsError> {
        let range = A1Range::parse(range)?;
        let mut sheets = self.sheets.write().await;
        let grid = sheets.entry(sheet_key(&range.sheet)).or_default();

        let last_used = grid
            .iter()
            .enumerate()
            .filter(|(i, row)| {
                range.contains_row(*i)
                    && row
                        .iter()
                        .enumerate()
                        .any(|(c, value)| range.contains_col(c) && !value.is_empty())
            })
            .map(|(i, _)| i)
            .last();

        let first = last_used.map_or(range.start_row, |i| i + 1);
        let count = rows.len();
        if first.checked_add(count).map_or(true, |end| end > MAX_ROWS) {
            return Err(SheetsError::InvalidRange(format!(
                "appending {} rows at row {} passes the {} row limit",
                count,
                first + 1,
                MAX_ROWS
            )));
        }
        for (offset, row) in rows.into_iter().enumerate() {
            write_row(grid, first + offset, range.start_col, row);
        }

        debug!("Appended {} rows to {} at row {}", count, range.sheet, first + 1);
        Ok(())
    }

    async fn update(&self, range_str: &str, rows: Rows) -> Result<(), SheetsError> {
        let range = A1Range::parse(range_str)?;

        let widest = rows.iter().map(Vec::len).max().unwrap_or(0);
        // Exclusive end row and column of the written block.
        let row_end = range.start_row.checked_add(rows.len());
        let col_end = range.start_col.checked_add(widest);
        let too_tall = match row_end {
            Some(row_end) => {
                row_end > MAX_ROWS
                    || range
                        .end_row
                        .is_some_and(|end| !rows.is_empty() && row_end > end + 1)
            }
            None => true,
        };
        let too_wide = match col_end {
            Some(col_end) => range
                .end_col
                .is_some_and(|end| widest > 0 && col_end > end + 1),
            None => true,
        };
        if too_tall || too_wide {
            return Err(SheetsError::InvalidRange(format!(
                "{} is too small for {} rows x {} columns",
                range_str,
                rows.len(),
                widest
            )));
        }

        let mut sheets = self.sheets.write().await;
        let grid = sheets.entry(sheet_key(&range.sheet)).or_default();
        for (offset, row) in rows.into_iter().enumerate() {
            write_row(grid, range.start_row + offset, range.start_col, row);
        }

        Ok(())
    }
}
