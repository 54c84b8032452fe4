//! A1-notation ranges (`Sheet1!A1:E1000`, `sheet1!A:E`, `'My Sheet'!B2`).
//!
//! Only the in-memory sheet needs to understand ranges; the Google client
//! forwards them untouched.

use super::SheetsError;

/// Sheet used when a range has no `Sheet!` prefix.
pub const DEFAULT_SHEET: &str = "Sheet1";

/// Google Sheets' row limit; row numbers past it are rejected.
pub const MAX_ROWS: usize = 10_000_000;

/// A parsed range. Rows and columns are zero-based and inclusive; `None`
/// means the range is open-ended in that direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet: String,
    pub start_col: usize,
    pub start_row: usize,
    pub end_col: Option<usize>,
    pub end_row: Option<usize>,
}

impl A1Range {
    pub fn parse(input: &str) -> Result<Self, SheetsError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SheetsError::InvalidRange("empty range".to_string()));
        }

        let (sheet, cells) = match input.rsplit_once('!') {
            Some((sheet, cells)) => (unquote(sheet), Some(cells)),
            // A bare name is a whole sheet, unless it reads as cells.
            None => match parse_cells(input) {
                Ok(range) => return Ok(range),
                Err(_) => (unquote(input), None),
            },
        };

        if sheet.is_empty() {
            return Err(SheetsError::InvalidRange(input.to_string()));
        }

        let mut range = match cells {
            Some(cells) => parse_cells(cells)
                .map_err(|_| SheetsError::InvalidRange(input.to_string()))?,
            None => A1Range::whole(DEFAULT_SHEET),
        };
        range.sheet = sheet;
        Ok(range)
    }

    /// Every cell of `sheet`.
    pub fn whole(sheet: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            start_col: 0,
            start_row: 0,
            end_col: None,
            end_row: None,
        }
    }

    pub fn contains_row(&self, row: usize) -> bool {
        row >= self.start_row && self.end_row.map_or(true, |end| row <= end)
    }

    pub fn contains_col(&self, col: usize) -> bool {
        col >= self.start_col && self.end_col.map_or(true, |end| col <= end)
    }
}

fn unquote(name: &str) -> String {
    name.strip_prefix('\'')
        .and_then(|n| n.strip_suffix('\''))
        .map(|n| n.replace("''", "'"))
        .unwrap_or_else(|| name.to_string())
}

/// `A1:E10`, `A:E`, `A2:E`, `2:5` or a single cell like `B3`.
fn parse_cells(cells: &str) -> Result<A1Range, SheetsError> {
    let invalid = || SheetsError::InvalidRange(cells.to_string());

    let (start, end) = match cells.split_once(':') {
        Some((start, end)) => (parse_cell(start)?, Some(parse_cell(end)?)),
        None => (parse_cell(cells)?, None),
    };

    let (end_col, end_row) = match end {
        Some((col, row)) => (col, row),
        None => (start.0, start.1),
    };

    // Row-only start (`2:5`) spans every column.
    let start_col = start.0.unwrap_or(0);
    let start_row = start.1.unwrap_or(0);

    if end_col.is_some_and(|end| end < start_col) || end_row.is_some_and(|end| end < start_row) {
        return Err(invalid());
    }

    Ok(A1Range {
        sheet: DEFAULT_SHEET.to_string(),
        start_col,
        start_row,
        end_col,
        end_row,
    })
}

/// Split a cell reference into an optional column and optional row.
fn parse_cell(cell: &str) -> Result<(Option<usize>, Option<usize>), SheetsError> {
    let invalid = || SheetsError::InvalidRange(cell.to_string());

    let split = cell
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(cell.len());
    let (letters, digits) = cell.split_at(split);

    // Sheets stop at column ZZZ.
    if (letters.is_empty() && digits.is_empty()) || letters.len() > 3 {
        return Err(invalid());
    }

    let col = if letters.is_empty() {
        None
    } else {
        let n = letters.bytes().fold(0usize, |acc, b| {
            acc * 26 + (b.to_ascii_uppercase() - b'A') as usize + 1
        });
        Some(n - 1)
    };

    let row = if digits.is_empty() {
        None
    } else {
        let n: usize = digits.parse().map_err(|_| invalid())?;
        if n == 0 || n > MAX_ROWS {
            return Err(invalid());
        }
        Some(n - 1)
    };

    Ok((col, row))
}
