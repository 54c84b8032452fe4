//! Spreadsheet access.
//!
//! The game only talks to the sheet through [`SheetStore`]:
//! - **google**: Google Sheets API v4 with a service account
//! - **memory**: in-process sheet for offline play and tests
//!
//! Range selectors (`sheet1!A1:E1000`) are passed through as given.

pub mod google;
pub mod memory;
pub mod range;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

pub use google::{GoogleSheetsClient, ServiceAccount};
pub use memory::MemorySheet;
pub use range::A1Range;

use crate::history::HEADER_ROW;

/// Rows of cell values, outer index is the row.
pub type Rows = Vec<Vec<String>>;

/// Errors that can occur while talking to a sheet.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sheet unavailable: {0}")]
    Unavailable(String),
}

/// Tabular store holding one round per row.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Read a rectangular region. Empty when the region holds nothing.
    async fn get(&self, range: &str) -> Result<Rows, SheetsError>;

    /// Add rows after the existing content of the region.
    async fn append(&self, range: &str, rows: Rows) -> Result<(), SheetsError>;

    /// Overwrite the cells of the region with `rows`.
    async fn update(&self, range: &str, rows: Rows) -> Result<(), SheetsError>;
}

/// Write the column header into `range`.
pub async fn initialize_sheet(store: &dyn SheetStore, range: &str) -> Result<(), SheetsError> {
    info!("Writing header row to {} ({})", range, store.name());
    let header = HEADER_ROW.iter().map(|c| c.to_string()).collect();
    store.update(range, vec![header]).await
}
