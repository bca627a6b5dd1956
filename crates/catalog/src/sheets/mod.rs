//! Remote table backend boundary.
//!
//! The catalog treats a spreadsheet-like backend as both its catalog source
//! and a lightweight database. The [`TableStore`] trait is the whole contract
//! the rest of the crate consumes: named-table lookup, ordered row reads,
//! appends, single-cell column search, row deletion, and create-if-absent.
//!
//! Two implementations ship here:
//! - [`SheetsClient`] - Google Sheets / Drive REST (production)
//! - [`MemoryTableStore`] - in-memory tables for tests and local development
//!
//! Every operation can fail with connectivity or auth errors; callers treat
//! those as retryable and degrade to empty results rather than terminating.

mod client;
mod mem;

pub use client::SheetsClient;
pub use mem::MemoryTableStore;

use thiserror::Error;

/// One spreadsheet row: ordered cell values, columns in header order.
pub type Row = Vec<String>;

/// Handle to one named table (a worksheet inside a spreadsheet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHandle {
    /// Backend id of the containing spreadsheet document.
    pub spreadsheet_id: String,
    /// Backend id of the worksheet inside the document.
    pub sheet_id: i64,
    /// Worksheet title, used in range addressing.
    pub title: String,
}

/// Location of one cell, 1-based, header row included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    /// 1-based row index (row 1 is the header).
    pub row: usize,
    /// 1-based column index.
    pub col: usize,
}

/// Errors that can occur when talking to the table backend.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// HTTP request failed (connectivity, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Truncated response body or status text.
        message: String,
    },

    /// Requested spreadsheet, worksheet, or row is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SheetsError {
    /// Whether a caller may reasonably retry the operation.
    ///
    /// `NotFound` is a stable answer; everything else is transient from the
    /// core's point of view.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }
}

/// Contract over the remote tabular backend.
///
/// Row and column indices are 1-based and include the header row, matching
/// the backend's own addressing. Implementations must keep row order stable
/// between `read_all_rows` and `delete_row` for the delete-by-index flow the
/// wishlist store relies on.
#[allow(async_fn_in_trait)]
pub trait TableStore: Send + Sync {
    /// Look up a worksheet by the name of the spreadsheet that holds it.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::NotFound`] when no such spreadsheet is visible.
    async fn find_table_by_name(&self, name: &str) -> Result<TableHandle, SheetsError>;

    /// Read every row of the table in order, header row first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or answers badly.
    async fn read_all_rows(&self, table: &TableHandle) -> Result<Vec<Row>, SheetsError>;

    /// Append one row after the last non-empty row.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or answers badly.
    async fn append_row(&self, table: &TableHandle, row: &[String]) -> Result<(), SheetsError>;

    /// Find the first cell in a 1-based column whose value equals `value`.
    ///
    /// The scan includes the header row, as the backend's own find does.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or answers badly.
    async fn find_cell_in_column(
        &self,
        table: &TableHandle,
        column: usize,
        value: &str,
    ) -> Result<Option<CellRef>, SheetsError>;

    /// Delete one row by 1-based index (header row is row 1).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or the row is gone.
    async fn delete_row(&self, table: &TableHandle, row_index: usize) -> Result<(), SheetsError>;

    /// Open a worksheet by title inside the named spreadsheet, creating it
    /// with the given header row when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the spreadsheet itself cannot be found or the
    /// worksheet cannot be created.
    async fn ensure_table(
        &self,
        spreadsheet: &str,
        title: &str,
        header: &[&str],
    ) -> Result<TableHandle, SheetsError>;
}
