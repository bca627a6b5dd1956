//! In-memory table backend.
//!
//! Implements [`TableStore`] over plain vectors so every store and the loader
//! can be exercised without network access. Also handy for local development
//! against fixture data.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

use super::{CellRef, Row, SheetsError, TableHandle, TableStore, client::find_in_column};

/// Table backend holding everything in process memory.
///
/// Tables are addressed by worksheet title; the spreadsheet name is treated
/// as a single namespace, mirroring how the production data lives in one
/// document. Clones share the same tables, so one seeded store can back
/// several components at once. `set_failing` flips the store into a failing
/// state so callers' degrade-to-neutral paths can be tested.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableStore {
    inner: Arc<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    failing: AtomicBool,
}

impl MemoryTableStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table with rows (header first), replacing any existing table.
    #[must_use]
    pub fn with_table(self, title: &str, rows: Vec<Row>) -> Self {
        if let Ok(mut tables) = self.inner.tables.lock() {
            tables.insert(title.to_owned(), rows);
        }
        self
    }

    /// Snapshot of one table's rows, empty when the table is absent.
    #[must_use]
    pub fn rows(&self, title: &str) -> Vec<Row> {
        self.inner
            .tables
            .lock()
            .map(|tables| tables.get(title).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Make every subsequent operation fail with a 503 until reset.
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), SheetsError> {
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(SheetsError::Api {
                status: 503,
                message: "backend unavailable".to_owned(),
            });
        }
        Ok(())
    }

    fn handle(title: &str) -> TableHandle {
        TableHandle {
            spreadsheet_id: "memory".to_owned(),
            sheet_id: 0,
            title: title.to_owned(),
        }
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<Row>>>, SheetsError> {
        self.inner.tables.lock().map_err(|_| SheetsError::Api {
            status: 500,
            message: "table lock poisoned".to_owned(),
        })
    }
}

impl TableStore for MemoryTableStore {
    async fn find_table_by_name(&self, name: &str) -> Result<TableHandle, SheetsError> {
        self.check_available()?;
        let tables = self.locked()?;
        if tables.contains_key(name) {
            Ok(Self::handle(name))
        } else {
            Err(SheetsError::NotFound(format!("spreadsheet not found: {name}")))
        }
    }

    async fn read_all_rows(&self, table: &TableHandle) -> Result<Vec<Row>, SheetsError> {
        self.check_available()?;
        let tables = self.locked()?;
        tables
            .get(&table.title)
            .cloned()
            .ok_or_else(|| SheetsError::NotFound(format!("worksheet not found: {}", table.title)))
    }

    async fn append_row(&self, table: &TableHandle, row: &[String]) -> Result<(), SheetsError> {
        self.check_available()?;
        let mut tables = self.locked()?;
        tables
            .get_mut(&table.title)
            .ok_or_else(|| SheetsError::NotFound(format!("worksheet not found: {}", table.title)))?
            .push(row.to_vec());
        Ok(())
    }

    async fn find_cell_in_column(
        &self,
        table: &TableHandle,
        column: usize,
        value: &str,
    ) -> Result<Option<CellRef>, SheetsError> {
        let rows = self.read_all_rows(table).await?;
        Ok(find_in_column(&rows, column, value))
    }

    async fn delete_row(&self, table: &TableHandle, row_index: usize) -> Result<(), SheetsError> {
        self.check_available()?;
        let mut tables = self.locked()?;
        let rows = tables
            .get_mut(&table.title)
            .ok_or_else(|| SheetsError::NotFound(format!("worksheet not found: {}", table.title)))?;
        if row_index == 0 || row_index > rows.len() {
            return Err(SheetsError::NotFound(format!(
                "row {row_index} out of range in {}",
                table.title
            )));
        }
        rows.remove(row_index - 1);
        Ok(())
    }

    async fn ensure_table(
        &self,
        _spreadsheet: &str,
        title: &str,
        header: &[&str],
    ) -> Result<TableHandle, SheetsError> {
        self.check_available()?;
        let mut tables = self.locked()?;
        tables
            .entry(title.to_owned())
            .or_insert_with(|| vec![header.iter().map(|&h| h.to_owned()).collect()]);
        Ok(Self::handle(title))
    }
}
