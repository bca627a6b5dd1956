//! Wishlist store: per-user product membership over the remote table.
//!
//! Each row is one (user, product) membership fact. Toggling scans the table
//! and deletes the matching row or appends a new one, so at most one live
//! entry exists per pair. The scan runs over a single full read; at this
//! table's scale that is the intended design, not an oversight.
//!
//! The two read queries tolerate backend failures by returning neutral
//! results (empty set / empty map) so a flaky backend can never take the
//! catalog page down with it.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{instrument, warn};

use resale_core::{ProductCode, UserId, WishlistEntry};

use crate::sheets::{Row, SheetsError, TableHandle, TableStore};

/// Header of the wishlist worksheet, in column order.
pub const WISHLIST_HEADER: [&str; 3] = ["user_id", "product_code", "created_at"];

const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The pair was absent; an entry was inserted.
    Added,
    /// The pair existed; its entry was deleted.
    Removed,
}

/// Manages wishlist entries over a table store.
pub struct WishlistStore<T> {
    store: T,
    spreadsheet: String,
    table: String,
}

impl<T: TableStore> WishlistStore<T> {
    /// Create a wishlist store over the given backend and worksheet names.
    #[must_use]
    pub fn new(store: T, spreadsheet: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            store,
            spreadsheet: spreadsheet.into(),
            table: table.into(),
        }
    }

    /// Toggle membership for one (user, product) pair.
    ///
    /// Removal deletes the first matching row; insertion appends a row with
    /// a server-assigned timestamp. Toggling twice returns the table to its
    /// original state.
    ///
    /// # Errors
    ///
    /// Returns the backend error; unlike the read queries, a failed toggle
    /// must be visible to the user who pressed the button.
    #[instrument(skip(self, now), fields(user_id = %user_id, code = %product_code))]
    pub async fn toggle(
        &self,
        user_id: &UserId,
        product_code: &ProductCode,
        now: DateTime<Utc>,
    ) -> Result<ToggleOutcome, SheetsError> {
        let table = self.table().await?;
        let rows = self.store.read_all_rows(&table).await?;

        let existing = rows
            .iter()
            .enumerate()
            .skip(1) // header
            .find(|(_, row)| row_matches(row, user_id, product_code));

        if let Some((idx, _)) = existing {
            self.store.delete_row(&table, idx + 1).await?;
            return Ok(ToggleOutcome::Removed);
        }

        let row: Row = vec![
            user_id.as_str().to_owned(),
            product_code.as_str().to_owned(),
            now.format(CREATED_AT_FORMAT).to_string(),
        ];
        self.store.append_row(&table, &row).await?;
        Ok(ToggleOutcome::Added)
    }

    /// Set of product codes the user has liked.
    ///
    /// Backend failures degrade to an empty set.
    pub async fn user_likes(&self, user_id: &UserId) -> HashSet<String> {
        match self.entries().await {
            Ok(entries) => entries
                .into_iter()
                .filter(|entry| entry.user_id == *user_id)
                .map(|entry| entry.product_code.into_inner())
                .collect(),
            Err(e) => {
                warn!(error = %e, "wishlist read failed, serving empty like set");
                HashSet::new()
            }
        }
    }

    /// Like counts per product code across all users.
    ///
    /// Backend failures degrade to an empty map.
    pub async fn all_like_counts(&self) -> HashMap<String, usize> {
        match self.entries().await {
            Ok(entries) => {
                let mut counts = HashMap::new();
                for entry in entries {
                    *counts.entry(entry.product_code.into_inner()).or_insert(0) += 1;
                }
                counts
            }
            Err(e) => {
                warn!(error = %e, "wishlist read failed, serving empty counts");
                HashMap::new()
            }
        }
    }

    /// All live entries, in table order. Malformed rows are skipped with a
    /// warning rather than failing the read.
    ///
    /// # Errors
    ///
    /// Returns the backend error from the underlying read.
    pub async fn entries(&self) -> Result<Vec<WishlistEntry>, SheetsError> {
        let rows = self.entry_rows().await?;
        Ok(rows.iter().filter_map(entry_from_row).collect())
    }

    async fn table(&self) -> Result<TableHandle, SheetsError> {
        self.store
            .ensure_table(&self.spreadsheet, &self.table, &WISHLIST_HEADER)
            .await
    }

    /// All entry rows, header stripped.
    async fn entry_rows(&self) -> Result<Vec<Row>, SheetsError> {
        let table = self.table().await?;
        let mut rows = self.store.read_all_rows(&table).await?;
        if !rows.is_empty() {
            rows.remove(0);
        }
        Ok(rows)
    }
}

/// Materialize one entry row; malformed rows yield `None` with a warning.
fn entry_from_row(row: &Row) -> Option<WishlistEntry> {
    let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("").trim();

    let user_id = UserId::parse(cell(0))
        .inspect_err(|e| warn!(error = %e, "skipping malformed wishlist row"))
        .ok()?;
    let product_code = ProductCode::parse(cell(1))
        .inspect_err(|e| warn!(error = %e, "skipping malformed wishlist row"))
        .ok()?;
    let created_at = chrono::NaiveDateTime::parse_from_str(cell(2), CREATED_AT_FORMAT)
        .map_or(DateTime::<Utc>::MIN_UTC, |dt| dt.and_utc());

    Some(WishlistEntry {
        user_id,
        product_code,
        created_at,
    })
}

/// Pair match: string equality on both columns, codes compared in string form.
fn row_matches(row: &Row, user_id: &UserId, product_code: &ProductCode) -> bool {
    row.len() >= 2
        && row.first().map(String::as_str) == Some(user_id.as_str())
        && row.get(1).map(String::as_str) == Some(product_code.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::MemoryTableStore;

    fn store() -> WishlistStore<MemoryTableStore> {
        WishlistStore::new(MemoryTableStore::new(), "상품목록", "찜목록")
    }

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    fn code(c: &str) -> ProductCode {
        ProductCode::parse(c).unwrap()
    }

    #[tokio::test]
    async fn toggle_twice_is_an_involution() {
        let wishlist = store();
        let alice = user("alice");
        let item = code("T-001");

        let before = wishlist.store.rows("찜목록");
        assert_eq!(
            wishlist.toggle(&alice, &item, Utc::now()).await.unwrap(),
            ToggleOutcome::Added
        );
        assert_eq!(
            wishlist.toggle(&alice, &item, Utc::now()).await.unwrap(),
            ToggleOutcome::Removed
        );
        // Back to the original state (header only).
        let after = wishlist.store.rows("찜목록");
        assert_eq!(after.len(), 1);
        assert!(before.is_empty() || before == after);
    }

    #[tokio::test]
    async fn at_most_one_entry_per_pair() {
        let wishlist = store();
        let alice = user("alice");
        let item = code("T-001");

        wishlist.toggle(&alice, &item, Utc::now()).await.unwrap();
        wishlist.toggle(&alice, &item, Utc::now()).await.unwrap();
        wishlist.toggle(&alice, &item, Utc::now()).await.unwrap();

        let rows = wishlist.store.rows("찜목록");
        let live = rows
            .iter()
            .skip(1)
            .filter(|r| r[0] == "alice" && r[1] == "T-001")
            .count();
        assert_eq!(live, 1);
    }

    #[tokio::test]
    async fn entries_are_typed_and_timestamped() {
        use chrono::TimeZone;

        let wishlist = store();
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 9, 30, 0).unwrap();
        wishlist.toggle(&user("alice"), &code("T-9"), now).await.unwrap();

        let entries = wishlist.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id.as_str(), "alice");
        assert_eq!(entries[0].product_code.as_str(), "T-9");
        assert_eq!(entries[0].created_at, now);
    }

    #[tokio::test]
    async fn aggregate_counts_match_per_user_views() {
        let wishlist = store();
        let now = Utc::now();

        for (who, what) in [
            ("alice", "T-1"),
            ("alice", "T-2"),
            ("bob", "T-1"),
            ("carol", "T-1"),
        ] {
            wishlist.toggle(&user(who), &code(what), now).await.unwrap();
        }

        let counts = wishlist.all_like_counts().await;
        assert_eq!(counts.get("T-1"), Some(&3));
        assert_eq!(counts.get("T-2"), Some(&1));

        // Consistency: aggregate count equals the number of users whose like
        // set contains the code.
        let mut holders = 0;
        for who in ["alice", "bob", "carol"] {
            if wishlist.user_likes(&user(who)).await.contains("T-1") {
                holders += 1;
            }
        }
        assert_eq!(counts.get("T-1"), Some(&holders));
    }

    #[tokio::test]
    async fn reads_degrade_to_neutral_on_backend_failure() {
        let wishlist = store();
        wishlist
            .toggle(&user("alice"), &code("T-1"), Utc::now())
            .await
            .unwrap();

        wishlist.store.set_failing(true);
        assert!(wishlist.user_likes(&user("alice")).await.is_empty());
        assert!(wishlist.all_like_counts().await.is_empty());

        // Toggle, by contrast, surfaces the failure.
        assert!(
            wishlist
                .toggle(&user("alice"), &code("T-1"), Utc::now())
                .await
                .is_err()
        );
    }
}
