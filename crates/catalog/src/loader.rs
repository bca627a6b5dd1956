//! Product catalog loading and normalization.
//!
//! Fetches the product table through a [`TableStore`], normalizes the loosely
//! named source columns into the canonical [`Product`] schema, and caches one
//! collection snapshot for a fixed time window. All callers inside the window
//! observe the identical snapshot; the cache is modeled as explicit state
//! with the clock injected, so staleness is testable without sleeping.
//!
//! Backend failures never escape this module: the loader degrades to an
//! empty collection plus a diagnostic message for the caller to display.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use resale_core::{Product, ProductCode, ProductCollection, UNKNOWN_BRAND, UNSPECIFIED};

use crate::categorize;
use crate::config::CatalogConfig;
use crate::sheets::{Row, SheetsError, TableStore};

/// Markers that mean "no image reference" in the source data.
const IMAGE_EMPTY_MARKERS: [&str; 2] = ["nan", "none"];

/// A product load result: the collection, plus a user-facing diagnostic when
/// the backend could not be read.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub collection: ProductCollection,
    pub diagnostic: Option<String>,
}

/// One cached fetch of the whole product table.
#[derive(Debug, Clone)]
struct Snapshot {
    collection: ProductCollection,
    fetched_at: DateTime<Utc>,
}

/// Loads and caches the product collection.
pub struct ProductCatalogLoader<T> {
    store: T,
    spreadsheet: String,
    aliases: HashMap<String, String>,
    fallback_image_id: String,
    ttl: Duration,
    cache: RwLock<Option<Snapshot>>,
}

impl<T: TableStore> ProductCatalogLoader<T> {
    /// Build a loader over a table store using the catalog configuration.
    #[must_use]
    pub fn new(store: T, config: &CatalogConfig) -> Self {
        Self {
            store,
            spreadsheet: config.spreadsheet.clone(),
            aliases: config.column_aliases.clone(),
            fallback_image_id: config.fallback_image_id.clone(),
            ttl: config.cache_ttl,
            cache: RwLock::new(None),
        }
    }

    /// Load the product collection, serving the cached snapshot while fresh.
    ///
    /// `now` is the caller's clock reading; within one TTL window every
    /// caller sees the same snapshot.
    #[instrument(skip(self, now))]
    pub async fn load(&self, now: DateTime<Utc>) -> LoadOutcome {
        if let Some(snapshot) = self.fresh_snapshot(now) {
            debug!(source = %snapshot.collection.source, "serving cached product snapshot");
            return LoadOutcome {
                collection: snapshot.collection,
                diagnostic: None,
            };
        }

        match self.fetch().await {
            Ok(collection) => {
                debug!(products = collection.len(), "fetched product table");
                if let Ok(mut cache) = self.cache.write() {
                    *cache = Some(Snapshot {
                        collection: collection.clone(),
                        fetched_at: now,
                    });
                }
                LoadOutcome {
                    collection,
                    diagnostic: None,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, spreadsheet = %self.spreadsheet, "product table load failed");
                LoadOutcome {
                    collection: ProductCollection::empty(self.spreadsheet.clone()),
                    diagnostic: Some(format!(
                        "failed to load products from '{}': {e}",
                        self.spreadsheet
                    )),
                }
            }
        }
    }

    /// Drop the cached snapshot so the next `load` refetches.
    pub fn reload(&self) {
        if let Ok(mut cache) = self.cache.write() {
            *cache = None;
        }
    }

    fn fresh_snapshot(&self, now: DateTime<Utc>) -> Option<Snapshot> {
        let cache = self.cache.read().ok()?;
        cache
            .as_ref()
            .filter(|snapshot| !is_stale(snapshot.fetched_at, now, self.ttl))
            .cloned()
    }

    async fn fetch(&self) -> Result<ProductCollection, SheetsError> {
        let table = self.store.find_table_by_name(&self.spreadsheet).await?;
        let rows = self.store.read_all_rows(&table).await?;

        let Some((header, data)) = rows.split_first() else {
            return Ok(ProductCollection::empty(table.title));
        };

        let header = normalize_header(header, &self.aliases);
        let products = data
            .iter()
            .filter_map(|row| normalize_row(&header, row, &self.fallback_image_id))
            .collect();

        Ok(ProductCollection::new(products, table.title))
    }
}

/// Whether a snapshot fetched at `fetched_at` has outlived the time window.
fn is_stale(fetched_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
    now.signed_duration_since(fetched_at) > ttl
}

/// Map source header names onto the canonical schema.
///
/// Each header is trimmed, looked up in the alias table, and otherwise
/// lowercased. When no column resolves to `code`, the first column is renamed
/// to `code`. The rename is idempotent: running normalization over an already
/// canonical header changes nothing.
fn normalize_header(header: &Row, aliases: &HashMap<String, String>) -> Vec<String> {
    let mut normalized: Vec<String> = header
        .iter()
        .map(|raw| {
            let trimmed = raw.trim();
            aliases
                .get(trimmed)
                .cloned()
                .unwrap_or_else(|| trimmed.to_lowercase())
        })
        .collect();

    if !normalized.iter().any(|name| name == "code")
        && let Some(first) = normalized.first_mut()
    {
        *first = "code".to_owned();
    }

    normalized
}

/// Build one canonical product from a source row, or skip it.
///
/// Rows that are entirely empty, or whose code cell is blank, are dropped
/// with a warning rather than failing the whole load.
fn normalize_row(header: &[String], row: &Row, fallback_image_id: &str) -> Option<Product> {
    if row.iter().all(|cell| cell.trim().is_empty()) {
        return None;
    }

    let field = |name: &str| -> &str {
        header
            .iter()
            .position(|h| h == name)
            .and_then(|idx| row.get(idx))
            .map_or("", |cell| cell.trim())
    };

    let code = match ProductCode::parse(field("code")) {
        Ok(code) => code,
        Err(e) => {
            warn!(error = %e, "skipping product row without code");
            return None;
        }
    };

    let name = text_or(field("name"), UNSPECIFIED);

    // Blank category columns are filled from the name keywords.
    let classified = categorize::classify(&name);
    let category = text_or(field("category"), classified.category);
    let upper_category = text_or(field("upper_category"), classified.upper_category);

    let image_raw = field("image_ref");
    let image_ref = if is_blank(image_raw) {
        fallback_image_id.to_owned()
    } else {
        image_raw.to_owned()
    };

    Some(Product {
        code,
        brand: text_or(field("brand"), UNKNOWN_BRAND),
        name,
        category,
        upper_category,
        size: text_or(field("size"), UNSPECIFIED),
        condition: text_or(field("condition"), UNSPECIFIED),
        description: text_or(field("description"), UNSPECIFIED),
        price: parse_price(field("price")),
        original_price: parse_optional_price(field("original_price")),
        stock_status: field("stock_status").to_owned(),
        image_ref,
        updated_at: field("updated_at").to_owned(),
        arrival_date: field("arrival_date").to_owned(),
    })
}

/// Coerce free-form price text by deleting every non-digit character.
/// Empty or unparseable remainders default to 0.
fn parse_price(raw: &str) -> u64 {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

fn parse_optional_price(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Blank in the source sense: empty, or a serialized missing-value marker.
fn is_blank(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || IMAGE_EMPTY_MARKERS.contains(&trimmed.to_lowercase().as_str())
}

fn text_or(raw: &str, default: &str) -> String {
    if is_blank(raw) {
        default.to_owned()
    } else {
        raw.to_owned()
    }
}
