//! Product record types.
//!
//! Products are read-only derived data: the loader re-materializes the whole
//! collection on every cache-miss fetch, filling every optional field with an
//! explicit default so nothing downstream needs presence checks.

use serde::{Deserialize, Serialize};

use crate::types::code::ProductCode;

/// Sentinel for an absent brand.
pub const UNKNOWN_BRAND: &str = "Unknown";

/// Sentinel for any other absent string field.
pub const UNSPECIFIED: &str = "-";

/// Values of `arrival_date` that mean "no value".
const EMPTY_MARKERS: [&str; 3] = ["nan", "none", "nat"];

/// One catalog item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique-ish business identifier (first source column when no explicit
    /// code column exists).
    pub code: ProductCode,
    /// Brand label, [`UNKNOWN_BRAND`] when absent.
    pub brand: String,
    /// Display name, [`UNSPECIFIED`] when absent.
    pub name: String,
    /// Fine-grained category (e.g. "Hoodie").
    pub category: String,
    /// Coarse category grouping (e.g. "Tops").
    pub upper_category: String,
    /// Garment size label.
    pub size: String,
    /// Condition grade.
    pub condition: String,
    /// Free-form description text.
    pub description: String,
    /// Sale price, currency-agnostic non-negative integer.
    pub price: u64,
    /// Pre-discount price, when the source row carries one.
    pub original_price: Option<u64>,
    /// Free-form stock text; tested by substring, not equality.
    pub stock_status: String,
    /// Opaque image reference (file id or URL fragment), already
    /// fallback-substituted by the loader.
    pub image_ref: String,
    /// Loosely formatted registration date/time text.
    pub updated_at: String,
    /// Free-form expected-arrival date text; see [`Product::has_arrival_date`].
    pub arrival_date: String,
}

impl Product {
    /// Whether the item is marked sold out.
    ///
    /// Source data is inconsistent ("SOLD", "sold out", "Out of Stock!"), so
    /// this is a substring containment test on the lowercased, trimmed text,
    /// never an equality check.
    #[must_use]
    pub fn is_sold_out(&self) -> bool {
        let normalized = self.stock_status.trim().to_lowercase();
        normalized.contains("out of stock") || normalized.contains("sold")
    }

    /// Whether the item carries a pending-arrival marker.
    ///
    /// Empty strings and the case-insensitive markers `nan`, `none`, and
    /// `nat` all mean "no value".
    #[must_use]
    pub fn has_arrival_date(&self) -> bool {
        let trimmed = self.arrival_date.trim();
        if trimmed.is_empty() {
            return false;
        }
        let lowered = trimmed.to_lowercase();
        !EMPTY_MARKERS.contains(&lowered.as_str())
    }

    /// Whether the item is discounted (original price present and higher).
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.original_price.is_some_and(|orig| orig > self.price)
    }

    /// Discount percentage, `round((1 - price/original) * 100)`.
    ///
    /// `None` unless the item [`is_discounted`](Self::is_discounted).
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn discount_percent(&self) -> Option<u8> {
        let original = self.original_price.filter(|&orig| orig > self.price)?;
        let ratio = self.price as f64 / original as f64;
        Some(((1.0 - ratio) * 100.0).round() as u8)
    }
}

/// The full product record set, re-materialized wholesale on every fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCollection {
    /// Products in source-table order.
    pub items: Vec<Product>,
    /// Name of the source table the collection came from.
    pub source: String,
}

impl ProductCollection {
    /// Create a collection from normalized products.
    #[must_use]
    pub fn new(items: Vec<Product>, source: impl Into<String>) -> Self {
        Self {
            items,
            source: source.into(),
        }
    }

    /// An empty collection with a source label, used when the backend fails.
    #[must_use]
    pub fn empty(source: impl Into<String>) -> Self {
        Self::new(Vec::new(), source)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct brand values, sorted, for filter widgets.
    #[must_use]
    pub fn brands(&self) -> Vec<String> {
        Self::distinct(self.items.iter().map(|p| p.brand.as_str()))
    }

    /// Distinct category values, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        Self::distinct(self.items.iter().map(|p| p.category.as_str()))
    }

    /// Distinct size values, sorted.
    #[must_use]
    pub fn sizes(&self) -> Vec<String> {
        Self::distinct(self.items.iter().map(|p| p.size.as_str()))
    }

    /// Minimum and maximum price across the collection.
    #[must_use]
    pub fn price_bounds(&self) -> Option<(u64, u64)> {
        let mut prices = self.items.iter().map(|p| p.price);
        let first = prices.next()?;
        let (min, max) = prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some((min, max))
    }

    /// Raw arrival-date strings of every item that has one, in table order.
    ///
    /// This is the voyage simulator's input; dedup happens inside the
    /// simulator, not here.
    #[must_use]
    pub fn arrival_dates(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|p| p.has_arrival_date())
            .map(|p| p.arrival_date.trim())
            .collect()
    }

    fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
        let mut out: Vec<String> = values.map(str::to_owned).collect();
        out.sort();
        out.dedup();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(code: &str) -> Product {
        Product {
            code: ProductCode::parse(code).unwrap(),
            brand: UNKNOWN_BRAND.to_owned(),
            name: UNSPECIFIED.to_owned(),
            category: UNSPECIFIED.to_owned(),
            upper_category: UNSPECIFIED.to_owned(),
            size: UNSPECIFIED.to_owned(),
            condition: UNSPECIFIED.to_owned(),
            description: UNSPECIFIED.to_owned(),
            price: 0,
            original_price: None,
            stock_status: String::new(),
            image_ref: String::new(),
            updated_at: String::new(),
            arrival_date: String::new(),
        }
    }

    #[test]
    fn sold_out_is_substring_containment() {
        let mut p = product("a");
        for status in ["SOLD", " sold out ", "Out Of Stock!", "soldout"] {
            p.stock_status = status.to_owned();
            assert!(p.is_sold_out(), "{status:?} should read as sold out");
        }
        for status in ["", "판매중", "available"] {
            p.stock_status = status.to_owned();
            assert!(!p.is_sold_out(), "{status:?} should read as in stock");
        }
    }

    #[test]
    fn arrival_date_markers_mean_no_value() {
        let mut p = product("a");
        for raw in ["", "  ", "nan", "NaN", "None", "NaT"] {
            p.arrival_date = raw.to_owned();
            assert!(!p.has_arrival_date(), "{raw:?} should mean no value");
        }
        p.arrival_date = "2024-04-05".to_owned();
        assert!(p.has_arrival_date());
    }

    #[test]
    fn discount_percent_rounds() {
        let mut p = product("a");
        p.price = 45_000;
        p.original_price = Some(60_000);
        assert_eq!(p.discount_percent(), Some(25));

        // Equal or lower original price is not a discount.
        p.original_price = Some(45_000);
        assert_eq!(p.discount_percent(), None);
        p.original_price = Some(30_000);
        assert_eq!(p.discount_percent(), None);
        p.original_price = None;
        assert_eq!(p.discount_percent(), None);
        assert!(!p.is_discounted());
    }

    #[test]
    fn distinct_values_are_sorted_and_deduped() {
        let mut a = product("a");
        a.brand = "Nike".to_owned();
        let mut b = product("b");
        b.brand = "Adidas".to_owned();
        let mut c = product("c");
        c.brand = "Nike".to_owned();

        let collection = ProductCollection::new(vec![a, b, c], "test");
        assert_eq!(collection.brands(), vec!["Adidas", "Nike"]);
    }

    #[test]
    fn price_bounds_cover_collection() {
        let mut a = product("a");
        a.price = 12_000;
        let mut b = product("b");
        b.price = 3_000;

        let collection = ProductCollection::new(vec![a, b], "test");
        assert_eq!(collection.price_bounds(), Some((3_000, 12_000)));
        assert_eq!(ProductCollection::empty("test").price_bounds(), None);
    }
}
