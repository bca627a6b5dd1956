//! Catalog query engine.
//!
//! Pure, in-memory filtering/sorting/pagination over a product collection.
//! No I/O happens here: given well-typed products and a spec, `query` is
//! total. Malformed upstream data (unparseable dates, weird prices) was
//! already neutralized by the loader.

use std::collections::HashSet;

use thiserror::Error;

use resale_core::Product;

use crate::dates;

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Errors produced while building a query.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// Search text contained non-ASCII input the engine refuses to match on.
    #[error("search text must be ASCII")]
    InvalidSearchInput,
}

/// Active filter predicates for one query. All predicates are combined with
/// logical AND; every one of them is independently optional.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    /// Case-insensitive substring match against name OR code. Non-ASCII
    /// queries are invalid; the engine treats them as a no-op (see
    /// [`FilterSpec::with_text_search`] for the validating constructor).
    pub text_search: Option<String>,
    /// Keep products whose brand is in the set; empty means no restriction.
    pub brands: HashSet<String>,
    /// Keep products whose category is in the set; empty means no restriction.
    pub categories: HashSet<String>,
    /// Keep products whose size is in the set; empty means no restriction.
    pub sizes: HashSet<String>,
    /// Inclusive [min, max] bound on price.
    pub price_range: Option<(u64, u64)>,
    /// When false, products marked out of stock are dropped.
    pub include_sold_out: bool,
    /// When true, drop products that still carry a pending-arrival marker:
    /// "arrived" means "no longer tracked as incoming", so this excludes
    /// rather than includes.
    pub arrived_only: bool,
    /// When true, keep only products whose code is in `wishlist_membership`.
    pub wishlist_only: bool,
    /// Wishlist membership set supplied by the wishlist store.
    pub wishlist_membership: HashSet<String>,
}

impl FilterSpec {
    /// Set the text-search predicate, validating the input.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidSearchInput`] for non-ASCII text so the
    /// caller can signal invalid input instead of silently matching nothing.
    pub fn with_text_search(mut self, text: &str) -> Result<Self, QueryError> {
        if !text.is_ascii() {
            return Err(QueryError::InvalidSearchInput);
        }
        self.text_search = Some(text.to_owned());
        Ok(self)
    }

    fn matches(&self, product: &Product) -> bool {
        if let Some(text) = self.text_search.as_deref()
            && text.is_ascii()
            && !text.trim().is_empty()
        {
            let needle = text.trim().to_lowercase();
            let name_hit = product.name.to_lowercase().contains(&needle);
            let code_hit = product.code.as_str().to_lowercase().contains(&needle);
            if !name_hit && !code_hit {
                return false;
            }
        }

        if !self.brands.is_empty() && !self.brands.contains(&product.brand) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&product.category) {
            return false;
        }
        if !self.sizes.is_empty() && !self.sizes.contains(&product.size) {
            return false;
        }

        if let Some((min, max)) = self.price_range
            && (product.price < min || product.price > max)
        {
            return false;
        }

        if !self.include_sold_out && product.is_sold_out() {
            return false;
        }

        if self.arrived_only && product.has_arrival_date() {
            return false;
        }

        if self.wishlist_only && !self.wishlist_membership.contains(product.code.as_str()) {
            return false;
        }

        true
    }
}

/// The sort key for one query; exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// By `updated_at` descending; unparseable dates sort oldest.
    #[default]
    Newest,
    /// By price, cheapest first.
    PriceAscending,
    /// By price, most expensive first.
    PriceDescending,
    /// By name, lexicographic.
    NameAscending,
}

impl SortKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAscending => "price_asc",
            Self::PriceDescending => "price_desc",
            Self::NameAscending => "name_asc",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "newest" => Some(Self::Newest),
            "price_asc" => Some(Self::PriceAscending),
            "price_desc" => Some(Self::PriceDescending),
            "name_asc" => Some(Self::NameAscending),
            _ => None,
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone)]
pub struct QueryPage {
    /// Products on the requested page, in sorted order.
    pub items: Vec<Product>,
    /// Matching products across all pages.
    pub total_count: usize,
    /// `max(1, ceil(total_count / page_size))`.
    pub total_pages: usize,
    /// The page actually served (clamped to 1 when out of range).
    pub page: usize,
}

/// Filter, sort, and paginate a product collection.
///
/// Pagination clamps out-of-range requests back to page 1 rather than
/// erroring, which recovers gracefully from filter changes that shrink the
/// result set beneath the previously selected page. Ties under every sort
/// key preserve original collection order (the sorts are stable).
#[must_use]
pub fn query(
    products: &[Product],
    filter: &FilterSpec,
    sort: SortKey,
    page: usize,
    page_size: usize,
) -> QueryPage {
    let page_size = page_size.max(1);

    let mut matched: Vec<Product> = products
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect();

    match sort {
        SortKey::Newest => {
            matched.sort_by_cached_key(|p| std::cmp::Reverse(dates::sort_key(&p.updated_at)));
        }
        SortKey::PriceAscending => matched.sort_by_key(|p| p.price),
        SortKey::PriceDescending => matched.sort_by_key(|p| std::cmp::Reverse(p.price)),
        SortKey::NameAscending => matched.sort_by(|a, b| a.name.cmp(&b.name)),
    }

    let total_count = matched.len();
    let total_pages = total_count.div_ceil(page_size).max(1);

    let page = if page == 0 || page > total_pages { 1 } else { page };

    let start = (page - 1) * page_size;
    let items: Vec<Product> = matched.into_iter().skip(start).take(page_size).collect();

    QueryPage {
        items,
        total_count,
        total_pages,
        page,
    }
}
