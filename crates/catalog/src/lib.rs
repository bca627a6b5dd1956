//! Resale catalog library.
//!
//! Loads a resale-clothing catalog from a spreadsheet-style remote backend,
//! serves filtered and paginated product queries, and manages user accounts,
//! sessions, and wishlists on top of the same backend. All time-dependent
//! pieces take `now` as a parameter so behavior stays replayable in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod categorize;
pub mod config;
pub mod dates;
pub mod error;
pub mod identity;
pub mod images;
pub mod loader;
pub mod query;
pub mod session;
pub mod sheets;
pub mod voyage;
pub mod wishlist;

pub use config::CatalogConfig;
pub use error::CatalogError;
pub use identity::IdentityStore;
pub use loader::ProductCatalogLoader;
pub use query::{FilterSpec, QueryPage, SortKey};
pub use session::SessionManager;
pub use sheets::{SheetsClient, TableStore};
pub use voyage::VoyageSimulator;
pub use wishlist::WishlistStore;
