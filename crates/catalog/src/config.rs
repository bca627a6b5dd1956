//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_SHEETS_TOKEN` - OAuth bearer token for the Sheets/Drive APIs
//!
//! ## Optional
//! - `CATALOG_SPREADSHEET` - Spreadsheet document name (default: 상품목록)
//! - `CATALOG_USERS_TABLE` - Users worksheet title (default: 고객정보)
//! - `CATALOG_WISHLIST_TABLE` - Wishlist worksheet title (default: 찜목록)
//! - `CATALOG_FALLBACK_IMAGE_ID` - File id substituted for blank image refs
//! - `CATALOG_CACHE_TTL_SECS` - Product snapshot time-to-live (default: 600)
//! - `CATALOG_TRANSIT_DAYS` - Voyage transit duration (default: 21)
//! - `CATALOG_PAGE_SIZE` - Catalog page size (default: 12)
//! - `CATALOG_SESSION_TTL_SECS` - Session token lifetime (default: 7 days)
//! - `CATALOG_COLUMN_ALIASES` - JSON object of extra source-header aliases,
//!   merged over the built-in table (e.g. `{"품번":"code"}`)

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::voyage::DEFAULT_TRANSIT_DAYS;

/// Default spreadsheet document holding all three tables.
pub const DEFAULT_SPREADSHEET: &str = "상품목록";
/// Default users worksheet title.
pub const DEFAULT_USERS_TABLE: &str = "고객정보";
/// Default wishlist worksheet title.
pub const DEFAULT_WISHLIST_TABLE: &str = "찜목록";
/// Default image file id substituted for blank references.
pub const DEFAULT_FALLBACK_IMAGE_ID: &str = "1Wk4sdliFYg8I8TvyDkUFWgemxXKq9fwB";

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
const DEFAULT_PAGE_SIZE: usize = 12;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Catalog application configuration.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Bearer token for the Sheets/Drive APIs.
    pub sheets_token: SecretString,
    /// Spreadsheet document name (resolved by lookup with fallback).
    pub spreadsheet: String,
    /// Users worksheet title.
    pub users_table: String,
    /// Wishlist worksheet title.
    pub wishlist_table: String,
    /// Image file id substituted when a row's image reference is blank.
    pub fallback_image_id: String,
    /// How long one product snapshot stays fresh.
    pub cache_ttl: Duration,
    /// Route-wide voyage transit duration in days.
    pub transit_days: i64,
    /// Catalog page size.
    pub page_size: usize,
    /// Session token lifetime.
    pub session_ttl: Duration,
    /// Source header -> canonical column name. Persisted configuration, not
    /// code: extend via `CATALOG_COLUMN_ALIASES` without touching the loader.
    pub column_aliases: HashMap<String, String>,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("sheets_token", &"[REDACTED]")
            .field("spreadsheet", &self.spreadsheet)
            .field("users_table", &self.users_table)
            .field("wishlist_table", &self.wishlist_table)
            .field("fallback_image_id", &self.fallback_image_id)
            .field("cache_ttl", &self.cache_ttl)
            .field("transit_days", &self.transit_days)
            .field("page_size", &self.page_size)
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let sheets_token = require_env("CATALOG_SHEETS_TOKEN")?;

        let mut column_aliases = default_column_aliases();
        if let Ok(raw) = std::env::var("CATALOG_COLUMN_ALIASES") {
            let extra: HashMap<String, String> = serde_json::from_str(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("CATALOG_COLUMN_ALIASES".to_owned(), e.to_string())
            })?;
            column_aliases.extend(extra);
        }

        let transit_days = parse_env("CATALOG_TRANSIT_DAYS", DEFAULT_TRANSIT_DAYS)?;
        if transit_days <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_TRANSIT_DAYS".to_owned(),
                "must be a positive number of days".to_owned(),
            ));
        }

        Ok(Self {
            sheets_token: SecretString::from(sheets_token),
            spreadsheet: env_or("CATALOG_SPREADSHEET", DEFAULT_SPREADSHEET),
            users_table: env_or("CATALOG_USERS_TABLE", DEFAULT_USERS_TABLE),
            wishlist_table: env_or("CATALOG_WISHLIST_TABLE", DEFAULT_WISHLIST_TABLE),
            fallback_image_id: env_or("CATALOG_FALLBACK_IMAGE_ID", DEFAULT_FALLBACK_IMAGE_ID),
            cache_ttl: Duration::from_secs(parse_env(
                "CATALOG_CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL.as_secs(),
            )?),
            transit_days,
            page_size: parse_env("CATALOG_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            session_ttl: Duration::from_secs(parse_env(
                "CATALOG_SESSION_TTL_SECS",
                DEFAULT_SESSION_TTL.as_secs(),
            )?),
            column_aliases,
        })
    }

    /// Configuration with every default and a given token; the usual entry
    /// point for tests and local development against the memory store.
    #[must_use]
    pub fn with_defaults(sheets_token: SecretString) -> Self {
        Self {
            sheets_token,
            spreadsheet: DEFAULT_SPREADSHEET.to_owned(),
            users_table: DEFAULT_USERS_TABLE.to_owned(),
            wishlist_table: DEFAULT_WISHLIST_TABLE.to_owned(),
            fallback_image_id: DEFAULT_FALLBACK_IMAGE_ID.to_owned(),
            cache_ttl: DEFAULT_CACHE_TTL,
            transit_days: DEFAULT_TRANSIT_DAYS,
            page_size: DEFAULT_PAGE_SIZE,
            session_ttl: DEFAULT_SESSION_TTL,
            column_aliases: default_column_aliases(),
        }
    }
}

/// Built-in source-header alias table: the Korean headers of the production
/// sheet plus the abbreviations that have shown up historically.
#[must_use]
pub fn default_column_aliases() -> HashMap<String, String> {
    [
        ("제품번호", "code"),
        ("t_id", "code"),
        ("cc", "code"),
        ("브랜드", "brand"),
        ("물품명", "name"),
        ("카테고리", "category"),
        ("상위카테고리", "upper_category"),
        ("사이즈", "size"),
        ("컨디션", "condition"),
        ("판매가", "price"),
        ("정가", "original_price"),
        ("제품설명", "description"),
        ("이미지", "image_ref"),
        ("image_file_id", "image_ref"),
        ("상태", "stock_status"),
        ("stock", "stock_status"),
        ("status", "stock_status"),
        ("등록일", "updated_at"),
        ("도착예정일", "arrival_date"),
        ("eta", "arrival_date"),
        ("ETA", "arrival_date"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_owned(), to.to_owned()))
    .collect()
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(name.to_owned(), e.to_string())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = CatalogConfig::with_defaults(SecretString::from("test-token"));
        assert_eq!(config.spreadsheet, "상품목록");
        assert_eq!(config.cache_ttl, Duration::from_secs(600));
        assert_eq!(config.transit_days, 21);
        assert_eq!(config.page_size, 12);
    }

    #[test]
    fn alias_table_maps_korean_headers() {
        let aliases = default_column_aliases();
        assert_eq!(aliases.get("제품번호").map(String::as_str), Some("code"));
        assert_eq!(aliases.get("판매가").map(String::as_str), Some("price"));
        assert_eq!(aliases.get("eta").map(String::as_str), Some("arrival_date"));
        assert!(!aliases.contains_key("unmapped"));
    }

    #[test]
    fn debug_redacts_token() {
        let config = CatalogConfig::with_defaults(SecretString::from("super-secret"));
        let rendered = format!("{config:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("super-secret"));
    }
}
