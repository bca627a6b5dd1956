//! Integration tests for the resale catalog.
//!
//! Every test runs fully in process against [`MemoryTableStore`], the
//! in-memory `TableStore` implementation, so no credentials or network
//! access are needed:
//!
//! ```bash
//! cargo test -p resale-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `account_lifecycle` - registration, login, sessions, and wishlists
//! - `catalog_pipeline` - sheet rows through the loader, query engine,
//!   and voyage simulation
//! - `loader_cache` - snapshot TTL and failure degradation

use chrono::{DateTime, TimeZone, Utc};
use resale_catalog::config::CatalogConfig;
use resale_catalog::sheets::{MemoryTableStore, Row};
use secrecy::SecretString;

/// Fixed clock reading shared by the scenarios; tests pass explicit offsets
/// from this instant instead of reading the wall clock.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0)
        .single()
        .expect("fixture timestamp is unambiguous")
}

/// Default configuration with a throwaway token, for wiring up stores.
#[must_use]
pub fn test_config() -> CatalogConfig {
    CatalogConfig::with_defaults(SecretString::from("integration-test-token"))
}

fn row(cells: &[&str]) -> Row {
    cells.iter().map(|&c| c.to_owned()).collect()
}

/// A `MemoryTableStore` seeded with the production-shaped product sheet:
/// Korean headers, prices with currency suffixes, a sold-out row, and one
/// row without an image reference.
#[must_use]
pub fn seeded_store() -> MemoryTableStore {
    let config = test_config();
    MemoryTableStore::new().with_table(
        &config.spreadsheet,
        vec![
            row(&[
                "제품번호",
                "브랜드",
                "물품명",
                "카테고리",
                "사이즈",
                "판매가",
                "정가",
                "상태",
                "이미지",
                "등록일",
                "도착예정일",
            ]),
            row(&[
                "T-100",
                "Stone Island",
                "와펜 후드집업",
                "",
                "L",
                "145,000원",
                "320,000",
                "판매중",
                "https://drive.google.com/file/d/abc123XYZ/view",
                "2024-03-20 10:00:00",
                "2024-04-11",
            ]),
            row(&[
                "T-101",
                "Polo Ralph Lauren",
                "옥스포드 셔츠",
                "셔츠",
                "M",
                "38,000원",
                "",
                "sold out",
                "",
                "2024-03-25 09:30:00",
                "",
            ]),
            row(&[
                "T-102",
                "Carhartt",
                "더블니 워크팬츠",
                "팬츠",
                "32",
                "72,000원",
                "",
                "판매중",
                "xyz789",
                "2024-03-28 15:45:00",
                "2024-04-11",
            ]),
            row(&[
                "T-103",
                "",
                "울 머플러",
                "",
                "FREE",
                "19,000원",
                "",
                "판매중",
                "id=qrs456",
                "2024-03-10 08:00:00",
                "2024-05-02",
            ]),
        ],
    )
}
