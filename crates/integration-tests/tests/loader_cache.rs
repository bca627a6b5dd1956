//! Loader snapshot lifetime and failure degradation.

use chrono::Duration;
use resale_catalog::loader::ProductCatalogLoader;
use resale_catalog::sheets::TableStore;
use resale_integration_tests::{fixed_now, seeded_store, test_config};

#[tokio::test]
async fn snapshot_is_reused_within_the_ttl_window() {
    let config = test_config();
    let store = seeded_store();
    let loader = ProductCatalogLoader::new(store.clone(), &config);
    let t0 = fixed_now();

    assert_eq!(loader.load(t0).await.collection.items.len(), 4);

    // A row appended after the snapshot stays invisible until it expires.
    let table = store.find_table_by_name(&config.spreadsheet).await.unwrap();
    let new_row: Vec<String> = ["T-200", "Nike", "에어포스", "신발", "270", "99,000원"]
        .iter()
        .map(|&c| c.to_owned())
        .collect();
    store.append_row(&table, &new_row).await.unwrap();

    let within = t0 + Duration::seconds(599);
    assert_eq!(loader.load(within).await.collection.items.len(), 4);

    let beyond = t0 + Duration::seconds(601);
    assert_eq!(loader.load(beyond).await.collection.items.len(), 5);
}

#[tokio::test]
async fn reload_discards_the_snapshot_immediately() {
    let config = test_config();
    let store = seeded_store();
    let loader = ProductCatalogLoader::new(store.clone(), &config);
    let t0 = fixed_now();

    assert_eq!(loader.load(t0).await.collection.items.len(), 4);

    let table = store.find_table_by_name(&config.spreadsheet).await.unwrap();
    store.delete_row(&table, 2).await.unwrap();

    loader.reload();
    assert_eq!(loader.load(t0).await.collection.items.len(), 3);
}

#[tokio::test]
async fn backend_failure_degrades_to_an_empty_diagnosed_collection() {
    let config = test_config();
    let store = seeded_store();
    let loader = ProductCatalogLoader::new(store.clone(), &config);

    store.set_failing(true);
    let outcome = loader.load(fixed_now()).await;
    assert!(outcome.collection.items.is_empty());
    let diagnostic = outcome.diagnostic.unwrap();
    assert!(diagnostic.contains(&config.spreadsheet));

    // Failures are never cached; recovery is visible on the next load.
    store.set_failing(false);
    let outcome = loader.load(fixed_now()).await;
    assert_eq!(outcome.collection.items.len(), 4);
    assert!(outcome.diagnostic.is_none());
}
