// FavoritesLedger unit tests: idempotence, the counter invariant and the
// reconcile set-replace contract.

use crate::common::mock_services::MemoryFavoritesStore;
use cronox::services::favorites::FavoritesLedger;

fn seeded_ledger() -> (FavoritesLedger<MemoryFavoritesStore>, MemoryFavoritesStore) {
    let store = MemoryFavoritesStore::new();
    store.seed_user(7);
    store.seed_user(8);
    store.seed_product(101, "Glitch Hoodie", 59.9, true);
    store.seed_product(102, "Cronox Tee", 24.5, true);
    store.seed_product(103, "Static Cap", 19.0, true);
    store.seed_product(200, "Retired Jacket", 120.0, false);
    (FavoritesLedger::new(store.clone()), store)
}

#[tokio::test]
async fn test_add_is_idempotent() {
    let (ledger, store) = seeded_ledger();

    let first = ledger.add(7, 101).await.unwrap();
    let second = ledger.add(7, 101).await.unwrap();

    assert_eq!(first, 1);
    assert_eq!(second, 1);
    assert_eq!(store.counter(101), 1);
    assert_eq!(ledger.list(7).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_add_unknown_product_is_not_found() {
    let (ledger, _store) = seeded_ledger();
    let err = ledger.add(7, 9999).await.unwrap_err();
    assert_eq!(err.http_status(), 404);
}

#[tokio::test]
async fn test_add_inactive_product_is_not_found() {
    let (ledger, _store) = seeded_ledger();
    let err = ledger.add(7, 200).await.unwrap_err();
    assert_eq!(err.http_status(), 404);
}

#[tokio::test]
async fn test_fresh_user_scenario() {
    let (ledger, store) = seeded_ledger();

    let count = ledger.add(7, 101).await.unwrap();
    assert_eq!(count, 1);

    let favorites = ledger.list(7).await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, 101);
    assert_eq!(favorites[0].name, "Glitch Hoodie");
    assert_eq!(store.counter(101), 1);
}

#[tokio::test]
async fn test_toggle_off_scenario() {
    let (ledger, store) = seeded_ledger();

    ledger.add(7, 101).await.unwrap();
    let count = ledger.remove(7, 101).await.unwrap();

    assert_eq!(count, 0);
    assert!(ledger.list(7).await.unwrap().is_empty());
    assert_eq!(store.counter(101), 0);
}

#[tokio::test]
async fn test_remove_absent_membership_is_not_an_error() {
    let (ledger, store) = seeded_ledger();
    let count = ledger.remove(7, 101).await.unwrap();
    assert_eq!(count, 0);
    assert_eq!(store.counter(101), 0);
}

#[tokio::test]
async fn test_remove_keeps_other_users_memberships() {
    let (ledger, store) = seeded_ledger();

    ledger.add(7, 101).await.unwrap();
    ledger.add(8, 101).await.unwrap();
    assert_eq!(store.counter(101), 2);

    let count = ledger.remove(7, 101).await.unwrap();
    assert_eq!(count, 1);
    assert!(ledger.check(8, 101).await.unwrap());
}

#[tokio::test]
async fn test_list_orders_most_recent_first() {
    let (ledger, _store) = seeded_ledger();

    ledger.add(7, 101).await.unwrap();
    ledger.add(7, 102).await.unwrap();
    ledger.add(7, 103).await.unwrap();

    let ids: Vec<i64> = ledger.list(7).await.unwrap().iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![103, 102, 101]);
}

#[tokio::test]
async fn test_list_unknown_user_is_not_found() {
    let (ledger, _store) = seeded_ledger();
    let err = ledger.list(42).await.unwrap_err();
    assert_eq!(err.http_status(), 404);
}

#[tokio::test]
async fn test_list_hides_products_deactivated_after_favoriting() {
    let (ledger, store) = seeded_ledger();

    ledger.add(7, 101).await.unwrap();
    ledger.add(7, 102).await.unwrap();
    store.deactivate_product(102);

    let ids: Vec<i64> = ledger.list(7).await.unwrap().iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![101]);
}

#[tokio::test]
async fn test_check_membership() {
    let (ledger, _store) = seeded_ledger();

    assert!(!ledger.check(7, 101).await.unwrap());
    ledger.add(7, 101).await.unwrap();
    assert!(ledger.check(7, 101).await.unwrap());
    ledger.remove(7, 101).await.unwrap();
    assert!(!ledger.check(7, 101).await.unwrap());
}

#[tokio::test]
async fn test_reconcile_is_a_set_replace() {
    let (ledger, _store) = seeded_ledger();

    ledger.add(7, 101).await.unwrap();
    ledger.add(7, 102).await.unwrap();

    let report = ledger.reconcile(7, &[102, 103]).await.unwrap();
    assert_eq!(report.synced_count, 2);
    assert!(report.errors.is_empty());

    let mut ids: Vec<i64> = ledger.list(7).await.unwrap().iter().map(|f| f.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![102, 103]);
}

#[tokio::test]
async fn test_partial_reconcile_reports_per_item_errors() {
    let (ledger, _store) = seeded_ledger();

    let report = ledger.reconcile(7, &[101, 9999]).await.unwrap();

    assert_eq!(report.synced_count, 1);
    assert_eq!(report.total_items, 2);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("9999"));

    let ids: Vec<i64> = ledger.list(7).await.unwrap().iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![101]);
}

#[tokio::test]
async fn test_reconcile_unknown_user_is_not_found() {
    let (ledger, _store) = seeded_ledger();
    let err = ledger.reconcile(42, &[101]).await.unwrap_err();
    assert_eq!(err.http_status(), 404);
}

#[tokio::test]
async fn test_reconcile_collapses_duplicate_ids() {
    let (ledger, store) = seeded_ledger();

    let report = ledger.reconcile(7, &[101, 101, 101]).await.unwrap();

    assert_eq!(report.synced_count, 1);
    assert_eq!(report.total_items, 3);
    assert!(report.errors.is_empty());
    assert_eq!(store.counter(101), 1);
}

#[tokio::test]
async fn test_reconcile_recounts_products_dropped_by_the_replace() {
    let (ledger, store) = seeded_ledger();

    ledger.add(7, 101).await.unwrap();
    ledger.add(8, 101).await.unwrap();
    assert_eq!(store.counter(101), 2);

    // user 7 drops 101 entirely; the counter must fall to user 8's remaining row
    let report = ledger.reconcile(7, &[102]).await.unwrap();
    assert_eq!(report.synced_count, 1);
    assert_eq!(store.counter(101), 1);
    assert_eq!(store.counter(102), 1);
}

#[tokio::test]
async fn test_counter_invariant_after_settled_sequence() {
    let (ledger, store) = seeded_ledger();

    ledger.add(7, 101).await.unwrap();
    ledger.add(8, 101).await.unwrap();
    ledger.add(7, 102).await.unwrap();
    ledger.remove(8, 101).await.unwrap();
    ledger.reconcile(7, &[102, 103]).await.unwrap();
    ledger.add(8, 103).await.unwrap();
    ledger.remove(7, 103).await.unwrap();

    for product_id in [101, 102, 103] {
        let stats = ledger.stats(product_id).await.unwrap();
        assert!(
            stats.is_synced,
            "counter out of sync for product {}: stored {} live {}",
            product_id, stats.favourites_count, stats.actual_count
        );
        assert_eq!(store.counter(product_id), store.live_count(product_id));
    }
}

#[tokio::test]
async fn test_stats_for_unknown_product_is_not_found() {
    let (ledger, _store) = seeded_ledger();
    let err = ledger.stats(9999).await.unwrap_err();
    assert_eq!(err.http_status(), 404);
}

#[tokio::test]
async fn test_connectivity_error_is_surfaced_not_swallowed() {
    let (ledger, store) = seeded_ledger();

    store.simulate_error("database_error");
    let err = ledger.add(7, 101).await.unwrap_err();
    assert!(err.is_connectivity());

    store.reset_error_simulation();
    assert_eq!(ledger.add(7, 101).await.unwrap(), 1);
}
