// SyncSession unit tests: the union merge, the at-most-once guard, the
// pending queue, optimistic revert and the lossy logout clear.

use crate::common::mock_services::MemoryFavoritesStore;
use async_trait::async_trait;
use cronox::services::favorites::FavoritesLedger;
use cronox::services::sync::{FavoritesApi, MemoryStorage, MergeOutcome, SyncPhase, SyncSession};
use cronox::types::{FavoriteProduct, LocalFavoriteEntry, SyncReport};
use cronox::utils::StorefrontResult;
use parking_lot::Mutex;
use std::sync::Arc;

/// Delegating wrapper that counts reconcile calls.
struct CountingApi {
    inner: FavoritesLedger<MemoryFavoritesStore>,
    reconcile_calls: Arc<Mutex<u32>>,
}

#[async_trait(?Send)]
impl FavoritesApi for CountingApi {
    async fn list(&self, user_id: i64) -> StorefrontResult<Vec<FavoriteProduct>> {
        self.inner.list(user_id).await
    }

    async fn add(&self, user_id: i64, product_id: i64) -> StorefrontResult<i64> {
        self.inner.add(user_id, product_id).await
    }

    async fn remove(&self, user_id: i64, product_id: i64) -> StorefrontResult<i64> {
        self.inner.remove(user_id, product_id).await
    }

    async fn reconcile(&self, user_id: i64, desired: &[i64]) -> StorefrontResult<SyncReport> {
        *self.reconcile_calls.lock() += 1;
        self.inner.reconcile(user_id, desired).await
    }
}

fn seeded_store() -> MemoryFavoritesStore {
    let store = MemoryFavoritesStore::new();
    store.seed_user(7);
    store.seed_user(9);
    store.seed_product(101, "Glitch Hoodie", 59.9, true);
    store.seed_product(102, "Cronox Tee", 24.5, true);
    store.seed_product(103, "Static Cap", 19.0, true);
    store.seed_product(201, "Noise Scarf", 35.0, true);
    store.seed_product(202, "Pixel Socks", 9.9, true);
    store
}

fn session_over(
    store: &MemoryFavoritesStore,
) -> SyncSession<FavoritesLedger<MemoryFavoritesStore>, MemoryStorage> {
    SyncSession::new(FavoritesLedger::new(store.clone()), MemoryStorage::new())
}

fn entry(id: &str, name: &str) -> LocalFavoriteEntry {
    LocalFavoriteEntry {
        id: id.to_string(),
        name: name.to_string(),
        price: "€10,00".to_string(),
        image: None,
        added_at: None,
    }
}

#[tokio::test]
async fn test_union_merge_combines_local_and_ledger() {
    let store = seeded_store();
    let ledger = FavoritesLedger::new(store.clone());
    ledger.add(7, 102).await.unwrap();
    ledger.add(7, 103).await.unwrap();

    let mut session = session_over(&store);
    session.toggle(entry("101", "Glitch Hoodie")).await.unwrap();
    session.toggle(entry("102", "Cronox Tee")).await.unwrap();

    let outcome = session.handle_login(7).await.unwrap();
    assert!(matches!(outcome, MergeOutcome::Merged(_)));
    assert_eq!(session.phase(), SyncPhase::Synced);

    let mut ids: Vec<i64> = ledger.list(7).await.unwrap().iter().map(|f| f.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![101, 102, 103]);

    // local entries won for ids present on both sides, ledger-only appended
    assert_eq!(session.cache().len(), 3);
    assert!(session.cache().contains("103"));
}

#[tokio::test]
async fn test_merge_runs_at_most_once_per_session() {
    let store = seeded_store();
    let calls = Arc::new(Mutex::new(0u32));
    let api = CountingApi {
        inner: FavoritesLedger::new(store.clone()),
        reconcile_calls: calls.clone(),
    };
    let mut session = SyncSession::new(api, MemoryStorage::new());
    session.toggle(entry("101", "Glitch Hoodie")).await.unwrap();

    let first = session.handle_login(7).await.unwrap();
    let second = session.handle_login(7).await.unwrap();

    assert!(matches!(first, MergeOutcome::Merged(_)));
    assert!(matches!(second, MergeOutcome::AlreadySynced));
    assert_eq!(*calls.lock(), 1);
}

#[tokio::test]
async fn test_cross_device_union() {
    let store = seeded_store();
    let ledger = FavoritesLedger::new(store.clone());
    ledger.add(9, 201).await.unwrap();

    let mut session = session_over(&store);
    session.toggle(entry("202", "Pixel Socks")).await.unwrap();
    session.handle_login(9).await.unwrap();

    let mut ids: Vec<i64> = ledger.list(9).await.unwrap().iter().map(|f| f.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![201, 202]);
}

#[tokio::test]
async fn test_logged_out_toggle_queues_instead_of_calling_api() {
    let store = seeded_store();
    let ledger = FavoritesLedger::new(store.clone());
    let mut session = session_over(&store);

    let favorited = session.toggle(entry("101", "Glitch Hoodie")).await.unwrap();

    assert!(favorited);
    assert_eq!(session.pending().len(), 1);
    assert!(session.cache().contains("101"));
    assert!(!ledger.check(7, 101).await.unwrap());
    assert_eq!(store.counter(101), 0);
}

#[tokio::test]
async fn test_toggle_off_before_login_stays_local() {
    let store = seeded_store();
    let mut session = session_over(&store);

    session.toggle(entry("101", "Glitch Hoodie")).await.unwrap();
    let favorited = session.toggle(entry("101", "Glitch Hoodie")).await.unwrap();

    assert!(!favorited);
    assert!(session.cache().is_empty());
    assert_eq!(session.pending().len(), 2);
}

#[tokio::test]
async fn test_authenticated_toggle_writes_through_to_ledger() {
    let store = seeded_store();
    let ledger = FavoritesLedger::new(store.clone());
    let mut session = session_over(&store);
    session.handle_login(7).await.unwrap();

    session.toggle(entry("101", "Glitch Hoodie")).await.unwrap();
    assert!(ledger.check(7, 101).await.unwrap());
    assert_eq!(store.counter(101), 1);

    session.toggle(entry("101", "Glitch Hoodie")).await.unwrap();
    assert!(!ledger.check(7, 101).await.unwrap());
    assert_eq!(store.counter(101), 0);
}

#[tokio::test]
async fn test_failed_toggle_reverts_optimistic_cache_change() {
    let store = seeded_store();
    let mut session = session_over(&store);
    session.handle_login(7).await.unwrap();

    // unknown product: the ledger rejects, the cache change must roll back
    let err = session.toggle(entry("9999", "Ghost Item")).await.unwrap_err();
    assert_eq!(err.http_status(), 404);
    assert!(!session.cache().contains("9999"));

    // connectivity loss mid-session: same revert, error surfaced
    session.toggle(entry("101", "Glitch Hoodie")).await.unwrap();
    store.simulate_error("database_error");
    let err = session.toggle(entry("101", "Glitch Hoodie")).await.unwrap_err();
    assert!(err.is_connectivity());
    // the remove was reverted, the entry is still cached
    assert!(session.cache().contains("101"));
    store.reset_error_simulation();
}

#[tokio::test]
async fn test_failed_merge_leaves_cache_untouched_and_retryable() {
    let store = seeded_store();
    let mut session = session_over(&store);
    session.toggle(entry("101", "Glitch Hoodie")).await.unwrap();

    store.simulate_error("network_error");
    let err = session.handle_login(7).await.unwrap_err();
    assert!(err.is_connectivity());
    assert_eq!(session.phase(), SyncPhase::Unauthenticated);
    assert!(!session.cache().sync_completed());
    assert_eq!(session.cache().len(), 1);

    // next login-detection event retries and completes the merge
    store.reset_error_simulation();
    let outcome = session.handle_login(7).await.unwrap();
    assert!(matches!(outcome, MergeOutcome::Merged(_)));
    assert!(session.cache().sync_completed());
}

#[tokio::test]
async fn test_merge_swallows_per_item_failures() {
    let store = seeded_store();
    let ledger = FavoritesLedger::new(store.clone());
    let mut session = session_over(&store);
    session.toggle(entry("101", "Glitch Hoodie")).await.unwrap();
    session.toggle(entry("9999", "Ghost Item")).await.unwrap();

    let outcome = session.handle_login(7).await.unwrap();
    let MergeOutcome::Merged(report) = outcome else {
        panic!("expected a merge");
    };

    assert_eq!(report.synced_count, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(session.phase(), SyncPhase::Synced);

    let ids: Vec<i64> = ledger.list(7).await.unwrap().iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![101]);
}

#[tokio::test]
async fn test_logout_clears_cache_and_resets_sync_state() {
    let store = seeded_store();
    let mut session = session_over(&store);
    session.handle_login(7).await.unwrap();
    session.toggle(entry("101", "Glitch Hoodie")).await.unwrap();
    assert!(session.cache().sync_completed());

    session.handle_logout();

    assert_eq!(session.phase(), SyncPhase::LoggedOut);
    assert!(session.cache().is_empty());
    assert!(!session.cache().sync_completed());
    assert!(session.pending().is_empty());
}

#[tokio::test]
async fn test_relogin_after_logout_merges_again() {
    let store = seeded_store();
    let ledger = FavoritesLedger::new(store.clone());
    let mut session = session_over(&store);

    session.toggle(entry("101", "Glitch Hoodie")).await.unwrap();
    session.handle_login(7).await.unwrap();
    session.handle_logout();

    // favorites set on the account survive; the next login pulls them back
    let outcome = session.handle_login(7).await.unwrap();
    assert!(matches!(outcome, MergeOutcome::Merged(_)));
    assert!(session.cache().contains("101"));
    assert!(ledger.check(7, 101).await.unwrap());
}
