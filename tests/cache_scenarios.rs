//! End-to-end cache scenarios
//!
//! Drives the public cache API the way the portal's data layer does, with a
//! manual clock standing in for wall time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use portal_cache::cache::{
    clear_all_api_cache, CacheManager, ManualClock, QueryCache, QueryCacheStats,
};
use portal_cache::storage::{FileKvStore, InMemoryKvStore, KvStore};
use portal_cache::tasks::Sweeper;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};

// == Helpers ==

const START: u64 = 1_700_000_000_000;

fn manager_with(store: Arc<dyn KvStore>) -> (CacheManager, ManualClock) {
    let clock = ManualClock::new(START);
    let manager = CacheManager::new("portal_", store).with_clock(Arc::new(clock.clone()));
    (manager, clock)
}

// == Appointments Scenario ==

#[test]
fn appointments_entry_lives_for_its_ttl() {
    let (cache, clock) = manager_with(Arc::new(InMemoryKvStore::new()));
    let ttl = Duration::from_millis(5 * 60 * 1000);

    assert_ok!(cache.set(
        "appointments",
        "list",
        json!({"count": 2}),
        &json!({"doctorId": "dr-1"}),
        ttl
    ));

    let hit = assert_ok!(cache.get("appointments", "list", &json!({"doctorId": "dr-1"})));
    assert_eq!(hit, Some(json!({"count": 2})));

    let other = assert_ok!(cache.get("appointments", "list", &json!({"doctorId": "dr-2"})));
    assert_eq!(other, None);

    clock.advance(ttl);
    let expired = assert_ok!(cache.get("appointments", "list", &json!({"doctorId": "dr-1"})));
    assert_eq!(expired, None);
    assert_eq!(cache.get_stats().memory.entries, 0);
}

#[test]
fn appointments_accessor_uses_short_ttl() {
    let (cache, clock) = manager_with(Arc::new(InMemoryKvStore::new()));
    let params = json!({"doctorId": "dr-1"});

    assert_ok!(cache.appointments().set("availability", json!(["09:00"]), &params));

    clock.advance(Duration::from_secs(5 * 60 - 1));
    assert!(assert_ok!(cache.appointments().get("availability", &params)).is_some());

    clock.advance(Duration::from_secs(1));
    assert!(assert_ok!(cache.appointments().get("availability", &params)).is_none());
}

// == Clear All Scenario ==

#[test]
fn clear_all_empties_both_tiers() {
    let (cache, _) = manager_with(Arc::new(InMemoryKvStore::new()));
    for ns in ["doctors", "blog", "reports"] {
        assert_ok!(cache.set(ns, "first", json!(1), &(), Duration::from_secs(60)));
        assert_ok!(cache.set(ns, "second", json!(2), &json!({"page": 2}), Duration::from_secs(60)));
    }
    assert_eq!(cache.get_stats().memory.entries, 6);
    assert_eq!(cache.get_stats().persistent.entries, 6);

    let outcome = cache.clear_all();

    assert_eq!(outcome.memory, 6);
    assert_eq!(outcome.persistent, 6);
    let stats = cache.get_stats();
    assert_eq!(stats.memory.entries, 0);
    assert_eq!(stats.persistent.entries, 0);
}

#[test]
fn clear_all_leaves_foreign_keys_in_the_store() {
    let store = Arc::new(InMemoryKvStore::new());
    assert_ok!(store.set_item("session_token", "abc"));
    let (cache, _) = manager_with(store.clone());
    assert_ok!(cache.set("user", "me", json!({}), &(), Duration::from_secs(60)));

    cache.clear_all();

    assert_eq!(assert_ok!(store.get_item("session_token")), Some("abc".to_string()));
    assert_eq!(store.len(), 1);
}

// == Fail-Soft Persistence ==

#[test]
fn full_store_does_not_fail_set() {
    let store = Arc::new(InMemoryKvStore::with_quota(16));
    let (cache, _) = manager_with(store.clone());

    assert_ok!(cache.set(
        "reports",
        "monthly",
        json!({"rows": [1, 2, 3, 4, 5, 6, 7, 8]}),
        &(),
        Duration::from_secs(60)
    ));

    let key = assert_ok!(cache.key_builder().build("reports", "monthly", &()));
    assert!(cache.memory().get(&key, START).is_some());
    assert!(store.is_empty());
    assert_eq!(
        assert_ok!(cache.get("reports", "monthly", &())),
        Some(json!({"rows": [1, 2, 3, 4, 5, 6, 7, 8]}))
    );
}

#[test]
fn unavailable_store_degrades_to_memory_only() {
    let store = Arc::new(InMemoryKvStore::new());
    store.set_available(false);
    let (cache, _) = manager_with(store.clone());

    assert_ok!(cache.set("settings", "theme", json!("dark"), &(), Duration::from_secs(60)));
    assert_eq!(assert_ok!(cache.get("settings", "theme", &())), Some(json!("dark")));
    assert_eq!(cache.get_stats().persistent.entries, 0);
    assert_eq!(cache.clear_namespace("settings").map(|o| o.memory).ok(), Some(1));
}

#[test]
fn empty_namespace_or_key_is_rejected() {
    let (cache, _) = manager_with(Arc::new(InMemoryKvStore::new()));
    assert_err!(cache.set("", "theme", json!(1), &(), Duration::from_secs(1)));
    assert_err!(cache.get("", "theme", &()));
    assert_err!(cache.delete("user", "", &()));
}

#[test]
fn underscored_namespaces_are_ordinary_namespaces() {
    let (cache, _) = manager_with(Arc::new(InMemoryKvStore::new()));
    assert_ok!(cache.set("user_profile", "me", json!(1), &(), Duration::from_secs(60)));
    assert_ok!(cache.set("user", "profile_me", json!(2), &(), Duration::from_secs(60)));

    assert_eq!(assert_ok!(cache.get("user_profile", "me", &())), Some(json!(1)));
    assert_eq!(assert_ok!(cache.clear_namespace("user")).total(), 2);
    assert_eq!(assert_ok!(cache.get("user_profile", "me", &())), Some(json!(1)));
}

// == Restart Scenario ==

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Doctor {
    id: String,
    name: String,
}

#[test]
fn persisted_entries_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("portal-cache.json");
    let clock = ManualClock::new(START);
    let doctor = Doctor {
        id: "dr-1".to_string(),
        name: "Grace".to_string(),
    };

    {
        let store = Arc::new(FileKvStore::open(&path, None).unwrap());
        let cache: CacheManager<Doctor> =
            CacheManager::new("portal_", store).with_clock(Arc::new(clock.clone()));
        cache.doctors().set("detail", doctor.clone(), &json!({"id": "dr-1"})).unwrap();
    }

    clock.advance(Duration::from_secs(30 * 60));
    let store = Arc::new(FileKvStore::open(&path, None).unwrap());
    let cache: CacheManager<Doctor> =
        CacheManager::new("portal_", store).with_clock(Arc::new(clock.clone()));
    assert_eq!(cache.get_stats().memory.entries, 0);

    let found = cache.doctors().get("detail", &json!({"id": "dr-1"})).unwrap();
    assert_eq!(found, Some(doctor));

    let stats = cache.get_stats();
    assert_eq!(stats.memory.entries, 1);
    assert_eq!(stats.requests.persistent_hits, 1);

    // Promoted copy keeps the original hour-long lifetime.
    clock.advance(Duration::from_secs(30 * 60));
    assert_eq!(cache.doctors().get("detail", &json!({"id": "dr-1"})).unwrap(), None);
}

#[test]
fn corrupt_store_file_starts_an_empty_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("portal-cache.json");
    std::fs::write(&path, "not json").unwrap();

    let store = Arc::new(FileKvStore::open_or_recover(&path, None));
    let (cache, _) = manager_with(store);
    assert_eq!(cache.get_stats().persistent.entries, 0);
    assert_eq!(assert_ok!(cache.get("doctors", "all", &())), None);

    assert_ok!(cache.set("doctors", "all", json!(["dr-1"]), &(), Duration::from_secs(60)));
    let reopened = assert_ok!(FileKvStore::open(&path, None));
    assert_eq!(assert_ok!(reopened.keys()).len(), 1);
}

// == Query Cache ==

#[derive(Default)]
struct CountingQueryCache {
    resets: AtomicUsize,
}

impl QueryCache for CountingQueryCache {
    fn stats(&self) -> QueryCacheStats {
        QueryCacheStats::default()
    }

    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn clear_all_api_cache_resets_both_layers() {
    let (cache, _) = manager_with(Arc::new(InMemoryKvStore::new()));
    let query_cache = CountingQueryCache::default();
    assert_ok!(cache.blog().set_post("hello-world", json!({"title": "Hello"})));
    assert_ok!(cache.categories().set("all", json!(["news"]), &()));

    let outcome = clear_all_api_cache(&cache, &query_cache);

    assert_eq!(outcome.total(), 4);
    assert_eq!(query_cache.resets.load(Ordering::SeqCst), 1);
    assert_eq!(assert_ok!(cache.blog().get_post("hello-world")), None);
}

// == Sweeper ==

#[tokio::test(start_paused = true)]
async fn sweeper_removes_entries_nobody_reads() {
    let store = Arc::new(InMemoryKvStore::new());
    let (cache, clock) = manager_with(store.clone());
    let cache: Arc<CacheManager<Value>> = Arc::new(cache);
    assert_ok!(cache.set("appointments", "list", json!([]), &(), Duration::from_secs(60)));
    assert_ok!(cache.set("categories", "all", json!([]), &(), Duration::from_secs(3600)));

    let sweeper = Sweeper::new(Duration::from_secs(600));
    assert!(sweeper.start(cache.clone()));

    clock.advance(Duration::from_secs(120));
    tokio::time::sleep(Duration::from_secs(601)).await;
    tokio::task::yield_now().await;

    let stats = cache.get_stats();
    assert_eq!(stats.memory.entries, 1);
    assert_eq!(stats.persistent.entries, 1);
    assert_eq!(store.len(), 1);

    assert!(sweeper.stop());
    assert!(!sweeper.is_running());
}
