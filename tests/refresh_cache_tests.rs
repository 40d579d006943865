//! Single-flight refresh under concurrent callers
//!
//! Threads are released together through a barrier; builders sleep long
//! enough that every caller observes the same stale window.

use presence_analyzer::cache::{CachedValue, ManualClock};
use presence_analyzer::{AnalyzerConfig, Error, PresenceAnalyzer};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const TTL: Duration = Duration::from_secs(600);
const CALLERS: usize = 16;

fn hammer<T, F>(callers: usize, call: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    let call = Arc::new(call);
    let barrier = Arc::new(Barrier::new(callers));
    let handles: Vec<_> = (0..callers)
        .map(|_| {
            let call = Arc::clone(&call);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                call()
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn test_stale_entry_rebuilt_once_for_all_callers() {
    let clock = Arc::new(ManualClock::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let cache = Arc::new(CachedValue::with_clock(
        "stale",
        TTL,
        clock.clone(),
        move || {
            thread::sleep(Duration::from_millis(100));
            Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
        },
    ));

    assert_eq!(*cache.get().unwrap(), 1);
    clock.advance(TTL + Duration::from_secs(1));

    let shared = Arc::clone(&cache);
    let values = hammer(CALLERS, move || shared.get().unwrap());

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(values.iter().all(|v| **v == 2));
    assert!(values.iter().all(|v| Arc::ptr_eq(v, &values[0])));
}

#[test]
fn test_failed_rebuild_shared_by_waiting_callers() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let cache: Arc<CachedValue<()>> = Arc::new(CachedValue::new("broken", TTL, move || {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(200));
        Err(Error::Directory("missing <users> node".into()))
    }));

    let shared = Arc::clone(&cache);
    let results = hammer(CALLERS, move || shared.get().map(|_| ()));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for result in &results {
        let err = result.as_ref().unwrap_err();
        assert!(matches!(err, Error::Refresh { key: "broken", .. }));
        assert!(matches!(err.root(), Error::Directory(_)));
    }

    // A later caller retries
    assert!(cache.get().is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.stats().failures, 2);
}

#[test]
fn test_recovery_after_failure() {
    let clock = Arc::new(ManualClock::new());
    let broken = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&broken);
    let cache = CachedValue::with_clock("recover", TTL, clock.clone(), move || {
        if flag.load(Ordering::SeqCst) {
            Err(Error::Directory("truncated document".into()))
        } else {
            Ok(String::from("snapshot"))
        }
    });

    let before = cache.get().unwrap();
    let built_at = cache.built_at().unwrap();

    clock.advance(TTL * 2);
    broken.store(true, Ordering::SeqCst);
    assert!(cache.get().is_err());
    assert_eq!(cache.built_at(), Some(built_at));

    broken.store(false, Ordering::SeqCst);
    let after = cache.get().unwrap();
    assert_eq!(*before, *after);
    assert!(!Arc::ptr_eq(&before, &after));
}

#[test]
fn test_analyzer_parses_once_under_load() {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let config = AnalyzerConfig {
        data_csv: fixtures.join("presence.csv"),
        data_xml: fixtures.join("users.xml"),
        ..AnalyzerConfig::default()
    };
    let analyzer = Arc::new(PresenceAnalyzer::new(config));

    let shared = Arc::clone(&analyzer);
    let stores = hammer(CALLERS, move || {
        let store = shared.presence_store().unwrap();
        let directory = shared.directory().unwrap();
        (store, directory.len())
    });

    assert_eq!(analyzer.presence_stats().builds, 1);
    assert_eq!(analyzer.directory_stats().builds, 1);
    assert!(stores.iter().all(|(store, _)| Arc::ptr_eq(store, &stores[0].0)));
    assert!(stores.iter().all(|(_, users)| *users == 2));
}
