/// Concurrent access integration tests
///
/// These tests verify that scopes behave correctly under concurrent access:
/// no lost updates in the shared store, complete isolation between threads
/// for thread scopes, and race-free lazy store creation.

use crossbeam_utils::thread as cb_thread;
use ferrous_scopes::{NullScope, ProcessScope, Scope, ScopeRegistry, ScopeKind, ThreadScope};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 16;
const KEYS_PER_THREAD: usize = 200;

#[derive(Debug)]
struct Service {
    id: u32,
}

impl Service {
    fn new() -> Self {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        Self {
            id: COUNTER.fetch_add(1, Ordering::SeqCst),
        }
    }
}

#[test]
fn test_process_scope_distinct_keys_no_lost_updates() {
    let scope = ProcessScope::<(usize, usize), usize>::new();
    let barrier = Barrier::new(THREADS);

    cb_thread::scope(|s| {
        for t in 0..THREADS {
            let scope = &scope;
            let barrier = &barrier;
            s.spawn(move |_| {
                barrier.wait();
                for k in 0..KEYS_PER_THREAD {
                    scope.set((t, k), t * KEYS_PER_THREAD + k);
                }
            });
        }
    })
    .unwrap();

    assert_eq!(scope.len(), THREADS * KEYS_PER_THREAD);
    for t in 0..THREADS {
        for k in 0..KEYS_PER_THREAD {
            assert_eq!(scope.get(&(t, k)), Ok(t * KEYS_PER_THREAD + k));
        }
    }
}

#[test]
fn test_process_scope_same_key_last_writer_wins() {
    let scope = ProcessScope::<&str, Arc<Service>>::new();
    let written: Vec<Arc<Service>> = (0..THREADS).map(|_| Arc::new(Service::new())).collect();
    let barrier = Barrier::new(THREADS);

    cb_thread::scope(|s| {
        for value in &written {
            let scope = &scope;
            let barrier = &barrier;
            s.spawn(move |_| {
                barrier.wait();
                scope.set("shared", value.clone());
            });
        }
    })
    .unwrap();

    let winner = scope.get(&"shared").unwrap();
    assert!(written.iter().any(|value| Arc::ptr_eq(value, &winner)));
    // Every loser was dropped from the store.
    let retained = written.iter().filter(|value| Arc::strong_count(value) > 1).count();
    assert_eq!(retained, 1);
}

#[test]
fn test_process_scope_readers_see_whole_values() {
    let scope = Arc::new(ProcessScope::<u32, Arc<Vec<u32>>>::new());
    scope.set(0, Arc::new(vec![0; 64]));

    let writer_scope = scope.clone();
    let writer = thread::spawn(move || {
        for round in 1..500u32 {
            writer_scope.set(0, Arc::new(vec![round; 64]));
        }
    });

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let scope = scope.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let value = scope.get(&0).unwrap();
                    let first = value[0];
                    assert!(value.iter().all(|v| *v == first));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn test_thread_scope_isolation_across_many_threads() {
    let scope = ThreadScope::<&str, Arc<Service>>::new();
    let barrier = Barrier::new(THREADS);

    let ids: Vec<u32> = cb_thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let scope = &scope;
                let barrier = &barrier;
                s.spawn(move |_| {
                    assert!(scope.get(&"service").is_err());
                    // Every thread races to create its own store.
                    barrier.wait();
                    let service = Arc::new(Service::new());
                    scope.set("service", service.clone());

                    for _ in 0..100 {
                        let seen = scope.get(&"service").unwrap();
                        assert!(Arc::ptr_eq(&seen, &service));
                    }
                    service.id
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    let mut unique = ids.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), THREADS);

    // Nothing leaked into the spawning thread.
    assert!(scope.get(&"service").is_err());
}

#[test]
fn test_registry_shared_across_threads() {
    let registry = Arc::new(ScopeRegistry::<&str, Arc<Service>>::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                registry.scope(ScopeKind::Process)
            })
        })
        .collect();

    let scopes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(scopes.iter().all(|scope| Arc::ptr_eq(scope, &scopes[0])));
}

#[test]
fn test_container_style_double_checked_build() {
    // A container builds on miss and stores; with the process scope every
    // thread must end up sharing a single instance.
    let scope = Arc::new(ProcessScope::<&str, Arc<Service>>::new());
    let build_lock = Arc::new(std::sync::Mutex::new(()));
    let builds = Arc::new(AtomicU32::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let scope = scope.clone();
            let build_lock = build_lock.clone();
            let builds = builds.clone();
            thread::spawn(move || match scope.get(&"db") {
                Ok(db) => db,
                Err(_) => {
                    let _guard = build_lock.lock().unwrap();
                    match scope.get(&"db") {
                        Ok(db) => db,
                        Err(_) => {
                            builds.fetch_add(1, Ordering::SeqCst);
                            let db = Arc::new(Service::new());
                            scope.set("db", db.clone());
                            db
                        }
                    }
                }
            })
        })
        .collect();

    let services: Vec<Arc<Service>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert!(services.iter().all(|s| Arc::ptr_eq(s, &services[0])));
}

#[test]
fn test_null_scope_never_shares_under_contention() {
    let scope = NullScope;

    cb_thread::scope(|s| {
        for _ in 0..THREADS {
            let scope = &scope;
            s.spawn(move |_| {
                for i in 0..100u32 {
                    Scope::<u32, u32>::set(scope, i, i);
                    assert!(Scope::<u32, u32>::get(scope, &i).is_err());
                }
            });
        }
    })
    .unwrap();
}
