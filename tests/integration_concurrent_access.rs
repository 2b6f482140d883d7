/// Concurrent access integration tests
///
/// These tests check that the container keeps its guarantees when many
/// threads resolve at once: one construction per cached key, shared
/// singletons, and isolated scopes.

use iotlogic_di::{deps, ContainerOptions, Resolver, ServiceCollection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

// ===== Test Services =====

struct BluetoothAdapter {
    created_by: thread::ThreadId,
}

struct BleManager {
    adapter: Arc<BluetoothAdapter>,
}

struct ScanSession {
    id: usize,
}

const THREADS: usize = 16;

#[test]
fn test_contended_singleton_is_constructed_once() {
    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = constructions.clone();

    let mut sc = ServiceCollection::new();
    sc.add_singleton_factory::<BluetoothAdapter, _>(deps![], move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        // Widen the race window
        thread::sleep(Duration::from_millis(20));
        Ok(BluetoothAdapter { created_by: thread::current().id() })
    });
    sc.add_singleton_factory::<BleManager, _>(deps![BluetoothAdapter], |d| Ok(BleManager { adapter: d.get(0)? }));
    let sp = sc.build().unwrap();

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let sp = sp.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                sp.get_required::<BleManager>()
            })
        })
        .collect();

    let results: Vec<Arc<BleManager>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    for ble in &results[1..] {
        assert!(Arc::ptr_eq(ble, &results[0]));
        assert!(Arc::ptr_eq(&ble.adapter, &results[0].adapter));
    }
    let _ = results[0].adapter.created_by;
}

#[test]
fn test_scopes_on_different_threads_stay_isolated() {
    let next_id = Arc::new(AtomicUsize::new(0));
    let ids = next_id.clone();

    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<ScanSession, _>(deps![], move |_| Ok(ScanSession { id: ids.fetch_add(1, Ordering::SeqCst) }));
    let sp = sc.build().unwrap();

    let session_ids: Vec<usize> = crossbeam_utils::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let sp = &sp;
                s.spawn(move |_| {
                    let scope = sp.create_scope();
                    let a = scope.get_required::<ScanSession>();
                    let b = scope.get_required::<ScanSession>();
                    assert!(Arc::ptr_eq(&a, &b));
                    a.id
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    let mut unique = session_ids.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), THREADS);
    assert_eq!(next_id.load(Ordering::SeqCst), THREADS);
}

#[test]
fn test_shared_scope_constructs_scoped_once() {
    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = constructions.clone();

    let mut sc = ServiceCollection::new();
    sc.add_scoped_factory::<ScanSession, _>(deps![], move |_| {
        thread::sleep(Duration::from_millis(10));
        Ok(ScanSession { id: counter.fetch_add(1, Ordering::SeqCst) })
    });
    let sp = sc.build().unwrap();
    let scope = sp.create_scope();

    let barrier = Barrier::new(THREADS);
    crossbeam_utils::thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|_| {
                barrier.wait();
                assert_eq!(scope.get_required::<ScanSession>().id, 0);
            });
        }
    })
    .unwrap();

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
}

#[test]
fn test_slow_singleton_does_not_block_other_keys() {
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let (started_tx, release_rx) = (Mutex::new(started_tx), Mutex::new(release_rx));

    let mut sc = ServiceCollection::new();
    sc.add_singleton_factory::<BluetoothAdapter, _>(deps![], move |_| {
        started_tx.lock().map_err(|_| "poisoned")?.send(()).ok();
        release_rx.lock().map_err(|_| "poisoned")?.recv().ok();
        Ok(BluetoothAdapter { created_by: thread::current().id() })
    });
    sc.add_singleton_factory::<ScanSession, _>(deps![], |_| Ok(ScanSession { id: 7 }));
    let sp = sc.build().unwrap();

    let slow = {
        let sp = sp.clone();
        thread::spawn(move || sp.get_required::<BluetoothAdapter>())
    };

    started_rx.recv().unwrap();
    // The adapter constructor is parked; an unrelated key still resolves
    assert_eq!(sp.get_required::<ScanSession>().id, 7);

    release_tx.send(()).unwrap();
    let adapter = slow.join().unwrap();
    assert!(Arc::ptr_eq(&adapter, &sp.get_required::<BluetoothAdapter>()));
}

#[test]
fn test_failures_under_contention_are_retried_not_cached() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let mut sc = ServiceCollection::new();
    sc.add_singleton_factory::<BluetoothAdapter, _>(deps![], move |_| {
        // Only the third attempt succeeds
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            Err("adapter busy".into())
        } else {
            Ok(BluetoothAdapter { created_by: thread::current().id() })
        }
    });
    let sp = sc.build().unwrap();

    let barrier = Barrier::new(THREADS);
    let outcomes: Vec<bool> = crossbeam_utils::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|_| {
                    barrier.wait();
                    sp.get::<BluetoothAdapter>().is_ok()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    assert_eq!(outcomes.iter().filter(|ok| !**ok).count(), 2);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(sp.singleton_count(), 1);
}

#[test]
fn test_chain_entered_from_both_ends_completes() {
    let mut sc = ServiceCollection::with_options(ContainerOptions::default().validate_on_build(false));
    sc.add_singleton_factory::<BluetoothAdapter, _>(deps![], |_| {
        thread::sleep(Duration::from_millis(20));
        Ok(BluetoothAdapter { created_by: thread::current().id() })
    });
    sc.add_singleton_factory::<BleManager, _>(deps![BluetoothAdapter], |d| {
        thread::sleep(Duration::from_millis(20));
        Ok(BleManager { adapter: d.get(0)? })
    });
    let sp = sc.build().unwrap();

    let (done_tx, done_rx) = mpsc::channel();
    let barrier = Arc::new(Barrier::new(2));
    for from_top in [true, false] {
        let (sp, barrier, done_tx) = (sp.clone(), barrier.clone(), done_tx.clone());
        thread::spawn(move || {
            barrier.wait();
            let adapter = if from_top {
                sp.get::<BleManager>().map(|ble| ble.adapter.clone())
            } else {
                sp.get::<BluetoothAdapter>()
            };
            done_tx.send(adapter.map(|a| a.created_by)).ok();
        });
    }

    let first = done_rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
    let second = done_rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(sp.singleton_count(), 2);
}
