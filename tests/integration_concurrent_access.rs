//! Concurrent access integration tests
//!
//! These tests verify that a shared container builds each type at most once
//! when many threads resolve at the same time.

use ferrous_ioc::{params, Catalog, Container, HolderInfo, Resolver, TypeInfo};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const THREADS: usize = 8;

#[derive(Debug)]
struct SlowService {
    created_by: String,
}

struct Consumer {
    slow: Arc<SlowService>,
}

#[test]
fn test_concurrent_resolution_constructs_once() {
    static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

    let mut catalog = Catalog::new();
    catalog.add(TypeInfo::injectable::<SlowService>().default_constructor(|| {
        CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        SlowService {
            created_by: format!("{:?}", thread::current().id()),
        }
    }));

    let container = Container::from_source(catalog).unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let container = container.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                container.resolve::<SlowService>().unwrap()
            })
        })
        .collect();

    let instances: Vec<Arc<SlowService>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), 1);
    for instance in &instances[1..] {
        assert!(Arc::ptr_eq(&instances[0], instance));
        assert_eq!(instances[0].created_by, instance.created_by);
    }
}

#[test]
fn test_concurrent_dependents_share_dependency() {
    static SLOW: AtomicUsize = AtomicUsize::new(0);
    static CONSUMERS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Default)]
    struct Factory;

    let mut catalog = Catalog::new();
    catalog
        .add(TypeInfo::injectable::<Consumer>().inject_constructor(params![SlowService], |args| {
            CONSUMERS.fetch_add(1, Ordering::SeqCst);
            Ok(Consumer { slow: args.next()? })
        }))
        .add_holder(
            HolderInfo::factory::<Factory>()
                .constructor(Factory::default)
                .producer("slow", |_: &Factory| {
                    SLOW.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(10));
                    SlowService {
                        created_by: "factory".to_string(),
                    }
                }),
        );

    let container = Container::from_source(catalog).unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    // half the threads ask for the dependent, half for the dependency
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let container = container.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                if i % 2 == 0 {
                    container.resolve::<Consumer>().unwrap().slow.clone()
                } else {
                    container.resolve::<SlowService>().unwrap()
                }
            })
        })
        .collect();

    let seen: Vec<Arc<SlowService>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(SLOW.load(Ordering::SeqCst), 1);
    assert_eq!(CONSUMERS.load(Ordering::SeqCst), 1);
    assert!(seen.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(container.cached_count(), 2);
}

#[test]
fn test_unrelated_types_resolve_in_parallel() {
    struct First;
    struct Second;

    let barrier = Arc::new(Barrier::new(2));
    let (first_barrier, second_barrier) = (barrier.clone(), barrier.clone());

    // each constructor waits for the other, so this only finishes if the
    // two constructions overlap
    let mut catalog = Catalog::new();
    catalog
        .add(TypeInfo::injectable::<First>().default_constructor(move || {
            first_barrier.wait();
            First
        }))
        .add(TypeInfo::injectable::<Second>().default_constructor(move || {
            second_barrier.wait();
            Second
        }));

    let container = Container::from_source(catalog).unwrap();
    let a = {
        let container = container.clone();
        thread::spawn(move || container.resolve::<First>().is_ok())
    };
    let b = {
        let container = container.clone();
        thread::spawn(move || container.resolve::<Second>().is_ok())
    };

    assert!(a.join().unwrap());
    assert!(b.join().unwrap());
}

#[test]
fn test_concurrent_failures_are_reported_to_every_caller() {
    struct Broken;

    let mut catalog = Catalog::new();
    catalog.add(TypeInfo::injectable::<Broken>().try_default_constructor(|| Err("offline".into())));

    let container = Container::from_source(catalog).unwrap();
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let container = container.clone();
            thread::spawn(move || container.resolve::<Broken>().is_err())
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert_eq!(container.cached_count(), 0);
}
