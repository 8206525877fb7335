//! Mount lifecycle tests for the observable bridge.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use streambridge::{
    Activation, EventEmitter, Lifecycle, MountEpoch, MountScope, Observable, ObservableBridge,
    Observer, StreamError, Subject, Subscription,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Factory that builds a new subject per call and remembers every one.
fn fresh_sources() -> (
    Arc<Mutex<Vec<Subject<u32>>>>,
    impl Fn() -> Result<Subject<u32>, StreamError> + Send + Sync,
) {
    let made = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&made);
    let factory = move || {
        let subject = Subject::new();
        log.lock().push(subject.clone());
        Ok(subject)
    };
    (made, factory)
}

/// Emits a fixed burst synchronously inside `subscribe`.
struct Burst(Vec<u32>);

impl Observable<u32> for Burst {
    fn subscribe(&self, observer: Arc<dyn Observer<u32>>) -> Subscription {
        for value in &self.0 {
            observer.next(*value);
        }
        Subscription::empty()
    }
}

// --- Single Subscription ---

#[test]
fn test_single_subscription_across_renders() {
    let subject: Subject<u32> = Subject::new();
    let source = subject.clone();
    let bridge = ObservableBridge::new(move || Ok(source.clone()), 0);

    for _ in 0..5 {
        bridge.read().unwrap();
    }
    for _ in 0..3 {
        bridge.activate().unwrap();
    }

    assert_eq!(subject.observer_count(), 1);
    assert_eq!(bridge.epoch(), MountEpoch(1));
}

#[test]
fn test_runtime_listeners_independent_of_mount() {
    let subject: Subject<u32> = Subject::new();
    let source = subject.clone();
    let bridge = ObservableBridge::new(move || Ok(source.clone()), 0);
    bridge.activate().unwrap();

    // The runtime subscribes and unsubscribes around each render.
    for i in 1..=3 {
        let listener = bridge.store().subscribe(|| {});
        subject.next(i);
        listener.dispose().unwrap();
    }

    assert_eq!(bridge.store().listener_count(), 0);
    assert!(bridge.is_active());
    assert_eq!(subject.observer_count(), 1);
    assert_eq!(*bridge.read().unwrap(), 3);
}

// --- Teardown ---

#[test]
fn test_no_mutation_after_teardown() {
    let subject: Subject<u32> = Subject::new();
    let source = subject.clone();
    let bridge = ObservableBridge::new(move || Ok(source.clone()), 0);

    bridge.activate().unwrap();
    subject.next(1);
    let before = bridge.store().get_snapshot().unwrap();
    bridge.teardown().unwrap();

    subject.next(2);
    subject.next(3);

    let after = bridge.store().get_snapshot().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(*after, 1);
}

#[test]
fn test_teardown_during_synchronous_burst() {
    init_tracing();
    let bridge = Arc::new(ObservableBridge::new(|| Ok(Burst(vec![1, 2, 3, 4, 5])), 0));

    let reentrant = Arc::clone(&bridge);
    let _listener = bridge.store().subscribe(move || {
        if let Ok(value) = reentrant.store().get_snapshot() {
            if *value == 2 {
                reentrant.teardown().unwrap();
            }
        }
    });

    let outcome = bridge.activate().unwrap();

    assert_eq!(outcome, Activation::Superseded(MountEpoch(1)));
    assert!(!bridge.is_active());
    assert_eq!(*bridge.store().get_snapshot().unwrap(), 2);
}

// --- Remount ---

#[test]
fn test_remount_uses_fresh_stream() {
    let (made, factory) = fresh_sources();
    let bridge = ObservableBridge::new(factory, 0);

    bridge.activate().unwrap();
    bridge.teardown().unwrap();
    assert_eq!(bridge.activate().unwrap(), Activation::Fresh(MountEpoch(2)));

    let sources = made.lock().clone();
    assert_eq!(sources.len(), 2);
    assert!(!sources[0].ptr_eq(&sources[1]));
    assert_eq!(sources[0].observer_count(), 0);
    assert_eq!(sources[1].observer_count(), 1);

    sources[0].next(99);
    assert_eq!(*bridge.read().unwrap(), 0);

    sources[1].next(5);
    assert_eq!(*bridge.read().unwrap(), 5);
}

#[test]
fn test_fake_unmount_cycle() {
    init_tracing();
    let (made, factory) = fresh_sources();
    let bridge = ObservableBridge::new(factory, 10);

    // Render eagerly activates, then the runtime mounts, fakes an unmount,
    // and mounts again.
    assert_eq!(*bridge.read().unwrap(), 10);
    bridge.mount().unwrap();
    made.lock()[0].next(11);
    bridge.unmount().unwrap();
    bridge.mount().unwrap();

    assert!(bridge.is_mounted());
    let sources = made.lock().clone();
    assert_eq!(sources.len(), 2);
    let live: usize = sources.iter().map(|s| s.observer_count()).sum();
    assert_eq!(live, 1);

    // Last accepted value survives the remount.
    assert_eq!(*bridge.read().unwrap(), 11);
    sources[1].next(12);
    assert_eq!(*bridge.read().unwrap(), 12);
}

// --- Ordering ---

#[test]
fn test_listener_observes_every_value_in_order() {
    let subject: Subject<u32> = Subject::new();
    let source = subject.clone();
    let bridge = Arc::new(ObservableBridge::new(move || Ok(source.clone()), 0));
    bridge.activate().unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let reader = Arc::clone(&bridge);
    let log = Arc::clone(&seen);
    let _listener = bridge.store().subscribe(move || {
        log.lock().push(*reader.store().get_snapshot().unwrap());
    });

    subject.next(1);
    subject.next(2);
    subject.next(3);

    assert_eq!(*seen.lock(), vec![1, 2, 3]);
    assert_eq!(*bridge.read().unwrap(), 3);
}

// --- Scopes ---

#[test]
fn test_scope_wires_emitter_into_bridge() {
    let mut scope = MountScope::new();
    let clicks = scope.add(Arc::new(EventEmitter::<u32>::new()));

    let source = Arc::clone(&clicks);
    let bridge = scope.add(Arc::new(ObservableBridge::new(
        move || {
            source
                .stream()
                .ok_or_else(|| StreamError::msg("click stream not mounted"))
        },
        0,
    )));

    scope.mount().unwrap();
    let first_stream = clicks.stream().unwrap();
    assert!(clicks.emit(1));
    assert_eq!(*bridge.read().unwrap(), 1);

    // Fake unmount: bridge tears down first, then the emitter completes.
    scope.unmount().unwrap();
    assert!(!clicks.emit(2));
    assert!(first_stream
        .subscribe(streambridge::observer(|_v: u32| {}))
        .is_closed());

    scope.mount().unwrap();
    assert!(clicks.emit(3));
    assert_eq!(*bridge.read().unwrap(), 3);
    assert_eq!(clicks.epoch(), MountEpoch(2));
    assert_eq!(bridge.epoch(), MountEpoch(2));
}

#[test]
fn test_factory_called_once_per_activation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let subject: Subject<u32> = Subject::new();
    let source = subject.clone();
    let bridge = ObservableBridge::new(
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(source.clone())
        },
        0,
    );

    for _ in 0..4 {
        bridge.read().unwrap();
        bridge.activate().unwrap();
        bridge.teardown().unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(subject.observer_count(), 0);
}
