//! Integration tests for the mount-scoped stream adapters.

use parking_lot::Mutex;
use std::sync::Arc;
use streambridge::{
    observer, BridgeStats, ConsumerOutcome, EventEmitter, InputStream, LayoutStream, Lifecycle,
    Listener, MountEpoch, MountScope, Observable, ObservableBridge, OwnedBehaviorSubject,
    SnapshotEvent, StreamError, SubjectView,
};

fn recorder<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(T) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    (seen, move |value| log.lock().push(value))
}

// --- Event Emitter ---

#[test]
fn test_emitter_callback_survives_remount() {
    let (seen, record) = recorder::<&'static str>();
    let record = Arc::new(record);
    let emitter = EventEmitter::with_consumer(move |events: SubjectView<&'static str>| {
        let record = Arc::clone(&record);
        ConsumerOutcome::Subscribed(events.subscribe(observer(move |v| record(v))))
    });
    let click = emitter.callback();

    emitter.activate().unwrap();
    assert!(click.emit("first"));
    emitter.teardown().unwrap();
    assert!(!click.emit("unmounted"));
    emitter.activate().unwrap();
    assert!(click.emit("second"));

    assert_eq!(*seen.lock(), vec!["first", "second"]);
    assert_eq!(emitter.epoch(), MountEpoch(2));
}

#[test]
fn test_emitter_detached_consumer_runs_once_per_mount() {
    let (runs, record) = recorder::<()>();
    let emitter: EventEmitter<u32> = EventEmitter::with_consumer(move |_events| {
        record(());
        ConsumerOutcome::Detached
    });

    emitter.activate().unwrap();
    emitter.activate().unwrap();
    emitter.teardown().unwrap();
    emitter.activate().unwrap();

    assert_eq!(runs.lock().len(), 2);
}

#[test]
fn test_emitter_reentrant_emit_from_observer() {
    let emitter: Arc<EventEmitter<u32>> = Arc::new(EventEmitter::new());
    emitter.activate().unwrap();

    let (seen, record) = recorder::<u32>();
    let callback = emitter.callback();
    emitter.stream().unwrap().subscribe(observer(move |v: u32| {
        record(v);
        if v < 3 {
            callback.emit(v + 1);
        }
    }));

    assert!(emitter.emit(1));
    assert_eq!(*seen.lock(), vec![1, 2, 3]);
}

// --- Input And Layout Streams ---

#[test]
fn test_input_stream_drives_bridge() {
    let inputs = Arc::new(InputStream::new(10u32));
    inputs.activate().unwrap();

    let source = Arc::clone(&inputs);
    let bridge = ObservableBridge::new(
        move || {
            source
                .stream()
                .ok_or_else(|| StreamError::msg("inputs not mounted"))
        },
        0u32,
    );

    // Behavior replay delivers the current inputs during subscribe.
    assert_eq!(*bridge.read().unwrap(), 10);
    inputs.update(11);
    assert_eq!(*bridge.read().unwrap(), 11);
    assert_eq!(inputs.current(), 11);
}

#[test]
fn test_layout_stream_feeds_measurements() {
    let layout: Arc<LayoutStream<(u32, u32)>> = Arc::new(LayoutStream::new());
    let source = Arc::clone(&layout);
    let bridge = ObservableBridge::new(
        move || {
            source
                .stream()
                .ok_or_else(|| StreamError::msg("layout not mounted"))
        },
        (0, 0),
    );

    let mut scope = MountScope::new();
    scope.add(Arc::clone(&layout));
    let bridge = scope.add(Arc::new(bridge));
    scope.mount().unwrap();

    layout.after_layout(|| (320, 200));
    assert_eq!(*bridge.read().unwrap(), (320, 200));

    scope.unmount().unwrap();
    assert!(!layout.after_layout(|| (1, 1)));
    assert_eq!(*bridge.store().get_snapshot().unwrap(), (320, 200));
}

// --- Listener And Owned Subjects ---

#[test]
fn test_listener_tracks_owned_behavior_subject() {
    let state = Arc::new(OwnedBehaviorSubject::new(0u32));
    state.activate().unwrap();

    let (seen, record) = recorder::<u32>();
    let record = Arc::new(record);
    let source = Arc::clone(&state);
    let listener = Listener::new(move || {
        let record = Arc::clone(&record);
        match source.subject() {
            Some(subject) => subject.subscribe(observer(move |v| record(v))),
            None => streambridge::Subscription::empty(),
        }
    });

    listener.activate().unwrap();
    state.next(1);
    listener.teardown().unwrap();
    state.next(2);

    assert_eq!(*seen.lock(), vec![0, 1]);
    assert!(!listener.is_mounted());
}

// --- Observability ---

#[test]
fn test_stats_serialize_for_diagnostics() {
    let emitter: Arc<EventEmitter<u32>> = Arc::new(EventEmitter::new());
    emitter.activate().unwrap();
    let source = Arc::clone(&emitter);
    let bridge = ObservableBridge::new(
        move || {
            source
                .stream()
                .ok_or_else(|| StreamError::msg("emitter not mounted"))
        },
        0u32,
    );
    bridge.activate().unwrap();
    emitter.emit(3);

    let json = serde_json::to_value(bridge.stats()).unwrap();
    assert_eq!(json["active"], true);
    assert_eq!(json["version"], 1);
    assert_eq!(json["failed"], false);

    let restored: BridgeStats = serde_json::from_value(json).unwrap();
    assert_eq!(restored, bridge.stats());
}

#[test]
fn test_watch_feed_ignores_emitter_teardown() {
    let emitter: Arc<EventEmitter<u32>> = Arc::new(EventEmitter::new());
    emitter.activate().unwrap();
    let source = Arc::clone(&emitter);
    let bridge = ObservableBridge::new(
        move || {
            source
                .stream()
                .ok_or_else(|| StreamError::msg("emitter not mounted"))
        },
        0u32,
    );
    bridge.activate().unwrap();
    let feed = bridge.store().watch(8);

    emitter.emit(1);
    // Completion is not a store change.
    emitter.teardown().unwrap();

    assert_eq!(feed.try_recv().unwrap(), SnapshotEvent::Changed { version: 1 });
    assert!(feed.try_recv().is_err());
}
