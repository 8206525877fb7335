//! Observable bridge: feeds a snapshot store from an upstream stream for the
//! lifetime of one mount instance.

use super::scope::Lifecycle;
use super::slot::{Activation, MountSlot, MountToken};
use crate::error::{BridgeError, Result, StreamError};
use crate::snapshot::{ChangeFeed, SnapshotStore, StoreReader};
use crate::stream::{Observable, Observer, Subscription};
use crate::types::{BridgeConfig, BridgeStats, MountEpoch};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Forwards upstream emissions into the store while its mount is live.
///
/// The slot revokes the token before disposing the upstream subscription, so
/// emissions queued behind the dispose call never reach the store.
struct ForwardObserver<T> {
    store: SnapshotStore<T>,
    token: MountToken,
}

impl<T: Send + Sync + 'static> Observer<T> for ForwardObserver<T> {
    fn next(&self, value: T) {
        if !self.token.is_live() {
            tracing::trace!(
                epoch = %self.token.epoch(),
                "Dropping emission from released subscription"
            );
            return;
        }
        self.store.next(value);
    }

    fn error(&self, error: StreamError) {
        if !self.token.is_live() {
            return;
        }
        self.store.fail(error);
    }

    fn complete(&self) {
        tracing::debug!(epoch = %self.token.epoch(), "Upstream stream completed");
    }
}

/// Bridges a push-based stream into a pull-based [`SnapshotStore`].
///
/// The runtime drives three entry points:
/// - [`read`](Self::read) during render (activates on first use)
/// - [`activate`](Self::activate) when the component mounts
/// - [`teardown`](Self::teardown) when it unmounts
///
/// # Invariants
///
/// 1. At most one upstream subscription is live at any time.
/// 2. Each activation calls the factory once and subscribes to the new stream.
/// 3. Nothing delivered through a released subscription touches the store.
/// 4. The store is seeded before the first subscribe, so the first read never
///    races an upstream emission.
pub struct ObservableBridge<T, S, F> {
    factory: F,
    initial: Arc<T>,
    store: SnapshotStore<T>,
    reader: StoreReader<T>,
    slot: MountSlot<Subscription>,
    /// Set once a build has subscribed. A retry after a failed first
    /// activation is not a remount.
    was_live: AtomicBool,
    config: BridgeConfig,
    _stream: PhantomData<fn() -> S>,
}

impl<T, S, F> ObservableBridge<T, S, F>
where
    T: Send + Sync + 'static,
    S: Observable<T>,
    F: Fn() -> std::result::Result<S, StreamError> + Send + Sync,
{
    /// Create a bridge seeded with `initial`. Nothing is subscribed yet.
    pub fn new(factory: F, initial: T) -> Self {
        Self::with_config(factory, initial, BridgeConfig::default())
    }

    pub fn with_config(factory: F, initial: T, config: BridgeConfig) -> Self {
        let initial = Arc::new(initial);
        let store = SnapshotStore::from_arc(Arc::clone(&initial));
        Self {
            factory,
            reader: store.reader(),
            store,
            initial,
            slot: MountSlot::new(),
            was_live: AtomicBool::new(false),
            config,
            _stream: PhantomData,
        }
    }

    /// The read-only store the runtime subscribes to. Stable for the
    /// bridge's lifetime.
    ///
    /// ```compile_fail
    /// use streambridge::{ObservableBridge, Subject};
    ///
    /// let source: Subject<u32> = Subject::new();
    /// let bridge = ObservableBridge::new(move || Ok(source.clone()), 0);
    /// bridge.store().next(1);
    /// ```
    pub fn store(&self) -> &StoreReader<T> {
        &self.reader
    }

    /// Open a change feed sized by `BridgeConfig::watch_buffer_size`.
    pub fn watch(&self) -> ChangeFeed {
        self.store.watch(self.config.watch_buffer_size)
    }

    /// Subscribe to a freshly built stream unless already active.
    ///
    /// Factory errors propagate and leave the bridge inactive.
    pub fn activate(&self) -> Result<Activation> {
        self.slot.activate(|token| {
            let stream = (self.factory)().map_err(BridgeError::Factory)?;

            if self.was_live.load(Ordering::SeqCst) {
                if self.config.reseed_on_remount {
                    self.store.reseed(Arc::clone(&self.initial));
                } else {
                    self.store.clear_error();
                }
            }

            let observer = Arc::new(ForwardObserver {
                store: self.store.clone(),
                token: token.clone(),
            });
            let upstream = stream.subscribe(observer);
            self.was_live.store(true, Ordering::SeqCst);
            tracing::debug!(epoch = %token.epoch(), "Subscribed to upstream stream");

            Ok(upstream)
        })
    }

    /// Render-time read. Activates on first use, then returns the snapshot or
    /// the upstream error.
    pub fn read(&self) -> Result<Arc<T>> {
        if !self.slot.is_active() {
            self.activate()?;
        }
        self.store.get_snapshot()
    }

    /// Dispose the upstream subscription. Returns false if nothing was active.
    pub fn teardown(&self) -> Result<bool> {
        self.slot.teardown()
    }

    pub fn is_active(&self) -> bool {
        self.slot.is_active()
    }

    pub fn epoch(&self) -> MountEpoch {
        self.slot.epoch()
    }

    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            active: self.slot.is_active(),
            epoch: self.slot.epoch(),
            version: self.store.version(),
            listeners: self.store.listener_count(),
            watchers: self.store.watcher_count(),
            failed: self.store.is_failed(),
        }
    }
}

impl<T, S, F> Lifecycle for ObservableBridge<T, S, F>
where
    T: Send + Sync + 'static,
    S: Observable<T>,
    F: Fn() -> std::result::Result<S, StreamError> + Send + Sync,
{
    fn mount(&self) -> Result<()> {
        self.activate().map(|_| ())
    }

    fn unmount(&self) -> Result<()> {
        self.teardown().map(|_| ())
    }

    fn is_mounted(&self) -> bool {
        self.is_active()
    }
}
