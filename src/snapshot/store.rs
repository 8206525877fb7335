//! Snapshot store: the pull side of the bridge.

use super::feed::{ChangeFeed, SnapshotEvent};
use super::reader::StoreReader;
use crate::error::{BridgeError, Result, StreamError};
use crate::stream::Subscription;
use crate::types::ListenerId;
use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
struct ListenerEntry {
    id: ListenerId,
    /// Cleared on dispose. A notification already in flight skips the entry.
    live: Arc<AtomicBool>,
    on_change: Listener,
}

struct StoreState<T> {
    current: Arc<T>,
    /// Bumped on every accepted value, reseed, or failure.
    version: u64,
    /// Sticky upstream error, re-raised on every read.
    error: Option<StreamError>,
}

struct Watcher {
    sender: Sender<SnapshotEvent>,
    /// Events allowed in flight before the watcher is dropped. The channel
    /// itself holds one more slot so the `Dropped` notice always fits.
    limit: usize,
}

struct StoreInner<T> {
    state: RwLock<StoreState<T>>,
    listeners: RwLock<Vec<ListenerEntry>>,
    watchers: Mutex<Vec<Watcher>>,
    next_listener: AtomicU64,
}

/// Synchronously readable cache of the latest value pushed by a stream.
///
/// Values are held behind `Arc`, so two reads with no `next` in between
/// return pointer-identical snapshots.
///
/// Cloning a `SnapshotStore` creates a new handle to the **same** store.
pub struct SnapshotStore<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T> Clone for SnapshotStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SnapshotStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("SnapshotStore")
            .field("current", &state.current)
            .field("version", &state.version)
            .field("failed", &state.error.is_some())
            .finish()
    }
}

impl<T: Send + Sync + 'static> SnapshotStore<T> {
    /// Create a store seeded with `initial`.
    pub fn new(initial: T) -> Self {
        Self::from_arc(Arc::new(initial))
    }

    pub(crate) fn from_arc(initial: Arc<T>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(StoreState {
                    current: initial,
                    version: 0,
                    error: None,
                }),
                listeners: RwLock::new(Vec::new()),
                watchers: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
            }),
        }
    }

    // --- Push side ---

    /// Record `value` as the current snapshot and notify listeners.
    pub fn next(&self, value: T) {
        let version = {
            let mut state = self.inner.state.write();
            state.current = Arc::new(value);
            state.version += 1;
            state.version
        };

        tracing::trace!(version, "Snapshot updated");
        self.notify(SnapshotEvent::Changed { version });
    }

    /// Record a terminal upstream error. Every subsequent read returns it.
    pub fn fail(&self, error: StreamError) {
        let version = {
            let mut state = self.inner.state.write();
            state.error = Some(error.clone());
            state.version += 1;
            state.version
        };

        tracing::debug!(version, error = %error, "Snapshot store failed");
        self.notify(SnapshotEvent::Failed {
            version,
            message: error.to_string(),
        });
    }

    /// Replace the value and clear any sticky error.
    pub(crate) fn reseed(&self, value: Arc<T>) {
        let version = {
            let mut state = self.inner.state.write();
            state.current = value;
            state.error = None;
            state.version += 1;
            state.version
        };

        tracing::debug!(version, "Snapshot store reseeded");
        self.notify(SnapshotEvent::Changed { version });
    }

    /// Clear a sticky error, keeping the current value. Returns whether an
    /// error was cleared.
    pub(crate) fn clear_error(&self) -> bool {
        let version = {
            let mut state = self.inner.state.write();
            if state.error.take().is_none() {
                return false;
            }
            state.version += 1;
            state.version
        };

        self.notify(SnapshotEvent::Changed { version });
        true
    }

    // --- Pull side ---

    /// The current snapshot, or the upstream error if the stream failed.
    pub fn get_snapshot(&self) -> Result<Arc<T>> {
        let state = self.inner.state.read();
        match &state.error {
            Some(error) => Err(BridgeError::Upstream(error.clone())),
            None => Ok(Arc::clone(&state.current)),
        }
    }

    pub fn version(&self) -> u64 {
        self.inner.state.read().version
    }

    pub fn is_failed(&self) -> bool {
        self.inner.state.read().error.is_some()
    }

    // --- Change notification ---

    /// Register a listener invoked with no payload after every change.
    ///
    /// The returned subscription removes the listener when disposed.
    pub fn subscribe<F>(&self, on_change: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = ListenerId(self.inner.next_listener.fetch_add(1, Ordering::SeqCst));
        let live = Arc::new(AtomicBool::new(true));
        self.inner.listeners.write().push(ListenerEntry {
            id,
            live: Arc::clone(&live),
            on_change: Arc::new(on_change),
        });

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            live.store(false, Ordering::SeqCst);
            if let Some(inner) = weak.upgrade() {
                inner.listeners.write().retain(|entry| entry.id != id);
            }
        })
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }

    /// Open a bounded change feed. A feed that falls `buffer_size` events
    /// behind receives `SnapshotEvent::Dropped` and is detached.
    pub fn watch(&self, buffer_size: usize) -> ChangeFeed {
        let limit = buffer_size.max(1);
        let (sender, receiver) = bounded(limit + 1);
        self.inner.watchers.lock().push(Watcher { sender, limit });
        ChangeFeed { receiver }
    }

    pub fn watcher_count(&self) -> usize {
        self.inner.watchers.lock().len()
    }

    /// Read-only handle for the rendering runtime.
    pub fn reader(&self) -> StoreReader<T> {
        StoreReader {
            store: self.clone(),
        }
    }

    /// Whether both handles refer to the same store.
    pub fn ptr_eq(&self, other: &SnapshotStore<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn notify(&self, event: SnapshotEvent) {
        self.broadcast_to_watchers(event);

        // No lock is held while listeners run; they may call back into the store.
        let listeners: Vec<ListenerEntry> = self.inner.listeners.read().clone();
        for listener in listeners {
            if listener.live.load(Ordering::SeqCst) {
                (listener.on_change)();
            }
        }
    }

    fn broadcast_to_watchers(&self, event: SnapshotEvent) {
        let mut watchers = self.inner.watchers.lock();
        if watchers.is_empty() {
            return;
        }

        watchers.retain(|watcher| {
            if watcher.sender.len() >= watcher.limit {
                tracing::warn!(limit = watcher.limit, "Dropping lagging snapshot watcher");
                let _ = watcher.sender.try_send(SnapshotEvent::Dropped);
                return false;
            }
            match watcher.sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
            }
        });
    }
}
