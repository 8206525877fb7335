//! Read-only view of a snapshot store.

use super::feed::ChangeFeed;
use super::store::SnapshotStore;
use crate::error::Result;
use crate::stream::Subscription;
use std::fmt;
use std::sync::Arc;

/// The side of a [`SnapshotStore`] handed to the rendering runtime.
///
/// Reads and change notification only. Values reach the store through the
/// bridge's upstream subscription, never through a reader.
pub struct StoreReader<T> {
    pub(super) store: SnapshotStore<T>,
}

impl<T> Clone for StoreReader<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StoreReader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StoreReader").field(&self.store).finish()
    }
}

impl<T: Send + Sync + 'static> StoreReader<T> {
    pub fn get_snapshot(&self) -> Result<Arc<T>> {
        self.store.get_snapshot()
    }

    pub fn subscribe<F>(&self, on_change: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.store.subscribe(on_change)
    }

    pub fn version(&self) -> u64 {
        self.store.version()
    }

    pub fn is_failed(&self) -> bool {
        self.store.is_failed()
    }

    pub fn listener_count(&self) -> usize {
        self.store.listener_count()
    }

    pub fn watch(&self, buffer_size: usize) -> ChangeFeed {
        self.store.watch(buffer_size)
    }

    pub fn watcher_count(&self) -> usize {
        self.store.watcher_count()
    }

    /// Whether both readers view the same store.
    pub fn ptr_eq(&self, other: &StoreReader<T>) -> bool {
        self.store.ptr_eq(&other.store)
    }
}
