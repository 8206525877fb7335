//! Disposable subscription handles.

use crate::error::{BridgeError, Result, StreamError};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Teardown = Box<dyn FnOnce() -> std::result::Result<(), StreamError> + Send>;

struct SubscriptionInner {
    closed: AtomicBool,
    teardown: Mutex<Option<Teardown>>,
}

/// Handle representing one observer's attachment to a stream.
///
/// Clones share the same attachment. Dropping a handle does not dispose it.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
}

impl Subscription {
    /// Subscription whose teardown cannot fail.
    pub fn new<F>(teardown: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::fallible(move || {
            teardown();
            Ok(())
        })
    }

    /// Subscription whose teardown may report an error.
    pub fn fallible<F>(teardown: F) -> Self
    where
        F: FnOnce() -> std::result::Result<(), StreamError> + Send + 'static,
    {
        Self {
            inner: Arc::new(SubscriptionInner {
                closed: AtomicBool::new(false),
                teardown: Mutex::new(Some(Box::new(teardown))),
            }),
        }
    }

    /// An already-closed subscription.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(SubscriptionInner {
                closed: AtomicBool::new(true),
                teardown: Mutex::new(None),
            }),
        }
    }

    /// Run the teardown. Only the first call does anything.
    pub fn dispose(&self) -> Result<()> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        // Take the closure out before running it so a reentrant dispose
        // never sees the lock held.
        let teardown = self.inner.teardown.lock().take();
        if let Some(teardown) = teardown {
            teardown().map_err(BridgeError::Disposal)?;
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Whether both handles refer to the same attachment.
    pub fn ptr_eq(&self, other: &Subscription) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}
