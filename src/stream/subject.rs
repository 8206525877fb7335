//! Multicast subjects.

use super::{Observable, Observer, Subscription};
use crate::error::StreamError;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// How a subject terminated.
#[derive(Clone)]
enum Terminal {
    Completed,
    Errored(StreamError),
}

/// One attached observer.
struct Entry<T> {
    id: u64,
    observer: Arc<dyn Observer<T>>,
    /// Cleared by the subscription's teardown. Checked before every delivery so
    /// a fan-out already in progress skips observers detached mid-loop.
    live: Arc<AtomicBool>,
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            observer: Arc::clone(&self.observer),
            live: Arc::clone(&self.live),
        }
    }
}

struct SubjectInner<T> {
    observers: RwLock<Vec<Entry<T>>>,
    terminal: RwLock<Option<Terminal>>,
    next_id: AtomicU64,
}

/// A stream that is also a sink: `next` fans out to every current observer.
///
/// Cloning a `Subject` creates a new handle to the **same** observer list.
pub struct Subject<T> {
    inner: Arc<SubjectInner<T>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("observers", &self.inner.observers.read().len())
            .field("terminated", &self.inner.terminal.read().is_some())
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> Subject<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SubjectInner {
                observers: RwLock::new(Vec::new()),
                terminal: RwLock::new(None),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Push a value to all current observers. Ignored once terminated.
    pub fn next(&self, value: T) {
        if self.is_terminated() {
            tracing::trace!("Dropping value pushed into terminated subject");
            return;
        }

        // Snapshot the list so observers can re-enter (subscribe, dispose, next).
        let observers: Vec<Entry<T>> = self.inner.observers.read().clone();
        for entry in observers {
            if entry.live.load(Ordering::SeqCst) {
                entry.observer.next(value.clone());
            }
        }
    }

    /// Terminate and detach all observers. Only the first terminal call counts.
    pub fn complete(&self) {
        self.terminate(Terminal::Completed);
    }

    /// Terminate with an error and detach all observers.
    pub fn error(&self, error: StreamError) {
        self.terminate(Terminal::Errored(error));
    }

    fn terminate(&self, terminal: Terminal) {
        {
            let mut current = self.inner.terminal.write();
            if current.is_some() {
                return;
            }
            *current = Some(terminal.clone());
        }

        let observers = std::mem::take(&mut *self.inner.observers.write());
        tracing::trace!(observers = observers.len(), "Subject terminated");

        for entry in observers {
            if !entry.live.swap(false, Ordering::SeqCst) {
                continue;
            }
            match &terminal {
                Terminal::Completed => entry.observer.complete(),
                Terminal::Errored(e) => entry.observer.error(e.clone()),
            }
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.terminal.read().is_some()
    }

    pub fn is_completed(&self) -> bool {
        matches!(*self.inner.terminal.read(), Some(Terminal::Completed))
    }

    /// Number of attached observers.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.read().len()
    }

    /// Read-only view that can subscribe but not push.
    pub fn as_observable(&self) -> SubjectView<T> {
        SubjectView::new(Arc::new(self.clone()))
    }

    /// Whether both handles refer to the same subject.
    pub fn ptr_eq(&self, other: &Subject<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> for Subject<T> {
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        let guard = self.inner.terminal.read();
        if let Some(terminal) = guard.clone() {
            drop(guard);
            match terminal {
                Terminal::Completed => observer.complete(),
                Terminal::Errored(e) => observer.error(e),
            }
            return Subscription::empty();
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let live = Arc::new(AtomicBool::new(true));
        self.inner.observers.write().push(Entry {
            id,
            observer,
            live: Arc::clone(&live),
        });
        drop(guard);

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            live.store(false, Ordering::SeqCst);
            if let Some(inner) = weak.upgrade() {
                inner.observers.write().retain(|entry| entry.id != id);
            }
        })
    }
}

/// A subject that remembers its latest value and replays it to new observers.
pub struct BehaviorSubject<T> {
    subject: Subject<T>,
    current: Arc<RwLock<T>>,
}

impl<T> Clone for BehaviorSubject<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            current: Arc::clone(&self.current),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for BehaviorSubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorSubject")
            .field("value", &*self.current.read())
            .field("subject", &self.subject)
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> BehaviorSubject<T> {
    pub fn new(initial: T) -> Self {
        Self {
            subject: Subject::new(),
            current: Arc::new(RwLock::new(initial)),
        }
    }

    /// Current value.
    pub fn value(&self) -> T {
        self.current.read().clone()
    }

    pub fn next(&self, value: T) {
        if self.subject.is_terminated() {
            return;
        }
        *self.current.write() = value.clone();
        self.subject.next(value);
    }

    pub fn complete(&self) {
        self.subject.complete();
    }

    pub fn error(&self, error: StreamError) {
        self.subject.error(error);
    }

    pub fn is_terminated(&self) -> bool {
        self.subject.is_terminated()
    }

    pub fn observer_count(&self) -> usize {
        self.subject.observer_count()
    }

    pub fn as_observable(&self) -> SubjectView<T> {
        SubjectView::new(Arc::new(self.clone()))
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> for BehaviorSubject<T> {
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        let subscription = self.subject.subscribe(Arc::clone(&observer));
        if !subscription.is_closed() {
            let value = self.current.read().clone();
            observer.next(value);
        }
        subscription
    }
}

/// Read-only stream view of a subject.
pub struct SubjectView<T> {
    source: Arc<dyn Observable<T>>,
}

impl<T> Clone for SubjectView<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<T> fmt::Debug for SubjectView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SubjectView")
    }
}

impl<T> SubjectView<T> {
    pub(crate) fn new(source: Arc<dyn Observable<T>>) -> Self {
        Self { source }
    }

    /// Whether both views were handed out by the same `as_observable` call
    /// (or clones of it).
    pub fn ptr_eq(&self, other: &SubjectView<T>) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
    }
}

impl<T> Observable<T> for SubjectView<T> {
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        self.source.subscribe(observer)
    }
}
