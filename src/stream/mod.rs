//! The push-based stream seam.
//!
//! The bridge only needs three capabilities from a stream library:
//! - `Observable::subscribe(observer) -> Subscription`
//! - `Subscription::dispose()`, idempotent
//! - multicast `next`/`complete` on a subject
//!
//! Any stream type can be bridged by implementing [`Observable`]. The
//! [`Subject`] and [`BehaviorSubject`] shipped here are the multicast
//! subjects owned by the mount-scoped adapters.
//!
//! # Example
//!
//! ```ignore
//! let subject = Subject::new();
//! let sub = subject.subscribe(observer(|v: u32| println!("got {v}")));
//! subject.next(1);
//! sub.dispose()?;
//! subject.complete();
//! ```

mod subject;
mod subscription;

use crate::error::StreamError;
use std::sync::Arc;

pub use subject::{BehaviorSubject, Subject, SubjectView};
pub use subscription::Subscription;

/// Receiver of values pushed by an [`Observable`].
pub trait Observer<T>: Send + Sync {
    /// Called for every emitted value.
    fn next(&self, value: T);

    /// Terminal error. No further calls follow.
    fn error(&self, _error: StreamError) {}

    /// Terminal completion. No further calls follow.
    fn complete(&self) {}
}

/// A push-based sequence producer.
pub trait Observable<T>: Send + Sync {
    /// Attach an observer. Values may be delivered synchronously, before this
    /// call returns.
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription;
}

impl<T, O> Observable<T> for Arc<O>
where
    O: Observable<T> + ?Sized,
{
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        (**self).subscribe(observer)
    }
}

impl<T, O> Observable<T> for Box<O>
where
    O: Observable<T> + ?Sized,
{
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        (**self).subscribe(observer)
    }
}

/// Observer that only handles values.
pub struct FnObserver<N> {
    next: N,
}

impl<N> FnObserver<N> {
    pub fn new(next: N) -> Self {
        Self { next }
    }
}

impl<T, N> Observer<T> for FnObserver<N>
where
    N: Fn(T) + Send + Sync,
{
    fn next(&self, value: T) {
        (self.next)(value)
    }
}

/// Shorthand for a boxed [`FnObserver`].
pub fn observer<T, N>(next: N) -> Arc<dyn Observer<T>>
where
    T: 'static,
    N: Fn(T) + Send + Sync + 'static,
{
    Arc::new(FnObserver::new(next))
}
