//! Event-emission adapter: component events pushed into a stream.

use crate::error::{BridgeError, Result};
use crate::lifecycle::{Activation, Lifecycle, MountResource, MountSlot};
use crate::stream::{Subject, SubjectView, Subscription};
use crate::types::MountEpoch;
use std::fmt;
use std::sync::{Arc, Weak};

/// What a default consumer attached at activation.
#[derive(Debug)]
pub enum ConsumerOutcome {
    /// Nothing to dispose on teardown.
    Detached,
    /// Disposed on teardown, before the subject completes.
    Subscribed(Subscription),
}

type DefaultConsumer<E> = Box<dyn Fn(SubjectView<E>) -> ConsumerOutcome + Send + Sync>;

struct EmitterMount<E> {
    subject: Subject<E>,
    consumer: Option<Subscription>,
}

impl<E: Clone + Send + Sync + 'static> MountResource for EmitterMount<E> {
    fn release(self) -> Result<()> {
        let disposed = match &self.consumer {
            Some(subscription) => subscription.dispose(),
            None => Ok(()),
        };
        // Complete even when the consumer failed to dispose, so downstream
        // observers are never left attached to a dead mount.
        self.subject.complete();
        disposed
    }
}

struct EmitterShared<E> {
    slot: MountSlot<EmitterMount<E>>,
    consumer: Option<DefaultConsumer<E>>,
}

impl<E: Clone + Send + Sync + 'static> EmitterShared<E> {
    fn emit(&self, event: E) -> bool {
        // Clone the handle out; `next` may re-enter the emitter.
        match self.slot.with_resource(|mount| mount.subject.clone()) {
            Some(subject) => {
                subject.next(event);
                true
            }
            None => {
                tracing::trace!("Dropping event emitted while not mounted");
                false
            }
        }
    }
}

/// Stable callback that pushes events into the emitter's current subject.
///
/// The same callback is handed out for the emitter's whole lifetime, across
/// re-renders and remounts, so it can be compared by identity.
pub struct EmitCallback<E> {
    inner: Arc<dyn Fn(E) -> bool + Send + Sync>,
}

impl<E> Clone for EmitCallback<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for EmitCallback<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EmitCallback")
    }
}

impl<E> EmitCallback<E> {
    /// Push an event. Returns false if no mount is active.
    pub fn emit(&self, event: E) -> bool {
        (self.inner)(event)
    }

    /// Like [`emit`](Self::emit), but reports an inactive mount as an error.
    pub fn try_emit(&self, event: E) -> Result<()> {
        if self.emit(event) {
            Ok(())
        } else {
            Err(BridgeError::NotActive)
        }
    }

    pub fn ptr_eq(&self, other: &EmitCallback<E>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Owns a multicast subject per mount and exposes a stable callback feeding it.
pub struct EventEmitter<E> {
    shared: Arc<EmitterShared<E>>,
    callback: EmitCallback<E>,
}

impl<E: Clone + Send + Sync + 'static> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone + Send + Sync + 'static> EventEmitter<E> {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Attach a consumer invoked once per activation with a read-only view of
    /// the new subject.
    pub fn with_consumer<C>(consumer: C) -> Self
    where
        C: Fn(SubjectView<E>) -> ConsumerOutcome + Send + Sync + 'static,
    {
        Self::build(Some(Box::new(consumer)))
    }

    fn build(consumer: Option<DefaultConsumer<E>>) -> Self {
        let shared = Arc::new(EmitterShared {
            slot: MountSlot::new(),
            consumer,
        });

        let weak: Weak<EmitterShared<E>> = Arc::downgrade(&shared);
        let callback = EmitCallback {
            inner: Arc::new(move |event: E| match weak.upgrade() {
                Some(shared) => shared.emit(event),
                None => false,
            }),
        };

        Self { shared, callback }
    }

    /// Create the subject and run the default consumer, unless already active.
    pub fn activate(&self) -> Result<Activation> {
        let consumer = &self.shared.consumer;
        self.shared.slot.activate(|token| {
            let subject = Subject::new();
            let consumer = match consumer {
                Some(consume) => match consume(subject.as_observable()) {
                    ConsumerOutcome::Detached => None,
                    ConsumerOutcome::Subscribed(subscription) => Some(subscription),
                },
                None => None,
            };
            tracing::debug!(
                epoch = %token.epoch(),
                consumer = consumer.is_some(),
                "Event emitter activated"
            );
            Ok(EmitterMount { subject, consumer })
        })
    }

    /// The stable emission callback.
    pub fn callback(&self) -> EmitCallback<E> {
        self.callback.clone()
    }

    pub fn emit(&self, event: E) -> bool {
        self.callback.emit(event)
    }

    /// Read-only view of the current mount's subject.
    pub fn stream(&self) -> Option<SubjectView<E>> {
        self.shared
            .slot
            .with_resource(|mount| mount.subject.as_observable())
    }

    /// Dispose the default consumer, then complete the subject.
    pub fn teardown(&self) -> Result<bool> {
        self.shared.slot.teardown()
    }

    pub fn is_active(&self) -> bool {
        self.shared.slot.is_active()
    }

    pub fn epoch(&self) -> MountEpoch {
        self.shared.slot.epoch()
    }
}

impl<E: Clone + Send + Sync + 'static> Lifecycle for EventEmitter<E> {
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
