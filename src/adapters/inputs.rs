//! Streams fed by the component itself: render inputs and post-layout values.

use crate::error::Result;
use crate::lifecycle::{Activation, Lifecycle, MountResource, MountSlot};
use crate::stream::{BehaviorSubject, Subject, SubjectView};
use parking_lot::Mutex;

struct InputMount<T> {
    subject: BehaviorSubject<T>,
    /// Handed out for the whole mount so consumers see one identity.
    view: SubjectView<T>,
}

impl<T: Clone + Send + Sync + 'static> MountResource for InputMount<T> {
    fn release(self) -> Result<()> {
        self.subject.complete();
        Ok(())
    }
}

/// Turns a component's render inputs into a stream.
///
/// Each activation replays the latest inputs to new observers. `update`
/// pushes only when the inputs differ from the previous ones.
pub struct InputStream<T> {
    latest: Mutex<T>,
    slot: MountSlot<InputMount<T>>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> InputStream<T> {
    pub fn new(inputs: T) -> Self {
        Self {
            latest: Mutex::new(inputs),
            slot: MountSlot::new(),
        }
    }

    pub fn activate(&self) -> Result<Activation> {
        let seed = self.latest.lock().clone();
        self.slot.activate(|_| {
            let subject = BehaviorSubject::new(seed);
            let view = subject.as_observable();
            Ok(InputMount { subject, view })
        })
    }

    /// Record this render's inputs. Returns true if they changed.
    ///
    /// Changed inputs are pushed to the live subject, or kept as the seed for
    /// the next activation when nothing is mounted.
    pub fn update(&self, inputs: T) -> bool {
        {
            let mut latest = self.latest.lock();
            if *latest == inputs {
                return false;
            }
            *latest = inputs.clone();
        }

        if let Some(subject) = self.slot.with_resource(|mount| mount.subject.clone()) {
            subject.next(inputs);
        }
        true
    }

    /// The latest inputs seen.
    pub fn current(&self) -> T {
        self.latest.lock().clone()
    }

    /// Stable read-only stream for the current mount.
    pub fn stream(&self) -> Option<SubjectView<T>> {
        self.slot.with_resource(|mount| mount.view.clone())
    }

    pub fn teardown(&self) -> Result<bool> {
        self.slot.teardown()
    }

    pub fn is_active(&self) -> bool {
        self.slot.is_active()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Lifecycle for InputStream<T> {
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

/// Emits a freshly built value after every layout pass of a mounted component.
pub struct LayoutStream<T> {
    slot: MountSlot<Subject<T>>,
}

impl<T: Clone + Send + Sync + 'static> Default for LayoutStream<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> LayoutStream<T> {
    pub fn new() -> Self {
        Self {
            slot: MountSlot::new(),
        }
    }

    pub fn activate(&self) -> Result<Activation> {
        self.slot.activate(|_| Ok(Subject::new()))
    }

    /// Call after each layout pass. `build` only runs while mounted.
    pub fn after_layout<B>(&self, build: B) -> bool
    where
        B: FnOnce() -> T,
    {
        match self.slot.with_resource(Subject::clone) {
            Some(subject) => {
                subject.next(build());
                true
            }
            None => false,
        }
    }

    pub fn stream(&self) -> Option<SubjectView<T>> {
        self.slot.with_resource(|subject| subject.as_observable())
    }

    pub fn teardown(&self) -> Result<bool> {
        self.slot.teardown()
    }

    pub fn is_active(&self) -> bool {
        self.slot.is_active()
    }
}

impl<T: Clone + Send + Sync + 'static> Lifecycle for LayoutStream<T> {
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
