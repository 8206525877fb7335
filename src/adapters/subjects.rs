//! Mount-scoped subjects: one fresh subject per activation, completed on
//! teardown.

use crate::error::Result;
use crate::lifecycle::{Activation, Lifecycle, MountResource, MountSlot};
use crate::stream::{BehaviorSubject, Subject};
use crate::types::MountEpoch;

impl<T: Clone + Send + Sync + 'static> MountResource for Subject<T> {
    fn release(self) -> Result<()> {
        self.complete();
        Ok(())
    }
}

impl<T: Clone + Send + Sync + 'static> MountResource for BehaviorSubject<T> {
    fn release(self) -> Result<()> {
        self.complete();
        Ok(())
    }
}

/// A plain multicast subject owned by one mount instance.
pub struct OwnedSubject<T> {
    slot: MountSlot<Subject<T>>,
}

impl<T: Clone + Send + Sync + 'static> Default for OwnedSubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> OwnedSubject<T> {
    pub fn new() -> Self {
        Self {
            slot: MountSlot::new(),
        }
    }

    pub fn activate(&self) -> Result<Activation> {
        self.slot.activate(|_| Ok(Subject::new()))
    }

    /// Handle to the current mount's subject.
    pub fn subject(&self) -> Option<Subject<T>> {
        self.slot.with_resource(Subject::clone)
    }

    /// Push into the current subject. Returns false if not mounted.
    pub fn next(&self, value: T) -> bool {
        match self.subject() {
            Some(subject) => {
                subject.next(value);
                true
            }
            None => false,
        }
    }

    pub fn teardown(&self) -> Result<bool> {
        self.slot.teardown()
    }

    pub fn is_active(&self) -> bool {
        self.slot.is_active()
    }

    pub fn epoch(&self) -> MountEpoch {
        self.slot.epoch()
    }
}

impl<T: Clone + Send + Sync + 'static> Lifecycle for OwnedSubject<T> {
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

/// A behavior subject owned by one mount instance, seeded from `initial` on
/// every activation.
pub struct OwnedBehaviorSubject<T> {
    initial: T,
    slot: MountSlot<BehaviorSubject<T>>,
}

impl<T: Clone + Send + Sync + 'static> OwnedBehaviorSubject<T> {
    pub fn new(initial: T) -> Self {
        Self {
            initial,
            slot: MountSlot::new(),
        }
    }

    pub fn activate(&self) -> Result<Activation> {
        self.slot.activate(|_| Ok(BehaviorSubject::new(self.initial.clone())))
    }

    pub fn subject(&self) -> Option<BehaviorSubject<T>> {
        self.slot.with_resource(BehaviorSubject::clone)
    }

    /// Current value of the live subject.
    pub fn value(&self) -> Option<T> {
        self.slot.with_resource(|subject| subject.value())
    }

    pub fn next(&self, value: T) -> bool {
        match self.subject() {
            Some(subject) => {
                subject.next(value);
                true
            }
            None => false,
        }
    }

    pub fn teardown(&self) -> Result<bool> {
        self.slot.teardown()
    }

    pub fn is_active(&self) -> bool {
        self.slot.is_active()
    }
}

impl<T: Clone + Send + Sync + 'static> Lifecycle for OwnedBehaviorSubject<T> {
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
