//! Mount-scoped side-effect subscription.

use crate::error::Result;
use crate::lifecycle::{Activation, Lifecycle, MountSlot};
use crate::stream::Subscription;

/// Runs a subscription maker once per activation and disposes the result on
/// teardown. For wiring that only has side effects and feeds no snapshot.
pub struct Listener<F> {
    maker: F,
    slot: MountSlot<Subscription>,
}

impl<F> Listener<F>
where
    F: Fn() -> Subscription + Send + Sync,
{
    pub fn new(maker: F) -> Self {
        Self {
            maker,
            slot: MountSlot::new(),
        }
    }

    pub fn activate(&self) -> Result<Activation> {
        self.slot.activate(|_| Ok((self.maker)()))
    }

    pub fn teardown(&self) -> Result<bool> {
        self.slot.teardown()
    }

    pub fn is_active(&self) -> bool {
        self.slot.is_active()
    }
}

impl<F> Lifecycle for Listener<F>
where
    F: Fn() -> Subscription + Send + Sync,
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
