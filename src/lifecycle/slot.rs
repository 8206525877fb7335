//! Mount-scoped ownership slot.

use crate::error::Result;
use crate::stream::Subscription;
use crate::types::MountEpoch;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A resource owned by one mount instance and released on teardown.
pub trait MountResource: Send {
    /// Release everything the resource holds. Called at most once.
    fn release(self) -> Result<()>;
}

impl MountResource for Subscription {
    fn release(self) -> Result<()> {
        self.dispose()
    }
}

/// Outcome of [`MountSlot::activate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    /// A fresh resource was built for this epoch.
    Fresh(MountEpoch),
    /// The slot was already active; nothing was built.
    AlreadyActive(MountEpoch),
    /// The slot was torn down while the resource was being built. The new
    /// resource has already been released.
    Superseded(MountEpoch),
}

impl Activation {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Activation::Fresh(_))
    }

    pub fn epoch(&self) -> MountEpoch {
        match self {
            Activation::Fresh(e) | Activation::AlreadyActive(e) | Activation::Superseded(e) => *e,
        }
    }
}

/// Liveness token for one activation.
///
/// Revoked by the slot the moment the mount is torn down, including a
/// teardown that lands while the resource is still being built. Callbacks
/// created during the build check it before touching shared state.
#[derive(Clone, Debug)]
pub struct MountToken {
    epoch: MountEpoch,
    live: Arc<AtomicBool>,
}

impl MountToken {
    fn new(epoch: MountEpoch) -> Self {
        Self {
            epoch,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn epoch(&self) -> MountEpoch {
        self.epoch
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn revoke(&self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

struct SlotState<R> {
    /// Decides whether a fresh resource is required. Presence of `resource`
    /// does not, since a build can be in flight with no resource stored yet.
    active: bool,
    epoch: MountEpoch,
    token: Option<MountToken>,
    resource: Option<R>,
}

/// Holds at most one resource for the current mount instance.
///
/// State machine: inactive -> (activate) -> active -> (teardown) -> inactive.
/// Every activation bumps the epoch and builds a new resource; a torn-down
/// resource is never reused.
pub struct MountSlot<R> {
    state: Mutex<SlotState<R>>,
}

impl<R: MountResource> Default for MountSlot<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: MountResource> MountSlot<R> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                active: false,
                epoch: MountEpoch::default(),
                token: None,
                resource: None,
            }),
        }
    }

    /// Activate the slot if it is inactive.
    ///
    /// `build` runs without the slot lock held, so it may emit synchronously
    /// into code that reads or tears down this slot. A failed build leaves the
    /// slot inactive and propagates the error. The token handed to `build` is
    /// revoked on teardown.
    pub fn activate<F>(&self, build: F) -> Result<Activation>
    where
        F: FnOnce(&MountToken) -> Result<R>,
    {
        let token = {
            let mut state = self.state.lock();
            if state.active {
                return Ok(Activation::AlreadyActive(state.epoch));
            }
            state.active = true;
            state.epoch = state.epoch.next();
            let token = MountToken::new(state.epoch);
            state.token = Some(token.clone());
            token
        };
        let epoch = token.epoch();

        match build(&token) {
            Ok(resource) => {
                let mut state = self.state.lock();
                if state.active && state.epoch == epoch {
                    state.resource = Some(resource);
                    tracing::debug!(epoch = %epoch, "Mount activated");
                    Ok(Activation::Fresh(epoch))
                } else {
                    drop(state);
                    tracing::debug!(epoch = %epoch, "Mount torn down during activation");
                    resource.release()?;
                    Ok(Activation::Superseded(epoch))
                }
            }
            Err(e) => {
                token.revoke();
                let mut state = self.state.lock();
                if state.epoch == epoch {
                    state.active = false;
                    state.token = None;
                }
                tracing::debug!(epoch = %epoch, error = %e, "Mount activation failed");
                Err(e)
            }
        }
    }

    /// Deactivate and release the resource. Returns false if already inactive.
    pub fn teardown(&self) -> Result<bool> {
        let (epoch, resource) = {
            let mut state = self.state.lock();
            if !state.active {
                return Ok(false);
            }
            state.active = false;
            if let Some(token) = state.token.take() {
                token.revoke();
            }
            (state.epoch, state.resource.take())
        };

        tracing::debug!(epoch = %epoch, "Mount torn down");
        if let Some(resource) = resource {
            resource.release()?;
        }
        Ok(true)
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().active
    }

    pub fn epoch(&self) -> MountEpoch {
        self.state.lock().epoch
    }

    /// Run `f` against the live resource. `f` runs under the slot lock and
    /// must not call back into this slot; clone handles out instead.
    pub fn with_resource<U>(&self, f: impl FnOnce(&R) -> U) -> Option<U> {
        let state = self.state.lock();
        state.resource.as_ref().map(f)
    }
}
