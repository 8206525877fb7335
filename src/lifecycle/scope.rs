//! Grouping of mount-scoped adapters into one component instance.

use crate::error::Result;
use std::sync::Arc;

/// Anything whose resources are bound to a mount instance.
pub trait Lifecycle: Send + Sync {
    /// Acquire resources. A no-op while already mounted.
    fn mount(&self) -> Result<()>;

    /// Release resources. A no-op while not mounted.
    fn unmount(&self) -> Result<()>;

    fn is_mounted(&self) -> bool;
}

/// The adapters owned by one component instance.
///
/// Members mount in registration order and unmount in reverse order.
#[derive(Default)]
pub struct MountScope {
    members: Vec<Arc<dyn Lifecycle>>,
}

impl MountScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a member. Returns the same handle for convenience.
    pub fn add<L: Lifecycle + 'static>(&mut self, member: Arc<L>) -> Arc<L> {
        self.members.push(Arc::clone(&member) as Arc<dyn Lifecycle>);
        member
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Lifecycle for MountScope {
    /// Mount every member. If one fails, the members mounted by this call are
    /// unmounted again and the error is returned.
    fn mount(&self) -> Result<()> {
        let mut mounted: Vec<Arc<dyn Lifecycle>> = Vec::new();
        for member in &self.members {
            if member.is_mounted() {
                continue;
            }
            if let Err(e) = member.mount() {
                for done in mounted.iter().rev() {
                    if let Err(rollback) = done.unmount() {
                        tracing::warn!(error = %rollback, "Rollback unmount failed");
                    }
                }
                return Err(e);
            }
            mounted.push(Arc::clone(member));
        }
        Ok(())
    }

    /// Unmount every member in reverse order. Keeps going past failures and
    /// returns the first one.
    fn unmount(&self) -> Result<()> {
        let mut first_error = None;
        for member in self.members.iter().rev() {
            if let Err(e) = member.unmount() {
                tracing::warn!(error = %e, "Unmount failed");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn is_mounted(&self) -> bool {
        !self.members.is_empty() && self.members.iter().all(|m| m.is_mounted())
    }
}
