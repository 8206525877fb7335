//! Core types shared across the bridge.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bridge configuration.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    /// Max buffered change events per `watch` feed before the watcher is dropped.
    /// Default: 64
    pub watch_buffer_size: usize,

    /// Reset the snapshot to the initial value when a torn-down mount is
    /// reactivated. When false the last accepted value survives the remount.
    pub reseed_on_remount: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            watch_buffer_size: 64,
            reseed_on_remount: false,
        }
    }
}

/// Activation counter for a mount slot. Bumped on every inactive-to-active
/// transition, so two resources built under different epochs never alias.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct MountEpoch(pub u64);

impl MountEpoch {
    pub fn next(self) -> Self {
        MountEpoch(self.0 + 1)
    }
}

impl fmt::Debug for MountEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Epoch({})", self.0)
    }
}

impl fmt::Display for MountEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a listener registered on a snapshot store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Point-in-time statistics for an observable bridge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeStats {
    /// Whether the mount currently owns a live subscription.
    pub active: bool,
    /// Number of activations so far.
    pub epoch: MountEpoch,
    /// Snapshot version (bumped on every accepted value).
    pub version: u64,
    /// Registered change listeners.
    pub listeners: usize,
    /// Open change feeds.
    pub watchers: usize,
    /// Whether the store is holding an upstream error.
    pub failed: bool,
}
