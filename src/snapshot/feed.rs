//! Change feed types for snapshot watchers.

use serde::{Deserialize, Serialize};

/// Events delivered to a [`ChangeFeed`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SnapshotEvent {
    /// A new value was accepted.
    Changed { version: u64 },

    /// The upstream stream failed; reads now return the error.
    Failed { version: u64, message: String },

    /// The feed fell too far behind and was detached. Nothing follows.
    Dropped,
}

/// Receiving end of a snapshot store's change feed.
pub struct ChangeFeed {
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<SnapshotEvent>,
}

impl ChangeFeed {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<SnapshotEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<SnapshotEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<SnapshotEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}
