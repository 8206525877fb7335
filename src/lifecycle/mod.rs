//! Mount lifecycle management.
//!
//! A mount instance moves through:
//! - created: nothing subscribed yet
//! - active: one live subscription feeding the snapshot store
//! - torn down: subscription disposed, owned subjects completed
//!
//! A torn-down instance that becomes active again (a fake unmount followed by
//! a remount) always gets a fresh stream and subscription. The decision is
//! driven by an explicit active flag in [`MountSlot`], never by whether a
//! resource happens to be cached.

mod bridge;
mod scope;
mod slot;

pub use bridge::ObservableBridge;
pub use scope::{Lifecycle, MountScope};
pub use slot::{Activation, MountResource, MountSlot, MountToken};
