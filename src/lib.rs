//! # Stream Bridge
//!
//! Mount-scoped adapters that let a component tree read values from
//! push-based streams synchronously, and push its own events back out.
//!
//! ## Core Concepts
//!
//! - **Snapshot Store**: latest value of a stream, readable at any time, with
//!   change listeners for the rendering runtime
//! - **Observable Bridge**: owns the one live upstream subscription of a mount
//!   and feeds the store from it
//! - **Event Emitter**: stable callback that pushes component events into a
//!   mount-owned multicast subject
//! - **Mount Slot**: explicit active flag and epoch deciding when fresh
//!   resources are needed (first mount, or remount after a fake unmount)
//!
//! ## Example
//!
//! ```ignore
//! use streambridge::{ObservableBridge, Subject};
//!
//! let ticks: Subject<u64> = Subject::new();
//! let source = ticks.clone();
//! let bridge = ObservableBridge::new(move || Ok(source.clone()), 0);
//!
//! // Render
//! let listener = bridge.store().subscribe(|| schedule_render());
//! assert_eq!(*bridge.read()?, 0);
//!
//! ticks.next(1);
//! assert_eq!(*bridge.read()?, 1);
//!
//! // Unmount
//! bridge.teardown()?;
//! listener.dispose()?;
//! ```

pub mod adapters;
pub mod error;
pub mod lifecycle;
pub mod snapshot;
pub mod stream;
pub mod types;

// Re-exports
pub use adapters::{
    ConsumerOutcome, EmitCallback, EventEmitter, InputStream, LayoutStream, Listener,
    OwnedBehaviorSubject, OwnedSubject,
};
pub use error::{BridgeError, Result, StreamError};
pub use lifecycle::{
    Activation, Lifecycle, MountResource, MountScope, MountSlot, MountToken, ObservableBridge,
};
pub use snapshot::{ChangeFeed, SnapshotEvent, SnapshotStore, StoreReader};
pub use stream::{
    observer, BehaviorSubject, FnObserver, Observable, Observer, Subject, SubjectView,
    Subscription,
};
pub use types::*;
