//! Snapshot store for pull-based consumers.
//!
//! The store follows the pull-with-push-invalidation contract a rendering
//! runtime expects:
//! - `subscribe(on_change)` to learn that something changed
//! - `get_snapshot()` to read the current value synchronously
//!
//! Only the bridge writes to a store. The runtime gets a [`StoreReader`].
//!
//! Reads are referentially stable between changes. An upstream error is kept
//! and re-raised from `get_snapshot()` so it reaches the reader instead of
//! dying inside a callback.
//!
//! # Example
//!
//! ```ignore
//! let store = SnapshotStore::new(0);
//! let listener = store.subscribe(|| println!("changed"));
//! store.next(1);
//! assert_eq!(*store.get_snapshot()?, 1);
//! listener.dispose()?;
//! ```

mod feed;
mod reader;
mod store;

pub use feed::{ChangeFeed, SnapshotEvent};
pub use reader::StoreReader;
pub use store::SnapshotStore;
