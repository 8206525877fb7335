//! Mount-scoped adapters between a component and its streams.
//!
//! - [`EventEmitter`]: stable callback pushing component events into a subject
//! - [`OwnedSubject`] / [`OwnedBehaviorSubject`]: a fresh subject per mount
//! - [`InputStream`]: render inputs as a stream, pushed only on change
//! - [`LayoutStream`]: a value built after each layout pass
//! - [`Listener`]: a side-effect subscription bound to the mount
//!
//! Every adapter completes what it owns on teardown and builds fresh
//! resources on remount.

mod emitter;
mod inputs;
mod listener;
mod subjects;

pub use emitter::{ConsumerOutcome, EmitCallback, EventEmitter};
pub use inputs::{InputStream, LayoutStream};
pub use listener::Listener;
pub use subjects::{OwnedBehaviorSubject, OwnedSubject};
