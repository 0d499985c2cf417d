//! Snapshot ownership, checkpoints and persistence.

mod snapshot_store;
pub mod persist;

pub use snapshot_store::{Checkpoint, Observer, SnapshotStore, Subscription};
