//! The snapshot store: sole owner of the live snapshot.
//!
//! ## Commit protocol
//!
//! 1. Take the writer lock (one transition at a time).
//! 2. Run the transition on the current snapshot, producing a new one.
//! 3. Check invariants. On violation, reject and keep the prior snapshot.
//! 4. Swap the `Arc` in, then notify observers with the committed value.
//!
//! Readers never block on transitions: `current()` clones an `Arc` under a
//! short read lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use crate::core::{check_invariants, GameSnapshot};
use crate::error::{EngineError, Result};

/// Snapshot-changed callback.
pub type Observer = Arc<dyn Fn(&Arc<GameSnapshot>) + Send + Sync>;

type ObserverList = Mutex<Vec<(u64, Observer)>>;

/// A retained committed snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checkpoint(Arc<GameSnapshot>);

impl Checkpoint {
    /// The captured snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &Arc<GameSnapshot> {
        &self.0
    }

    /// Turn the snapshot was captured on.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.0.turn
    }
}

/// Handle returned by [`SnapshotStore::subscribe`]. Dropping it removes
/// the observer.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    observers: Weak<ObserverList>,
}

impl Subscription {
    /// Stop receiving notifications.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(observers) = self.observers.upgrade() {
            observers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Owns the current snapshot and serializes writes.
pub struct SnapshotStore {
    current: RwLock<Arc<GameSnapshot>>,
    writer: Mutex<()>,
    observers: Arc<ObserverList>,
    next_observer: AtomicU64,
}

impl SnapshotStore {
    /// Create a store holding `initial`.
    ///
    /// ## Errors
    ///
    /// `InvariantViolation` if `initial` is not a valid snapshot.
    pub fn new(initial: GameSnapshot) -> Result<Self> {
        let violations = check_invariants(&initial);
        if !violations.is_empty() {
            return Err(EngineError::InvariantViolation(violations));
        }
        Ok(Self {
            current: RwLock::new(Arc::new(initial)),
            writer: Mutex::new(()),
            observers: Arc::new(Mutex::new(Vec::new())),
            next_observer: AtomicU64::new(0),
        })
    }

    /// The committed snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<GameSnapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Commit the result of `transition`.
    pub fn apply<F>(&self, transition: F) -> Result<Arc<GameSnapshot>>
    where
        F: FnOnce(&GameSnapshot) -> Result<GameSnapshot>,
    {
        self.apply_with(|snapshot| transition(snapshot).map(|next| (next, ())))
            .map(|(committed, ())| committed)
    }

    /// Commit the snapshot half of `transition`'s result and hand back the
    /// rest.
    ///
    /// Observers run while the writer lock is held and must not write to
    /// the store.
    pub fn apply_with<F, T>(&self, transition: F) -> Result<(Arc<GameSnapshot>, T)>
    where
        F: FnOnce(&GameSnapshot) -> Result<(GameSnapshot, T)>,
    {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.current();
        let (next, extra) = transition(&current)?;

        let violations = check_invariants(&next);
        if !violations.is_empty() {
            return Err(EngineError::InvariantViolation(violations));
        }

        let committed = Arc::new(next);
        self.swap(Arc::clone(&committed));
        Ok((committed, extra))
    }

    /// Register an observer, called after every commit and restore.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&Arc<GameSnapshot>) + Send + Sync + 'static,
    {
        let id = self.next_observer.fetch_add(1, Ordering::Relaxed);
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(observer)));
        Subscription {
            id,
            observers: Arc::downgrade(&self.observers),
        }
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Capture the committed snapshot.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.current())
    }

    /// Make `checkpoint` the live snapshot again, discarding every commit
    /// made since it was captured.
    pub fn restore(&self, checkpoint: &Checkpoint) -> Arc<GameSnapshot> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.swap(Arc::clone(&checkpoint.0));
        Arc::clone(&checkpoint.0)
    }

    fn swap(&self, next: Arc<GameSnapshot>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&next);

        let observers: Vec<Observer> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(&next);
        }
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("turn", &self.current().turn)
            .field("observers", &self.observer_count())
            .finish()
    }
}
