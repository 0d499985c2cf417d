//! Snapshot persistence.
//!
//! Snapshots are encoded with `bincode`. Decoding re-checks every
//! invariant, so a corrupted or hand-edited save is refused rather than
//! loaded.

use crate::core::{check_invariants, GameSnapshot};
use crate::error::{EngineError, Result};

/// Encode a snapshot.
pub fn encode(snapshot: &GameSnapshot) -> Result<Vec<u8>> {
    Ok(bincode::serialize(snapshot)?)
}

/// Decode and validate a snapshot.
///
/// ## Errors
///
/// - `Serialization` if `bytes` is not an encoded snapshot
/// - `InvariantViolation` if the decoded snapshot is not valid
pub fn decode(bytes: &[u8]) -> Result<GameSnapshot> {
    let snapshot: GameSnapshot = bincode::deserialize(bytes)?;
    let violations = check_invariants(&snapshot);
    if violations.is_empty() {
        Ok(snapshot)
    } else {
        Err(EngineError::InvariantViolation(violations))
    }
}
