//! Deterministic dice and shuffling.
//!
//! ## Key Features
//!
//! - **Deterministic**: same seed produces the same rolls
//! - **Snapshot-resident**: the generator position lives in the snapshot as
//!   a [`GameRngState`], so restoring a checkpoint also rewinds the dice
//! - **Separate streams**: deck shuffling draws from a derived stream and
//!   never shifts the dice sequence
//!
//! ```
//! use rust_board::core::GameRng;
//!
//! let mut a = GameRng::new(7);
//! let mut b = GameRng::from_state(&a.state());
//! assert_eq!(a.roll_die(6), b.roll_die(6));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Golden-ratio increment used to separate derived streams.
const STREAM_STEP: u64 = 0x9E37_79B9_7F4A_7C15;

/// Deterministic RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// An independent stream derived from this RNG's seed.
    ///
    /// The same `stream` always yields the same sequence for the same seed,
    /// regardless of how far this RNG has advanced.
    #[must_use]
    pub fn derive(&self, stream: u64) -> Self {
        Self::new(self.seed ^ stream.wrapping_add(1).wrapping_mul(STREAM_STEP))
    }

    /// Roll a die with `sides` faces, returning 1..=sides.
    pub fn roll_die(&mut self, sides: u8) -> u8 {
        self.inner.gen_range(1..=sides.max(1))
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG position.
///
/// Uses the ChaCha8 word position, so capture and restore are O(1)
/// regardless of how many rolls have been made.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed.
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter).
    pub word_pos: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.roll_die(6), rng2.roll_die(6));
        }
    }

    #[test]
    fn test_roll_range() {
        let mut rng = GameRng::new(3);
        for _ in 0..500 {
            let roll = rng.roll_die(6);
            assert!((1..=6).contains(&roll));
        }
    }

    #[test]
    fn test_derived_stream_is_independent() {
        let mut rng = GameRng::new(42);
        let before: Vec<u8> = {
            let mut deck_rng = rng.derive(0);
            (0..10).map(|_| deck_rng.roll_die(100)).collect()
        };

        for _ in 0..25 {
            rng.roll_die(6);
        }

        let mut deck_rng = rng.derive(0);
        let after: Vec<u8> = (0..10).map(|_| deck_rng.roll_die(100)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_state_restores_sequence() {
        let mut rng = GameRng::new(42);
        for _ in 0..17 {
            rng.roll_die(6);
        }

        let state = rng.state();
        let expected: Vec<_> = (0..10).map(|_| rng.roll_die(6)).collect();

        let mut restored = GameRng::from_state(&state);
        let actual: Vec<_> = (0..10).map(|_| restored.roll_die(6)).collect();
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut rng = GameRng::new(42);
        let mut data: Vec<u32> = (1..=10).collect();
        rng.shuffle(&mut data);
        data.sort_unstable();
        assert_eq!(data, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_state_serde() {
        let state = GameRngState {
            seed: 42,
            word_pos: 12345,
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: GameRngState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
