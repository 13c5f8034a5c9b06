//! Deterministic dice randomness.
//!
//! Rolls are resolved from a seed rather than ambient entropy so that the same
//! formula, seed and generator always produce the same faces. Replays and
//! tests rely on this.

/// Source of die faces.
///
/// Implementations must be deterministic: the same seed yields the same value.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a die with N sides (1-N inclusive).
    fn roll_die(&self, seed: u64, faces: u32) -> u32 {
        if faces == 0 {
            return 0;
        }
        (self.next_u32(seed) % faces) + 1
    }
}

/// PCG-XSH-RR generator: 64-bit state, 32-bit output.
///
/// Stateless per call; every die is rolled from its own mixed seed
/// (see [`compute_seed`]).
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    /// `state' = state * multiplier + increment (mod 2^64)`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Mixes a roll seed with the position of one die inside the formula.
///
/// * `roll_seed` - seed of the whole roll
/// * `term` - index of the dice term within the formula
/// * `die` - index of the die within the term
pub fn compute_seed(roll_seed: u64, term: u32, die: u32) -> u64 {
    // SplitMix64 / FxHash style mixing constants
    let mut hash = roll_seed;
    hash ^= (u64::from(term) + 1).wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (u64::from(die) + 1).wrapping_mul(0x517cc1b727220a95);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcg_is_deterministic() {
        let rng = PcgRng;
        assert_eq!(rng.next_u32(42), rng.next_u32(42));
    }

    #[test]
    fn roll_die_stays_in_bounds() {
        let rng = PcgRng;
        for seed in 0..500 {
            let face = rng.roll_die(compute_seed(seed, 0, 0), 6);
            assert!((1..=6).contains(&face));
        }
        assert_eq!(rng.roll_die(7, 0), 0);
    }

    #[test]
    fn seeds_differ_per_die() {
        assert_ne!(compute_seed(1, 0, 0), compute_seed(1, 0, 1));
        assert_ne!(compute_seed(1, 0, 0), compute_seed(1, 1, 0));
    }
}
