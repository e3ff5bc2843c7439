//! Seeded pseudo-random streams.
//!
//! A string seed is folded into a 32-bit hash (`h = h * 31 + unit` over the UTF-16 code units,
//! wrapping), which then drives the linear-congruential step
//! `state = (state * 9301 + 49297) mod 233280`, yielding `state / 233280`.
//!
//! The modulus is taken with Euclidean remainder so that negative seed hashes still produce
//! values in `[0, 1)`. Every step is exact integer arithmetic, so any implementation that
//! follows these two formulas produces bit-identical sequences.

use rand::{Rng as _, SeedableRng as _, rngs::StdRng};

/// Fold a string seed into the 32-bit LCG start state.
pub fn hash_seed(seed: &str) -> i32 {
    seed.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    })
}

/// Deterministic stream derived from a string seed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededRng {
    state: i64,
}

impl SeededRng {
    const MULTIPLIER: i64 = 9301;
    const INCREMENT: i64 = 49_297;
    const MODULUS: i64 = 233_280;

    pub fn new(seed: &str) -> Self {
        Self {
            state: i64::from(hash_seed(seed)),
        }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * Self::MULTIPLIER + Self::INCREMENT).rem_euclid(Self::MODULUS);
        self.state as f64 / Self::MODULUS as f64
    }
}

/// Random source handed to the wave generator and template routines.
///
/// With a seed the stream is reproducible; without one it draws from OS entropy.
#[derive(Clone, Debug)]
pub enum RandomSource {
    Seeded(SeededRng),
    Entropy(StdRng),
}

impl RandomSource {
    pub fn create(seed: Option<&str>) -> Self {
        match seed {
            Some(seed) => Self::Seeded(SeededRng::new(seed)),
            None => Self::Entropy(StdRng::from_entropy()),
        }
    }

    /// Next value in `[0, 1)`. Never fails.
    pub fn next_f64(&mut self) -> f64 {
        match self {
            Self::Seeded(rng) => rng.next_f64(),
            Self::Entropy(rng) => rng.r#gen::<f64>(),
        }
    }

    pub fn is_deterministic(&self) -> bool {
        matches!(self, Self::Seeded(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/rng.rs"]
mod tests;
