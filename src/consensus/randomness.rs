//! Injected randomness for oracle index assignment and request dispatch.
//!
//! The assignment algorithm only needs uniform draws below a bound, so any
//! entropy mechanism can sit behind [`RandomnessSource`]: a seeded ChaCha
//! stream for tests and simulations, the OS generator in production.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_core::RngCore;

pub trait RandomnessSource: Send {
    /// Uniform value in `[0, bound)`. `bound` must be positive.
    fn next_below(&mut self, bound: u32) -> u32;
}

/// Adapter from any `rand` generator
#[derive(Debug, Clone)]
pub struct RngRandomness<R> {
    rng: R,
}

impl<R: RngCore> RngRandomness<R> {
    pub fn new(rng: R) -> Self {
        RngRandomness { rng }
    }
}

impl RngRandomness<ChaCha20Rng> {
    /// Deterministic stream, reproducible across runs
    pub fn seeded(seed: u64) -> Self {
        RngRandomness::new(ChaCha20Rng::seed_from_u64(seed))
    }
}

impl RngRandomness<StdRng> {
    pub fn from_entropy() -> Self {
        RngRandomness::new(StdRng::from_entropy())
    }
}

impl<R: RngCore + Send> RandomnessSource for RngRandomness<R> {
    fn next_below(&mut self, bound: u32) -> u32 {
        self.rng.gen_range(0..bound)
    }
}

/// Draws `count` distinct values uniformly from `[0, range)` with a partial
/// Fisher-Yates shuffle. Requires `count <= range`.
pub fn sample_distinct(source: &mut dyn RandomnessSource, range: u8, count: usize) -> Vec<u8> {
    let mut pool: Vec<u8> = (0..range).collect();
    let count = count.min(pool.len());
    for i in 0..count {
        let remaining = (pool.len() - i) as u32;
        let j = i + source.next_below(remaining) as usize;
        pool.swap(i, j);
    }
    pool.truncate(count);
    pool
}
