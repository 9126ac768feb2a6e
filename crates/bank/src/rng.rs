//! RNG module - seeded question selection
//!
//! Sessions play a random subset of the bank: shuffle a copy with
//! Fisher-Yates and take the first `n`. The generator is a small LCG so a
//! seed reproduces the same selection on every platform.

use std::time::{SystemTime, UNIX_EPOCH};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Seed from the system clock (for unseeded runs).
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(1);
        Self::new((nanos ^ (nanos >> 32)) as u32)
    }

    /// Seed when given, clock otherwise.
    pub fn from_seed(seed: Option<u32>) -> Self {
        seed.map(Self::new).unwrap_or_else(Self::from_clock)
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // High bits of an LCG are far better distributed than the low ones.
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Current state, usable as a seed to replay from here.
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Uniformly pick `min(n, items.len())` items in random order.
pub fn pick_random<T: Clone>(rng: &mut SimpleRng, items: &[T], n: usize) -> Vec<T> {
    let mut copy = items.to_vec();
    rng.shuffle(&mut copy);
    copy.truncate(n.min(items.len()));
    copy
}
