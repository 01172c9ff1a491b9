//! Deterministic pseudo-random number generator.
//!
//! A small, self-contained PRNG (splitmix64) with no external dependencies.
//! Given the same seed, the generated sequence is always identical, which is
//! what makes randomly scheduled runs replayable bit-for-bit: fix the seed,
//! replay the run.
//!
//! Not cryptographically secure, and not meant to be.

/// A deterministic pseudo-random number generator using splitmix64.
#[derive(Debug, Clone)]
pub struct DetRng {
    state: u64,
}

impl DetRng {
    /// Creates a new PRNG from the given seed.
    ///
    /// Any seed is valid, including zero; splitmix64 has no degenerate
    /// states.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generates the next pseudo-random `u64`.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Draws a uniformly distributed index in `[0, len)`.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero.
    #[allow(clippy::cast_possible_truncation)]
    pub fn pick_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "pick_index requires a non-empty range");
        (self.next_u64() % len as u64) as usize
    }
}
