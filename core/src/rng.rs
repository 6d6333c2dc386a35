//! Seeded random number generation for synthesized record attributes.
//!
//! RULE: The record builder never calls a platform RNG directly.
//! All randomness flows through SynthRng instances handed out by an
//! RngBank, so a fixed master seed makes every build reproducible.
//!
//! Each dataset build gets its own stream, seeded from
//! (master_seed XOR build_number * golden ratio). This means:
//!   - Successive rebuilds draw different attributes for the same rows.
//!   - Any single build can be replayed in isolation from its number.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A deterministic RNG stream for a single dataset build.
pub struct SynthRng {
    inner: Pcg64Mcg,
}

impl SynthRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Uniform draw from a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let index = self.next_u64_below(items.len() as u64) as usize;
        &items[index]
    }

    /// One IPv4 octet in [0, 255].
    pub fn octet(&mut self) -> u8 {
        self.next_u64_below(256) as u8
    }
}

/// Hands out one SynthRng per dataset build.
#[derive(Debug, Clone, Copy)]
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    /// Bank with a master seed drawn from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_build(&self, build_number: u64) -> SynthRng {
        let derived_seed =
            self.master_seed ^ build_number.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        SynthRng::new(derived_seed)
    }
}
