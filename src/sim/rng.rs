//! Seed-string keyed deterministic RNG
//!
//! The host hands the engine an opaque seed string; every instance built from
//! the same string must produce the same stream on every platform. We hash
//! the string with FNV-1a (no host randomness, no platform-dependent hashing)
//! and feed the digest to a PCG stream.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Deterministic random stream for one round.
///
/// Draw order is part of the simulation contract: two draws per spawned ball
/// (spawn offset, then spawn velocity), then opportunistic draws from the
/// rolling-ball nudge. The stream is unbounded and is never reseeded
/// mid-round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeededRng {
    seed: u64,
    rng: Pcg32,
}

impl SeededRng {
    /// Build a stream from an opaque seed string.
    ///
    /// Any string is valid, including the empty string (a low-entropy but
    /// perfectly deterministic stream).
    pub fn new(seed: &str) -> Self {
        let seed = fnv1a(seed.as_bytes());
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// The hashed seed this stream was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// FNV-1a 64-bit. Stable across platforms, good enough dispersion for
/// short human-entered seed strings.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
