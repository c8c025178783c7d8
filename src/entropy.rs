//! Entropy source for the evaluator's randomness opcode: a non-deterministic
//! default and a seeded, deterministic alternative for reproducible runs.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Supplies bytes of randomness on demand. No cryptographic quality is
/// mandated; callers pick the implementation that suits them.
pub trait EntropySource {
    fn fill(&mut self, n: usize) -> Vec<u8>;
}

/// Non-deterministic entropy backed by the system RNG. The default for the
/// CLI when no `--seed` is given.
pub struct OsEntropy {
    rng: rand::rngs::ThreadRng,
}

impl Default for OsEntropy {
    fn default() -> Self {
        Self { rng: rand::rng() }
    }
}

impl EntropySource for OsEntropy {
    fn fill(&mut self, n: usize) -> Vec<u8> {
        let mut buf = vec![0u8; n];
        self.rng.fill_bytes(&mut buf);
        buf
    }
}

/// Deterministic entropy for tests and for the CLI's `--seed` flag.
pub struct SeededEntropy {
    rng: ChaCha20Rng,
}

impl SeededEntropy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl EntropySource for SeededEntropy {
    fn fill(&mut self, n: usize) -> Vec<u8> {
        let mut buf = vec![0u8; n];
        self.rng.fill_bytes(&mut buf);
        buf
    }
}
