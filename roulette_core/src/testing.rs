//! Deterministic contexts shared by the unit tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roulette_env::RouletteContext;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// 2024-01-01 00:00:00 UTC
pub(crate) const EPOCH_2024: u64 = 1704067200;

/// Seeded context with a frozen clock.
pub(crate) struct SeededContext {
    seed: u64,
    rng: Mutex<ChaCha8Rng>,
}

impl SeededContext {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl RouletteContext for SeededContext {
    fn system_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(EPOCH_2024)
    }

    fn random_index(&self, upper: usize) -> usize {
        self.rng.lock().unwrap().gen_range(0..upper)
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

/// Context whose shuffle is the identity permutation.
///
/// Fisher-Yates swaps position `i` with `random_index(i + 1)`; always
/// answering `upper - 1` swaps every element with itself.
pub(crate) struct IdentityContext;

impl RouletteContext for IdentityContext {
    fn system_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(EPOCH_2024)
    }

    fn random_index(&self, upper: usize) -> usize {
        upper - 1
    }

    fn seed(&self) -> u64 {
        0
    }
}
