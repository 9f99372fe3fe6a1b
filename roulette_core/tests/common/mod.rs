//! Shared fixtures for the integration tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roulette_core::{participants, Group, ParticipantId};
use roulette_env::RouletteContext;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// 2024-01-01 00:00:00 UTC
pub const EPOCH_2024: u64 = 1704067200;

/// Seeded context with a frozen clock.
///
/// Mirrors the crate's unit-test context, which integration tests cannot see.
pub struct SeededContext {
    seed: u64,
    rng: Mutex<ChaCha8Rng>,
}

impl SeededContext {
    pub fn new(seed: u64) -> Self {
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

/// `n` ids of the form `p0@example.com`.
pub fn roster(n: usize) -> Vec<ParticipantId> {
    participants((0..n).map(|i| format!("p{}@example.com", i)))
}

/// How often each participant appears across the groups.
pub fn appearances(groups: &[Group]) -> HashMap<ParticipantId, usize> {
    let mut counts = HashMap::new();
    for member in groups.iter().flat_map(Group::iter) {
        *counts.entry(member.clone()).or_insert(0) += 1;
    }
    counts
}
