//! Simulation context implementing RouletteContext for deterministic testing.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roulette_env::RouletteContext;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Simulation context backed by deterministic time and RNG.
///
/// This implements `RouletteContext` using:
/// - A virtual clock that can be advanced manually
/// - A seeded ChaCha8 RNG for deterministic shuffles
pub struct SimContext {
    /// Master seed for this simulation
    seed: u64,

    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<Mutex<u64>>,

    /// Deterministic RNG for shuffles
    rng: Arc<Mutex<ChaCha8Rng>>,

    /// Epoch offset (virtual time 0 maps to this wall-clock time)
    epoch: SystemTime,
}

impl SimContext {
    /// Creates a new SimContext with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            virtual_time_ns: Arc::new(Mutex::new(0)),
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
            epoch: UNIX_EPOCH + Duration::from_secs(1704067200), // 2024-01-01 00:00:00 UTC
        }
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        let mut time = self
            .virtual_time_ns
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *time += duration.as_nanos() as u64;
    }

    /// Returns virtual time elapsed since the simulation started.
    pub fn now(&self) -> Duration {
        Duration::from_nanos(
            *self
                .virtual_time_ns
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

impl Clone for SimContext {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed,
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
            rng: Arc::clone(&self.rng),
            epoch: self.epoch,
        }
    }
}

impl RouletteContext for SimContext {
    fn system_time(&self) -> SystemTime {
        self.epoch + self.now()
    }

    fn random_index(&self, upper: usize) -> usize {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(0..upper)
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}
