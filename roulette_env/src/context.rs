//! Core environment context trait for the roulette engine.

use std::time::SystemTime;

/// The central interface for environment interaction.
///
/// This trait abstracts the "real world" so that the group-formation engine
/// runs identically in production and in deterministic simulation.
///
/// # Implementations
///
/// - **Production**: `SystemContext` - wraps `SystemTime::now`, `OsRng`
/// - **Simulation**: `SimContext` (in `roulette_sim`) - virtual clock, `ChaCha8Rng(seed)`
///
/// # Determinism
///
/// Everything that would normally introduce non-determinism (wall-clock time,
/// randomness) is controlled by the implementation.
pub trait RouletteContext: Send + Sync + 'static {
    /// Returns the wall-clock time used to stamp recorded contacts.
    ///
    /// In simulation, this is derived from the virtual clock + epoch offset.
    fn system_time(&self) -> SystemTime;

    /// Returns an index drawn uniformly from `0..upper`.
    ///
    /// Callers must pass `upper >= 1`. This is the only entropy the shuffle
    /// consumes, so a seeded implementation makes every round reproducible.
    fn random_index(&self, upper: usize) -> usize;

    /// Returns the context's seed (for logging/debugging).
    ///
    /// In production, returns 0 (not seeded).
    /// In simulation, returns the master seed.
    fn seed(&self) -> u64;
}

impl<C: RouletteContext> RouletteContext for std::sync::Arc<C> {
    fn system_time(&self) -> SystemTime {
        (**self).system_time()
    }

    fn random_index(&self, upper: usize) -> usize {
        (**self).random_index(upper)
    }

    fn seed(&self) -> u64 {
        (**self).seed()
    }
}
