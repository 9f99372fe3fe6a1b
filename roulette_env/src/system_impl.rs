//! Production implementation of RouletteContext using the OS.

use crate::RouletteContext;
use rand::rngs::OsRng;
use rand::Rng;
use std::sync::Arc;
use std::time::SystemTime;

/// Production context backed by the system clock and OS entropy.
///
/// This is the "real" implementation used outside of tests and simulation.
/// Shuffles drawn through it are not reproducible.
pub struct SystemContext;

impl SystemContext {
    /// Creates a new SystemContext.
    pub fn new() -> Self {
        Self
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for SystemContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RouletteContext for SystemContext {
    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }

    fn random_index(&self, upper: usize) -> usize {
        OsRng.gen_range(0..upper)
    }

    fn seed(&self) -> u64 {
        // Production is not seeded
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_system_context_time_is_wall_clock() {
        let ctx = SystemContext::new();
        let before = SystemTime::now();
        let t = ctx.system_time();

        assert!(t + Duration::from_secs(1) >= before);
    }

    #[test]
    fn test_system_context_index_in_range() {
        let ctx = SystemContext::new();
        for upper in 1..50 {
            let idx = ctx.random_index(upper);
            assert!(idx < upper);
        }
        assert_eq!(ctx.random_index(1), 0);
    }

    #[test]
    fn test_system_context_seed() {
        let ctx = SystemContext::new();
        assert_eq!(ctx.seed(), 0);
    }

    #[test]
    fn test_arc_context_delegates() {
        let ctx = SystemContext::shared();
        assert_eq!(RouletteContext::seed(&ctx), 0);
        assert!(ctx.random_index(3) < 3);
    }
}
