//! Error types for the roulette engine.

use thiserror::Error;

/// Errors surfaced by the engine.
///
/// Empty rosters and exhausted compositions are not errors: they come back
/// as an empty round.
#[derive(Debug, Error)]
pub enum RouletteError {
    /// Group size below the minimum of 2
    #[error("groupSize must be greater than or equal to 2 (got {group_size})")]
    InvalidGroupSize { group_size: usize },

    /// Round `u32::MAX` is on record, so no later round can be numbered
    #[error("round counter exhausted after round {last_round}")]
    RoundLimit { last_round: u32 },

    /// History snapshot could not be encoded or decoded
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type RouletteResult<T> = Result<T, RouletteError>;
