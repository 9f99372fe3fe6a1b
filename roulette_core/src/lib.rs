//! Coffee Roulette Core - History-Aware Group Formation
//!
//! This library assigns a roster of participants to small groups for
//! recurring meet-ups while avoiding repeated compositions:
//! 1. **Roster**: deduplicated, first-seen order preserved
//! 2. **Shuffle**: Fisher-Yates over an injected random source
//! 3. **Formation**: greedy pairwise / chunked grouping consulting history
//! 4. **History**: group keys + contact log, round number derived from it
//!
//! The engine performs no I/O. Persistence goes through [`HistorySnapshot`].

pub mod error;
pub mod formation;
pub mod group;
pub mod history;
pub mod matchmaker;
pub mod roster;
pub mod shuffle;
pub mod snapshot;

#[cfg(test)]
mod testing;

// Re-export key types for convenience
pub use error::{RouletteError, RouletteResult};
pub use formation::{form_groups, Slot};
pub use group::{participants, Group, GroupKey, ParticipantId, GROUP_KEY_DELIMITER};
pub use history::{ContactEvent, History, ParticipantRecord};
pub use matchmaker::{Matchmaker, RoundConfig, RoundReport};
pub use roster::normalize;
pub use shuffle::shuffle;
pub use snapshot::{ContactSnapshot, HistorySnapshot, ParticipantSnapshot};
