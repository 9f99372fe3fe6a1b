//! Roster normalization.

use crate::group::ParticipantId;
use std::collections::HashSet;

/// Removes duplicate ids, keeping the order of first occurrence.
pub fn normalize(ids: &[ParticipantId]) -> Vec<ParticipantId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
