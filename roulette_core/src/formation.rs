//! The Group Formation Algorithm.
//!
//! Two greedy modes, both consulting the [`History`] to avoid repeating a
//! composition:
//!
//! - **Pairwise** (`group_size == 2`): each participant takes the first
//!   unplaced partner, in list order, they have never been paired with.
//!   Leftovers are either folded in (duplicates accepted) or sit out.
//! - **Chunking** (`group_size > 2`): the list is cut left to right into
//!   consecutive chunks; repeated chunks are kept or dropped depending on
//!   the odd-group policy.
//!
//! Randomness is not this module's concern. Callers shuffle the list first;
//! ties always go to the earliest candidate.

use crate::group::{Group, ParticipantId};
use crate::history::History;
use tracing::debug;

/// One position in the list handed to the algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// A real participant
    Member(ParticipantId),

    /// "No partner available" placeholder absorbing an odd remainder.
    /// Never emitted in a group and never recorded.
    SitOut,
}

impl Slot {
    /// Returns the participant, if this slot holds one.
    pub fn member(&self) -> Option<&ParticipantId> {
        match self {
            Slot::Member(id) => Some(id),
            Slot::SitOut => None,
        }
    }
}

/// Forms this round's groups.
///
/// Returns an empty list when no valid grouping exists (too few
/// participants, or every composition already used and reuse disallowed).
pub fn form_groups(
    slots: &[Slot],
    group_size: usize,
    allow_odd_group: bool,
    history: &History,
) -> Vec<Group> {
    let members: Vec<&ParticipantId> = slots.iter().filter_map(Slot::member).collect();

    match group_size {
        0 | 1 => Vec::new(),
        2 => pair_avoiding_repeats(&members, allow_odd_group, history),
        _ => chunk_avoiding_repeats(&members, group_size, allow_odd_group, history),
    }
}

fn pair_avoiding_repeats(
    members: &[&ParticipantId],
    allow_odd_group: bool,
    history: &History,
) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut placed = vec![false; members.len()];

    // First pass: only pairs that have never occurred
    for i in 0..members.len() {
        if placed[i] {
            continue;
        }

        let partner = (0..members.len()).find(|&j| {
            j != i && !placed[j] && !history.has_occurred(&[members[i], members[j]])
        });

        if let Some(j) = partner {
            groups.push(Group::new(vec![members[i].clone(), members[j].clone()]));
            placed[i] = true;
            placed[j] = true;
        }
    }

    let remaining: Vec<&ParticipantId> = members
        .iter()
        .zip(&placed)
        .filter(|&(_, &done)| !done)
        .map(|(&id, _)| id)
        .collect();

    if !allow_odd_group {
        if !remaining.is_empty() {
            debug!(count = remaining.len(), "participants sit out to avoid repeat pairings");
        }
        return groups;
    }

    // Second pass: include everyone, accepting repeats
    match remaining.as_slice() {
        [] => {}
        [single] => match groups.last_mut() {
            Some(last) => last.push((*single).clone()),
            None => debug!(participant = %single, "no group to join, sitting out"),
        },
        _ => {
            let mut pairs = remaining.chunks_exact(2);
            for pair in &mut pairs {
                groups.push(to_group(pair));
            }
            if let (Some(odd), Some(last)) = (pairs.remainder().first(), groups.last_mut()) {
                last.push((*odd).clone());
            }
        }
    }

    groups
}

fn chunk_avoiding_repeats(
    members: &[&ParticipantId],
    group_size: usize,
    allow_odd_group: bool,
    history: &History,
) -> Vec<Group> {
    // Exactly one group's worth: either it is new or there is no round
    if members.len() == group_size {
        if history.has_occurred(members) {
            debug!("this group composition has already been used in a previous round");
            return Vec::new();
        }
        return vec![to_group(members)];
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut chunks = members.chunks_exact(group_size);

    for chunk in &mut chunks {
        if !history.has_occurred(chunk) {
            groups.push(to_group(chunk));
        } else if allow_odd_group {
            groups.push(to_group(chunk));
        } else {
            debug!(group = %to_group(chunk), "skipping group already used in a previous round");
        }
    }

    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        match groups.last_mut() {
            Some(last) if allow_odd_group => {
                for id in remainder {
                    last.push((*id).clone());
                }
            }
            _ => debug!(count = remainder.len(), "remainder sits out this round"),
        }
    }

    groups
}

fn to_group(members: &[&ParticipantId]) -> Group {
    Group::new(members.iter().map(|&id| id.clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::participants;
    use chrono::{TimeZone, Utc};

    fn slots(ids: &[&str]) -> Vec<Slot> {
        ids.iter().map(|id| Slot::Member(ParticipantId::from(*id))).collect()
    }

    fn as_strs(groups: &[Group]) -> Vec<Vec<&str>> {
        groups
            .iter()
            .map(|g| g.iter().map(ParticipantId::as_str).collect())
            .collect()
    }

    fn record(history: &mut History, groups: &[&[&str]], round: u32) {
        let groups: Vec<Group> = groups
            .iter()
            .map(|g| Group::new(participants(g.iter().copied())))
            .collect();
        history.record(&groups, round, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_pairs_in_list_order() {
        let history = History::new();
        let groups = form_groups(&slots(&["a", "b", "c", "d"]), 2, true, &history);
        assert_eq!(as_strs(&groups), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_pairs_skip_previous_partners() {
        let mut history = History::new();
        record(&mut history, &[&["a", "b"], &["c", "d"]], 1);

        let groups = form_groups(&slots(&["a", "b", "c", "d"]), 2, true, &history);
        assert_eq!(as_strs(&groups), vec![vec!["a", "c"], vec!["b", "d"]]);
    }

    #[test]
    fn test_pairs_odd_member_joins_last_pair() {
        let history = History::new();
        let groups = form_groups(&slots(&["a", "b", "c", "d", "e"]), 2, true, &history);
        assert_eq!(as_strs(&groups), vec![vec!["a", "b"], vec!["c", "d", "e"]]);
    }

    #[test]
    fn test_pairs_ignore_sit_out_slot() {
        let history = History::new();
        let mut input = slots(&["a", "b", "c"]);
        input.push(Slot::SitOut);

        let groups = form_groups(&input, 2, false, &history);
        assert_eq!(as_strs(&groups), vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_pairs_second_pass_accepts_repeats() {
        let mut history = History::new();
        // Every pair among a, b, c, d has already happened
        record(&mut history, &[&["a", "b"], &["c", "d"]], 1);
        record(&mut history, &[&["a", "c"], &["b", "d"]], 2);
        record(&mut history, &[&["a", "d"], &["b", "c"]], 3);

        let strict = form_groups(&slots(&["a", "b", "c", "d"]), 2, false, &history);
        assert!(strict.is_empty());

        let lenient = form_groups(&slots(&["a", "b", "c", "d"]), 2, true, &history);
        assert_eq!(as_strs(&lenient), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_pairs_second_pass_odd_leftover() {
        let mut history = History::new();
        // a, b, c have all met each other; only (d, e) is fresh
        record(&mut history, &[&["a", "b"]], 1);
        record(&mut history, &[&["a", "c"]], 2);
        record(&mut history, &[&["b", "c"]], 3);

        let groups = form_groups(&slots(&["a", "b", "c", "d", "e"]), 2, true, &history);
        // Pass 1: a-d, b-e; c left alone -> joins the last pair
        assert_eq!(as_strs(&groups), vec![vec!["a", "d"], vec!["b", "e", "c"]]);
    }

    #[test]
    fn test_pairs_second_pass_pairs_leftovers_by_position() {
        let mut history = History::new();
        record(&mut history, &[&["a", "b"]], 1);
        record(&mut history, &[&["a", "c"]], 2);
        record(&mut history, &[&["b", "c"]], 3);

        let groups = form_groups(&slots(&["a", "b", "c"]), 2, true, &history);
        // Nothing fresh: a-b by position, c folds into it
        assert_eq!(as_strs(&groups), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn test_pairs_second_pass_many_leftovers() {
        let mut history = History::new();
        let ids = ["a", "b", "c", "d", "e"];
        let mut round = 1;
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                record(&mut history, &[&[*a, *b]], round);
                round += 1;
            }
        }

        // Nothing fresh: five leftovers pair by position, the fifth joins the last pair
        let groups = form_groups(&slots(&ids), 2, true, &history);
        assert_eq!(as_strs(&groups), vec![vec!["a", "b"], vec!["c", "d", "e"]]);
    }

    #[test]
    fn test_single_participant_forms_nothing() {
        let history = History::new();
        assert!(form_groups(&slots(&["solo"]), 2, true, &history).is_empty());
        assert!(form_groups(&slots(&["solo"]), 3, true, &history).is_empty());
    }

    #[test]
    fn test_chunks_with_remainder() {
        let history = History::new();
        let groups = form_groups(&slots(&["a", "b", "c", "d", "e", "f", "g"]), 3, true, &history);
        assert_eq!(
            as_strs(&groups),
            vec![vec!["a", "b", "c"], vec!["d", "e", "f", "g"]]
        );

        let strict = form_groups(&slots(&["a", "b", "c", "d", "e", "f", "g"]), 3, false, &history);
        assert_eq!(as_strs(&strict), vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]);
    }

    #[test]
    fn test_chunks_exact_group_already_used() {
        let mut history = History::new();
        record(&mut history, &[&["a", "b", "c"]], 1);

        let groups = form_groups(&slots(&["c", "a", "b"]), 3, true, &history);
        assert!(groups.is_empty());

        let fresh = form_groups(&slots(&["a", "b", "d"]), 3, false, &history);
        assert_eq!(as_strs(&fresh), vec![vec!["a", "b", "d"]]);
    }

    #[test]
    fn test_chunks_repeated_chunk_policy() {
        let mut history = History::new();
        record(&mut history, &[&["a", "b", "c"]], 1);
        let input = slots(&["a", "b", "c", "d", "e", "f"]);

        let lenient = form_groups(&input, 3, true, &history);
        assert_eq!(lenient.len(), 2);

        let strict = form_groups(&input, 3, false, &history);
        assert_eq!(as_strs(&strict), vec![vec!["d", "e", "f"]]);
    }

    #[test]
    fn test_chunks_remainder_dropped_without_kept_group() {
        let mut history = History::new();
        record(&mut history, &[&["a", "b", "c"]], 1);

        // Only chunk is a repeat and gets dropped; remainder has nowhere to go
        let groups = form_groups(&slots(&["a", "b", "c", "d"]), 3, false, &history);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_chunks_too_few_participants() {
        let history = History::new();
        assert!(form_groups(&slots(&["a", "b"]), 3, true, &history).is_empty());
    }
}
