//! The History Store - durable record of past compositions and contacts.
//!
//! Every participant carries two things:
//! - the set of [`GroupKey`]s of every group they have been part of
//! - a per-partner log of [`ContactEvent`]s (who, which round, when)
//!
//! The round counter is never stored: it is derived from the highest round
//! found among the contact events.

use crate::group::{Group, GroupKey, ParticipantId};
use crate::snapshot::{ContactSnapshot, HistorySnapshot, ParticipantSnapshot};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// One directed record that the owning participant met `partner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEvent {
    /// The other participant
    pub partner: ParticipantId,

    /// Round the two were grouped in
    pub round: u32,

    /// When the round was recorded
    pub timestamp: DateTime<Utc>,
}

/// Everything the store knows about one participant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantRecord {
    /// Keys of every group this participant has been part of
    pub group_keys_seen: HashSet<GroupKey>,

    /// Contact log, keyed by partner
    pub contacts: HashMap<ParticipantId, Vec<ContactEvent>>,
}

impl ParticipantRecord {
    /// Highest round number found in this participant's contacts (0 if none).
    pub fn max_round(&self) -> u32 {
        self.contacts
            .values()
            .flatten()
            .map(|event| event.round)
            .max()
            .unwrap_or(0)
    }

    /// Total number of contact events across all partners.
    pub fn contact_count(&self) -> usize {
        self.contacts.values().map(Vec::len).sum()
    }
}

/// In-memory history of all rounds played against one roster.
#[derive(Debug, Clone, Default)]
pub struct History {
    records: HashMap<ParticipantId, ParticipantRecord>,
}

impl History {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if this exact composition (in any order) has been recorded before.
    pub fn has_occurred<P: AsRef<str>>(&self, members: &[P]) -> bool {
        let key = GroupKey::from_members(members);
        members.iter().any(|member| {
            self.records
                .get(member.as_ref())
                .is_some_and(|record| record.group_keys_seen.contains(&key))
        })
    }

    /// Records a finalized round.
    ///
    /// Adds each group's key to every member and appends one contact event
    /// per ordered pair of distinct members.
    pub fn record(&mut self, groups: &[Group], round: u32, timestamp: DateTime<Utc>) {
        for group in groups {
            self.record_group(group, round, timestamp);
        }
    }

    fn record_group(&mut self, group: &Group, round: u32, timestamp: DateTime<Utc>) {
        let key = group.key();

        for member in group {
            let record = self.records.entry(member.clone()).or_default();
            record.group_keys_seen.insert(key.clone());

            for partner in group {
                if partner == member {
                    continue;
                }
                record
                    .contacts
                    .entry(partner.clone())
                    .or_default()
                    .push(ContactEvent {
                        partner: partner.clone(),
                        round,
                        timestamp,
                    });
            }
        }
    }

    /// `1 + max(round)` over every contact event, or 1 for an empty history.
    ///
    /// Saturates at `u32::MAX` once that round is on record.
    pub fn next_round_number(&self) -> u32 {
        self.checked_next_round_number().unwrap_or(u32::MAX)
    }

    /// Like [`next_round_number`](Self::next_round_number), but `None` when
    /// round `u32::MAX` is already recorded.
    pub fn checked_next_round_number(&self) -> Option<u32> {
        self.current_round_number().checked_add(1)
    }

    /// Highest round recorded so far (0 if none).
    pub fn current_round_number(&self) -> u32 {
        self.records
            .values()
            .map(ParticipantRecord::max_round)
            .max()
            .unwrap_or(0)
    }

    /// Clears every entry.
    pub fn reset(&mut self) {
        self.records.clear();
    }

    /// Looks up a participant's record.
    pub fn participant(&self, id: &ParticipantId) -> Option<&ParticipantRecord> {
        self.records.get(id)
    }

    /// Iterates all participant records (unordered).
    pub fn participants(&self) -> impl Iterator<Item = (&ParticipantId, &ParticipantRecord)> {
        self.records.iter()
    }

    /// Number of participants with a record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of times `a` has been grouped with `b`.
    pub fn times_met(&self, a: &ParticipantId, b: &ParticipantId) -> usize {
        self.records
            .get(a)
            .and_then(|record| record.contacts.get(b))
            .map_or(0, Vec::len)
    }

    /// Exports the history as a plain nested map.
    ///
    /// Participants, partners and keys come out sorted so that two equal
    /// histories always produce identical snapshots.
    pub fn export(&self) -> HistorySnapshot {
        let mut participants = BTreeMap::new();

        for (id, record) in &self.records {
            let mut pair_keys: Vec<String> = record
                .group_keys_seen
                .iter()
                .map(|key| key.as_str().to_string())
                .collect();
            pair_keys.sort_unstable();

            let has_paired_with = record
                .contacts
                .iter()
                .map(|(partner, events)| {
                    let events = events
                        .iter()
                        .map(|event| ContactSnapshot {
                            date: event.timestamp,
                            round: event.round,
                        })
                        .collect();
                    (partner.as_str().to_string(), events)
                })
                .collect();

            participants.insert(
                id.as_str().to_string(),
                ParticipantSnapshot {
                    pair_keys,
                    has_paired_with,
                },
            );
        }

        HistorySnapshot { participants }
    }

    /// Replaces the whole history with the contents of `snapshot`.
    ///
    /// Group keys are re-derived from the contact log (a participant's
    /// partners within one round are that round's group-mates) and merged
    /// with the stored keys, so snapshots written with another key format
    /// still detect repeats.
    pub fn import(&mut self, snapshot: HistorySnapshot) {
        self.records.clear();

        for (id, entry) in snapshot.participants {
            let owner = ParticipantId::new(id);
            let mut record = ParticipantRecord::default();

            record
                .group_keys_seen
                .extend(entry.pair_keys.into_iter().map(GroupKey::from_raw));

            let mut mates_by_round: BTreeMap<u32, Vec<ParticipantId>> = BTreeMap::new();
            for (partner, events) in entry.has_paired_with {
                let partner = ParticipantId::new(partner);
                let contacts = record.contacts.entry(partner.clone()).or_default();

                for event in events {
                    mates_by_round
                        .entry(event.round)
                        .or_default()
                        .push(partner.clone());
                    contacts.push(ContactEvent {
                        partner: partner.clone(),
                        round: event.round,
                        timestamp: event.date,
                    });
                }
            }

            for (_, mut members) in mates_by_round {
                members.push(owner.clone());
                record
                    .group_keys_seen
                    .insert(GroupKey::from_members(&members));
            }

            self.records.insert(owner, record);
        }

        debug!(
            participants = self.records.len(),
            current_round = self.current_round_number(),
            "history imported"
        );
    }

    /// Builds a history from a snapshot.
    pub fn from_snapshot(snapshot: HistorySnapshot) -> Self {
        let mut history = Self::new();
        history.import(snapshot);
        history
    }
}
