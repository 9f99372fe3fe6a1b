//! Ground truth oracle for simulation.
//!
//! The Oracle keeps its own ledger of every round it has been shown and
//! audits the engine against it:
//! - Groups are disjoint and only contain roster members
//! - Group sizes match the configured policy
//! - Lenient rounds place everyone; strict rounds never repeat a composition
//! - Round numbers climb by one and history agrees with the ledger
//!
//! The ledger identifies compositions by member sets rather than
//! `GroupKey`, so a key construction bug shows up as a history mismatch.

use roulette_core::{GroupKey, History, ParticipantId, RoundReport};
use std::collections::{BTreeSet, HashMap, HashSet};
use thiserror::Error;

/// A broken engine invariant observed in one round.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("round {round}: {participant} placed in more than one group")]
    DuplicateMember { round: u32, participant: String },

    #[error("round {round}: {participant} is not on the roster")]
    UnknownMember { round: u32, participant: String },

    #[error("round {round}: group of {size} violates group size {group_size}")]
    BadGroupSize {
        round: u32,
        size: usize,
        group_size: usize,
    },

    #[error("round {round}: {participant} left out although odd groups are allowed")]
    MissingParticipant { round: u32, participant: String },

    #[error("no round formed although odd groups are allowed and {roster} participants are present")]
    UnexpectedEmptyRound { roster: usize },

    #[error("round {round}: composition {members:?} repeated in strict mode")]
    RepeatedGroup { round: u32, members: Vec<String> },

    #[error("expected round {expected:?}, engine reported {actual:?}")]
    RoundNumber {
        expected: Option<u32>,
        actual: Option<u32>,
    },

    #[error("sit-out list disagrees with groups: {participant}")]
    SitOutMismatch { participant: String },

    #[error("history says {a} met {b} {actual} times, ledger says {expected}")]
    HistoryMismatch {
        a: String,
        b: String,
        expected: usize,
        actual: usize,
    },

    #[error("history missing composition {members:?} for {participant}")]
    MissingKey {
        participant: String,
        members: Vec<String>,
    },
}

/// What one audited round looked like.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundAudit {
    /// Groups whose composition had been formed before
    pub repeated_groups: usize,

    /// Pairs meeting for the first time
    pub new_pairings: usize,

    /// Participants placed in no group
    pub sitting_out: usize,
}

/// The Oracle - independent bookkeeping of formed rounds.
pub struct Oracle {
    /// Target group size
    group_size: usize,

    /// Odd-group policy
    allow_odd_group: bool,

    /// Every composition formed so far
    compositions: HashSet<BTreeSet<String>>,

    /// Meeting counts per unordered pair
    meetings: HashMap<(String, String), usize>,

    /// Last round number the engine assigned
    last_round: u32,
}

impl Oracle {
    /// Creates an oracle for the given policy.
    pub fn new(group_size: usize, allow_odd_group: bool) -> Self {
        Self {
            group_size,
            allow_odd_group,
            compositions: HashSet::new(),
            meetings: HashMap::new(),
            last_round: 0,
        }
    }

    /// Audits one round.
    ///
    /// `roster` is the list handed to the engine; `history` is the engine's
    /// history after the round was (or was not) recorded.
    pub fn observe(
        &mut self,
        roster: &[ParticipantId],
        report: &RoundReport,
        history: &History,
    ) -> Result<RoundAudit, Violation> {
        let expected_round = (!report.is_empty()).then_some(self.last_round + 1);
        if report.round != expected_round {
            return Err(Violation::RoundNumber {
                expected: expected_round,
                actual: report.round,
            });
        }
        if history.current_round_number() != expected_round.unwrap_or(self.last_round) {
            return Err(Violation::RoundNumber {
                expected: Some(expected_round.unwrap_or(self.last_round)),
                actual: Some(history.current_round_number()),
            });
        }

        let unique: BTreeSet<&str> = roster.iter().map(ParticipantId::as_str).collect();
        let round = expected_round.unwrap_or(self.last_round);

        if report.is_empty() {
            if self.must_place_everyone(unique.len()) {
                return Err(Violation::UnexpectedEmptyRound {
                    roster: unique.len(),
                });
            }
            return Ok(RoundAudit {
                sitting_out: report.sitting_out.len(),
                ..RoundAudit::default()
            });
        }

        let mut placed: BTreeSet<&str> = BTreeSet::new();
        for group in &report.groups {
            self.check_size(round, group.len())?;
            for member in group {
                if !unique.contains(member.as_str()) {
                    return Err(Violation::UnknownMember {
                        round,
                        participant: member.to_string(),
                    });
                }
                if !placed.insert(member.as_str()) {
                    return Err(Violation::DuplicateMember {
                        round,
                        participant: member.to_string(),
                    });
                }
            }
        }

        let left_out: BTreeSet<&str> = unique.difference(&placed).copied().collect();
        let reported: BTreeSet<&str> = report.sitting_out.iter().map(ParticipantId::as_str).collect();
        if let Some(participant) = left_out.symmetric_difference(&reported).next() {
            return Err(Violation::SitOutMismatch {
                participant: participant.to_string(),
            });
        }
        if self.must_place_everyone(unique.len()) {
            if let Some(participant) = left_out.iter().next() {
                return Err(Violation::MissingParticipant {
                    round,
                    participant: participant.to_string(),
                });
            }
        }

        let mut audit = RoundAudit {
            sitting_out: left_out.len(),
            ..RoundAudit::default()
        };

        for group in &report.groups {
            let members: BTreeSet<String> = group.iter().map(ToString::to_string).collect();
            let fresh = self.compositions.insert(members.clone());
            if !fresh {
                if !self.allow_odd_group {
                    return Err(Violation::RepeatedGroup {
                        round,
                        members: members.into_iter().collect(),
                    });
                }
                audit.repeated_groups += 1;
            }

            let members: Vec<String> = members.into_iter().collect();
            for (i, a) in members.iter().enumerate() {
                for b in &members[i + 1..] {
                    let count = self.meetings.entry((a.clone(), b.clone())).or_insert(0);
                    if *count == 0 {
                        audit.new_pairings += 1;
                    }
                    *count += 1;
                }
            }
            self.check_history(&members, history)?;
        }

        self.last_round = round;
        Ok(audit)
    }

    /// Number of distinct pairs that have met at least once.
    pub fn distinct_pairings(&self) -> usize {
        self.meetings.len()
    }

    /// Highest number of times any single pair has met.
    pub fn max_meetings(&self) -> usize {
        self.meetings.values().copied().max().unwrap_or(0)
    }

    /// Last round number observed.
    pub fn last_round(&self) -> u32 {
        self.last_round
    }

    fn must_place_everyone(&self, roster: usize) -> bool {
        // A single group's worth may legitimately be refused as a repeat
        self.allow_odd_group
            && if self.group_size == 2 {
                roster >= 2
            } else {
                roster > self.group_size
            }
    }

    fn check_size(&self, round: u32, size: usize) -> Result<(), Violation> {
        let ok = if self.allow_odd_group {
            size >= self.group_size && size < 2 * self.group_size
        } else {
            size == self.group_size
        };
        if ok {
            Ok(())
        } else {
            Err(Violation::BadGroupSize {
                round,
                size,
                group_size: self.group_size,
            })
        }
    }

    fn check_history(&self, members: &[String], history: &History) -> Result<(), Violation> {
        for a in members {
            let id_a = ParticipantId::from(a.as_str());
            let record = history
                .participant(&id_a)
                .ok_or_else(|| Violation::MissingKey {
                    participant: a.clone(),
                    members: members.to_vec(),
                })?;
            if !record.group_keys_seen.contains(&GroupKey::from_members(members)) {
                return Err(Violation::MissingKey {
                    participant: a.clone(),
                    members: members.to_vec(),
                });
            }

            for b in members.iter().filter(|&b| b != a) {
                let pair = if a < b {
                    (a.clone(), b.clone())
                } else {
                    (b.clone(), a.clone())
                };
                let expected = self.meetings.get(&pair).copied().unwrap_or(0);
                let actual = history.times_met(&id_a, &ParticipantId::from(b.as_str()));
                if actual != expected {
                    return Err(Violation::HistoryMismatch {
                        a: a.clone(),
                        b: b.clone(),
                        expected,
                        actual,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use roulette_core::{participants, Group};

    fn report(round: Option<u32>, groups: &[&[&str]], sitting_out: &[&str]) -> RoundReport {
        RoundReport {
            round,
            groups: groups
                .iter()
                .map(|g| Group::new(participants(g.iter().copied())))
                .collect(),
            sitting_out: participants(sitting_out.iter().copied()),
        }
    }

    fn recorded(report: &RoundReport, history: &mut History) {
        if let Some(round) = report.round {
            history.record(
                &report.groups,
                round,
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            );
        }
    }

    #[test]
    fn test_accepts_a_valid_round() {
        let mut oracle = Oracle::new(2, true);
        let mut history = History::new();
        let roster = participants(["a", "b", "c", "d"]);

        let round = report(Some(1), &[&["a", "b"], &["c", "d"]], &[]);
        recorded(&round, &mut history);

        let audit = oracle.observe(&roster, &round, &history).unwrap();
        assert_eq!(audit.new_pairings, 2);
        assert_eq!(audit.repeated_groups, 0);
        assert_eq!(oracle.last_round(), 1);
    }

    #[test]
    fn test_detects_duplicate_member() {
        let mut oracle = Oracle::new(2, true);
        let mut history = History::new();
        let roster = participants(["a", "b", "c"]);

        let round = report(Some(1), &[&["a", "b"], &["a", "c"]], &[]);
        recorded(&round, &mut history);

        assert!(matches!(
            oracle.observe(&roster, &round, &history),
            Err(Violation::DuplicateMember { .. })
        ));
    }

    #[test]
    fn test_detects_missing_participant_in_lenient_mode() {
        let mut oracle = Oracle::new(2, true);
        let mut history = History::new();
        let roster = participants(["a", "b", "c"]);

        let round = report(Some(1), &[&["a", "b"]], &["c"]);
        recorded(&round, &mut history);

        assert!(matches!(
            oracle.observe(&roster, &round, &history),
            Err(Violation::MissingParticipant { .. })
        ));
    }

    #[test]
    fn test_detects_sit_out_mismatch() {
        let mut oracle = Oracle::new(2, false);
        let mut history = History::new();
        let roster = participants(["a", "b", "c"]);

        let round = report(Some(1), &[&["a", "b"]], &[]);
        recorded(&round, &mut history);

        assert_eq!(
            oracle.observe(&roster, &round, &history),
            Err(Violation::SitOutMismatch {
                participant: "c".to_string()
            })
        );
    }

    #[test]
    fn test_detects_strict_repeat() {
        let mut oracle = Oracle::new(2, false);
        let mut history = History::new();
        let roster = participants(["a", "b"]);

        let first = report(Some(1), &[&["a", "b"]], &[]);
        recorded(&first, &mut history);
        oracle.observe(&roster, &first, &history).unwrap();

        let second = report(Some(2), &[&["b", "a"]], &[]);
        recorded(&second, &mut history);
        assert!(matches!(
            oracle.observe(&roster, &second, &history),
            Err(Violation::RepeatedGroup { .. })
        ));
    }

    #[test]
    fn test_detects_unrecorded_round() {
        let mut oracle = Oracle::new(2, true);
        let history = History::new();
        let roster = participants(["a", "b"]);

        let round = report(Some(1), &[&["a", "b"]], &[]);
        assert!(matches!(
            oracle.observe(&roster, &round, &history),
            Err(Violation::RoundNumber { .. })
        ));
    }

    #[test]
    fn test_empty_strict_round_is_fine() {
        let mut oracle = Oracle::new(2, false);
        let history = History::new();
        let roster = participants(["a", "b"]);

        let round = report(None, &[], &["a", "b"]);
        let audit = oracle.observe(&roster, &round, &history).unwrap();
        assert_eq!(audit.sitting_out, 2);
        assert_eq!(oracle.last_round(), 0);
    }

    #[test]
    fn test_bad_group_size() {
        let mut oracle = Oracle::new(3, false);
        let mut history = History::new();
        let roster = participants(["a", "b", "c", "d"]);

        let round = report(Some(1), &[&["a", "b", "c", "d"]], &[]);
        recorded(&round, &mut history);
        assert!(matches!(
            oracle.observe(&roster, &round, &history),
            Err(Violation::BadGroupSize { size: 4, .. })
        ));
    }
}
