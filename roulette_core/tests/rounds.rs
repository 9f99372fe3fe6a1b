//! End-to-end round properties of the matchmaker.

mod common;

use common::{appearances, roster, SeededContext};
use proptest::prelude::*;
use roulette_core::{GroupKey, History, Matchmaker, RoundConfig};
use std::collections::HashSet;
use std::sync::Arc;

fn matchmaker(seed: u64) -> Matchmaker<SeededContext> {
    Matchmaker::new(Arc::new(SeededContext::new(seed)))
}

#[test]
fn pairwise_second_round_avoids_first_round_pairs() {
    for seed in 0..50 {
        let mut mm = matchmaker(seed);
        let ids = roster(4);
        let config = RoundConfig::new(2);

        let round1 = mm.create_round(&ids, &config).unwrap();
        assert_eq!(round1.len(), 2);
        assert!(appearances(&round1).values().all(|&n| n == 1));

        let round2 = mm.create_round(&ids, &config).unwrap();
        let first: HashSet<GroupKey> = round1.iter().map(|g| g.key()).collect();
        for group in &round2 {
            assert!(!first.contains(&group.key()), "seed {} repeated {}", seed, group);
        }
    }
}

#[test]
fn round_numbers_strictly_increase() {
    let mut mm = matchmaker(11);
    let ids = roster(6);
    let mut last = mm.current_round_number();

    for _ in 0..8 {
        mm.create_round(&ids, &RoundConfig::new(2)).unwrap();
        let current = mm.current_round_number();
        assert!(current > last);
        last = current;
    }
    assert_eq!(last, 8);
}

#[test]
fn empty_input_changes_nothing() {
    let mut mm = matchmaker(1);
    mm.create_round(&roster(4), &RoundConfig::new(2)).unwrap();
    let before = mm.history().export();

    assert!(mm.create_round(&[], &RoundConfig::new(2)).unwrap().is_empty());
    assert_eq!(mm.history().export(), before);
}

#[test]
fn odd_roster_sits_one_out_when_odd_groups_disallowed() {
    let mut mm = matchmaker(21);
    let ids = roster(5);
    let config = RoundConfig::new(2).with_odd_group(false);

    let report = mm.create_round_report(&ids, &config).unwrap();
    assert_eq!(report.groups.len(), 2);
    assert!(report.groups.iter().all(|g| g.len() == 2));
    assert_eq!(report.sitting_out.len(), 1);

    let left_out = &report.sitting_out[0];
    assert!(mm.history().participant(left_out).is_none());
    assert_eq!(mm.history().len(), 4);
}

#[test]
fn odd_roster_forms_a_trio_when_odd_groups_allowed() {
    let mut mm = matchmaker(21);
    let ids = roster(5);

    let groups = mm.create_round(&ids, &RoundConfig::new(2)).unwrap();
    let mut sizes: Vec<usize> = groups.iter().map(|g| g.len()).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![2, 3]);

    let seen = appearances(&groups);
    assert_eq!(seen.len(), 5);
    assert!(seen.values().all(|&n| n == 1));
}

#[test]
fn exhausted_pair_returns_empty_round() {
    let mut mm = matchmaker(3);
    let ids = roster(2);
    let config = RoundConfig::new(2).with_odd_group(false);

    assert_eq!(mm.create_round(&ids, &config).unwrap().len(), 1);
    let before = mm.history().export();

    assert!(mm.create_round(&ids, &config).unwrap().is_empty());
    assert_eq!(mm.history().export(), before);
    assert_eq!(mm.next_round_number(), 2);
}

#[test]
fn snapshot_json_survives_a_restart() {
    let mut mm = matchmaker(8);
    let ids = roster(6);
    for _ in 0..3 {
        mm.create_round(&ids, &RoundConfig::new(3)).unwrap();
    }

    let json = mm.history().export().to_json().unwrap();
    let restored = History::from_snapshot(roulette_core::HistorySnapshot::from_json(&json).unwrap());

    assert_eq!(restored.next_round_number(), 4);
    for (id, record) in mm.history().participants() {
        let other = restored.participant(id).unwrap();
        assert_eq!(record.group_keys_seen, other.group_keys_seen);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn lenient_rounds_cover_everyone_once(
        seed in any::<u64>(),
        size in 2usize..5,
        extra in 1usize..12,
        rounds in 1usize..6,
    ) {
        // More participants than one group, so every round is formable
        let n = size + extra;
        let mut mm = matchmaker(seed);
        let ids = roster(n);

        for _ in 0..rounds {
            let groups = mm.create_round(&ids, &RoundConfig::new(size)).unwrap();
            let seen = appearances(&groups);
            prop_assert_eq!(seen.len(), n);
            prop_assert!(seen.values().all(|&count| count == 1));
            prop_assert!(groups.iter().all(|g| g.len() >= size));
        }
    }

    #[test]
    fn strict_rounds_never_repeat_a_composition(
        seed in any::<u64>(),
        size in 2usize..5,
        n in 2usize..14,
        rounds in 1usize..8,
    ) {
        let mut mm = matchmaker(seed);
        let ids = roster(n);
        let config = RoundConfig::new(size).with_odd_group(false);
        let mut keys = HashSet::new();

        for _ in 0..rounds {
            let groups = mm.create_round(&ids, &config).unwrap();
            let seen = appearances(&groups);
            prop_assert!(seen.values().all(|&count| count == 1));
            for group in &groups {
                prop_assert_eq!(group.len(), size);
                prop_assert!(keys.insert(group.key()), "repeated {}", group);
            }
        }
    }
}
