//! LRU Baseline Policy Tests.
//!
//! Verifies the classic LRU policy behind the entry interface. Touches and
//! fills promote to MRU; invalidation demotes to LRU.

use ipvsim_core::common::ConfigError;
use ipvsim_core::core::units::cache::policies::{LruPolicy, ReplacementEntry, ReplacementPolicy};

fn lru_with_sets(ways: usize, sets: usize) -> (LruPolicy, Vec<ReplacementEntry>) {
    let Ok(mut policy) = LruPolicy::new(ways) else {
        panic!("{ways}-way LRU rejected");
    };
    let entries = (0..ways * sets).map(|_| policy.instantiate_entry()).collect();
    (policy, entries)
}

/// Initial stack is [0, 1, 2, 3] with index 0 as MRU, so the last way is the victim.
#[test]
fn lru_initial_victim_is_last_way() {
    let (policy, entries) = lru_with_sets(4, 1);
    assert_eq!(policy.select_victim(&entries).slot(), 3);
}

/// Filling ways in order 0,1,2,3 makes 0 the LRU.
#[test]
fn lru_sequential_fill_reorders() {
    let (mut policy, entries) = lru_with_sets(4, 1);

    for entry in &entries {
        policy.reset(entry);
    }
    assert_eq!(policy.select_victim(&entries).slot(), 0);
    assert_eq!(policy.position(&entries[3]), 0);
}

/// Classic LRU scenario: fill 0,1,2,3 then re-touch 0, so LRU becomes 1.
#[test]
fn lru_evicts_true_lru_after_retouch() {
    let (mut policy, entries) = lru_with_sets(4, 1);
    for entry in &entries {
        policy.reset(entry);
    }

    policy.touch(&entries[0]);
    assert_eq!(policy.select_victim(&entries).slot(), 1);

    policy.touch(&entries[1]);
    assert_eq!(policy.select_victim(&entries).slot(), 2);
}

/// Invalidation sends the way to the LRU end regardless of recency.
#[test]
fn lru_invalidated_way_is_next_victim() {
    let (mut policy, entries) = lru_with_sets(4, 1);
    for entry in &entries {
        policy.reset(entry);
    }

    policy.invalidate(&entries[3]);
    assert_eq!(policy.select_victim(&entries).slot(), 3);
    assert!(!policy.is_resident(&entries[3]));
    assert!(policy.is_resident(&entries[2]));
}

/// Victim selection only looks at the given candidates.
#[test]
fn lru_victim_restricted_to_candidates() {
    let (mut policy, entries) = lru_with_sets(4, 1);
    for entry in &entries {
        policy.reset(entry);
    }

    let candidates = [entries[2], entries[3]];
    assert_eq!(policy.select_victim(&candidates).slot(), 2);
}

/// LRU operates independently across sets.
#[test]
fn lru_independent_sets() {
    let (mut policy, entries) = lru_with_sets(4, 2);
    let (set0, set1) = entries.split_at(4);

    for entry in set0 {
        policy.reset(entry);
    }
    assert_eq!(policy.select_victim(set0).slot(), 0);
    assert_eq!(policy.select_victim(set1).slot(), 3);

    for entry in set1.iter().rev() {
        policy.reset(entry);
    }
    assert_eq!(policy.select_victim(set1).slot(), 3);
}

#[test]
fn lru_zero_ways_rejected() {
    assert!(matches!(
        LruPolicy::new(0),
        Err(ConfigError::ZeroAssociativity)
    ));
}
