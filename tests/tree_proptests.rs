//! Property-based tests for the tree.
//!
//! These tests verify invariants and properties that should hold for all
//! inputs. Uses differential testing against `BTreeMap`/`BTreeSet` and
//! sorted vectors as oracles; keys are drawn from a small domain so
//! duplicate-heavy inputs are the common case, not the corner case.

#![expect(clippy::unwrap_used, reason = "fail fast in tests")]
#![expect(clippy::cast_possible_truncation)]

use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use twothree::{KeyOf, TwoThreeSet, TwoThreeTree};

// ============================================================================
//  Strategies
// ============================================================================

/// Keys from a small domain, so equal keys collide constantly.
fn small_key() -> impl Strategy<Value = u16> {
    0..64_u16
}

/// Operations for random testing.
#[derive(Debug, Clone)]
enum Op {
    InsertEqual(u16),
    InsertUnique(u16),
    Erase(u16),
    RemoveOne(u16),
    PopFirst,
    PopLast,
}

/// Strategy for generating random operation sequences, biased toward
/// growth so trees get several levels deep.
fn operations(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            4 => small_key().prop_map(Op::InsertEqual),
            2 => small_key().prop_map(Op::InsertUnique),
            2 => small_key().prop_map(Op::Erase),
            2 => small_key().prop_map(Op::RemoveOne),
            1 => Just(Op::PopFirst),
            1 => Just(Op::PopLast),
        ],
        0..=max_ops,
    )
}

// ============================================================================
//  Multiset oracle on BTreeMap
// ============================================================================

/// Key -> multiplicity.
type Oracle = BTreeMap<u16, usize>;

fn oracle_insert(oracle: &mut Oracle, key: u16) {
    *oracle.entry(key).or_insert(0) += 1;
}

fn oracle_remove_one(oracle: &mut Oracle, key: u16) -> bool {
    match oracle.get_mut(&key) {
        Some(n) if *n > 1 => {
            *n -= 1;
            true
        }
        Some(_) => {
            oracle.remove(&key);
            true
        }
        None => false,
    }
}

fn oracle_pop_first(oracle: &mut Oracle) -> Option<u16> {
    let (&key, _) = oracle.iter().next()?;
    oracle_remove_one(oracle, key);
    Some(key)
}

fn oracle_pop_last(oracle: &mut Oracle) -> Option<u16> {
    let (&key, _) = oracle.iter().next_back()?;
    oracle_remove_one(oracle, key);
    Some(key)
}

fn oracle_len(oracle: &Oracle) -> usize {
    oracle.values().sum()
}

/// The oracle's contents as the flat ordered value sequence the tree
/// should iterate.
fn flatten(oracle: &Oracle) -> Vec<u16> {
    oracle
        .iter()
        .flat_map(|(&key, &n)| std::iter::repeat(key).take(n))
        .collect()
}

// ============================================================================
//  Differential testing against the oracle
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Random op sequences leave the tree and the multiset oracle holding
    /// exactly the same contents, with every structural invariant intact.
    #[test]
    fn differential_against_multiset_oracle(ops in operations(300)) {
        let mut tree: TwoThreeTree<u16> = TwoThreeTree::new();
        let mut oracle: Oracle = Oracle::new();

        for (i, op) in ops.iter().enumerate() {
            match *op {
                Op::InsertEqual(key) => {
                    tree.insert_equal(key);
                    oracle_insert(&mut oracle, key);
                }
                Op::InsertUnique(key) => {
                    let accepted = tree.insert_unique(key);
                    prop_assert_eq!(accepted, !oracle.contains_key(&key), "insert_unique({})", key);
                    if accepted {
                        oracle_insert(&mut oracle, key);
                    }
                }
                Op::Erase(key) => {
                    let removed = tree.erase(&key);
                    let expected = oracle.remove(&key).unwrap_or(0);
                    prop_assert_eq!(removed, expected, "erase({})", key);
                }
                Op::RemoveOne(key) => {
                    let removed = tree.remove_one(&key);
                    let expected = oracle_remove_one(&mut oracle, key);
                    prop_assert_eq!(removed.is_some(), expected, "remove_one({})", key);
                    if let Some(v) = removed {
                        prop_assert_eq!(v, key);
                    }
                }
                Op::PopFirst => {
                    prop_assert_eq!(tree.pop_first(), oracle_pop_first(&mut oracle));
                }
                Op::PopLast => {
                    prop_assert_eq!(tree.pop_last(), oracle_pop_last(&mut oracle));
                }
            }

            prop_assert_eq!(tree.len(), oracle_len(&oracle));
            if i % 16 == 0 {
                prop_assert_eq!(tree.verify(), Ok(()));
            }
        }

        prop_assert_eq!(tree.verify(), Ok(()));
        prop_assert_eq!(tree.iter().copied().collect::<Vec<_>>(), flatten(&oracle));
        prop_assert_eq!(tree.first().copied(), oracle.keys().next().copied());
        prop_assert_eq!(tree.last().copied(), oracle.keys().next_back().copied());
    }

    /// `count` agrees with the oracle for every key that ever went in.
    #[test]
    fn count_matches_oracle(values in prop::collection::vec(small_key(), 0..200)) {
        let tree: TwoThreeTree<u16> = values.iter().copied().collect();
        let mut oracle: Oracle = Oracle::new();
        for &v in &values {
            oracle_insert(&mut oracle, v);
        }

        for key in 0..64_u16 {
            prop_assert_eq!(tree.count(&key), oracle.get(&key).copied().unwrap_or(0));
        }
    }
}

// ============================================================================
//  Bound searches against a sorted vector
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// The bound searches return exactly the suffix/slice a sorted vector's
    /// partition points describe.
    #[test]
    fn bounds_match_sorted_oracle(
        values in prop::collection::vec(small_key(), 0..200),
        probes in prop::collection::vec(0..=64_u16, 1..=20),
    ) {
        let tree: TwoThreeTree<u16> = values.iter().copied().collect();
        let mut sorted = values;
        sorted.sort_unstable();

        for probe in probes {
            let at = sorted.partition_point(|&v| v < probe);
            let after = sorted.partition_point(|&v| v <= probe);

            let lb: Vec<u16> = tree.lower_bound(&probe).copied().collect();
            prop_assert_eq!(lb.as_slice(), &sorted[at..], "lower_bound({})", probe);

            let ub: Vec<u16> = tree.upper_bound(&probe).copied().collect();
            prop_assert_eq!(ub.as_slice(), &sorted[after..], "upper_bound({})", probe);

            let eq: Vec<u16> = tree.equal_range(&probe).copied().collect();
            prop_assert_eq!(eq.as_slice(), &sorted[at..after], "equal_range({})", probe);

            prop_assert_eq!(tree.count(&probe), after - at);
            prop_assert_eq!(tree.find(&probe).is_some(), after > at);
        }
    }
}

// ============================================================================
//  Split, splice, clone
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Splitting partitions exactly at the pivot and splicing the halves
    /// back together restores the original tree.
    #[test]
    fn split_then_splice_roundtrips(
        values in prop::collection::vec(small_key(), 0..150),
        pivot in 0..=64_u16,
    ) {
        let tree: TwoThreeTree<u16> = values.iter().copied().collect();
        let original = tree.clone();

        let (mut below, mut rest) = tree.split(&pivot);
        prop_assert_eq!(below.verify(), Ok(()));
        prop_assert_eq!(rest.verify(), Ok(()));
        prop_assert!(below.iter().all(|&v| v < pivot));
        prop_assert!(rest.iter().all(|&v| v >= pivot));
        prop_assert_eq!(below.len() + rest.len(), original.len());

        below.splice(&mut rest).unwrap();
        prop_assert_eq!(below.verify(), Ok(()));
        prop_assert!(rest.is_empty());
        prop_assert_eq!(&below, &original);
    }

    /// A clone is structurally sound, equal to its source, and detached
    /// from it.
    #[test]
    fn clone_equals_and_detaches(values in prop::collection::vec(small_key(), 0..150)) {
        let mut tree: TwoThreeTree<u16> = values.iter().copied().collect();

        let copy = tree.clone();
        prop_assert_eq!(copy.verify(), Ok(()));
        prop_assert_eq!(&copy, &tree);

        tree.insert_equal(99);
        prop_assert_eq!(copy.len() + 1, tree.len());
    }
}

// ============================================================================
//  Duplicate ordering under a key extractor
// ============================================================================

/// A record keyed by one field, so equal keys can carry distinct payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tagged {
    key: u16,
    seq: u32,
}

struct ByKey;

impl KeyOf<Tagged> for ByKey {
    type Key = u16;

    fn key_of(value: &Tagged) -> &u16 {
        &value.key
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Within a run of equal keys, values surface newest-first: each fresh
    /// duplicate lands in front of its equals.
    #[test]
    fn equal_keys_run_newest_first(keys in prop::collection::vec(small_key(), 1..100)) {
        let mut tree: TwoThreeTree<Tagged, ByKey> = TwoThreeTree::new();
        for (seq, key) in keys.iter().copied().enumerate() {
            tree.insert_equal(Tagged { key, seq: seq as u32 });
        }
        prop_assert_eq!(tree.verify(), Ok(()));

        for &key in &keys {
            let seqs: Vec<u32> = tree.equal_range(&key).map(|t| t.seq).collect();
            prop_assert!(
                seqs.windows(2).all(|w| w[0] > w[1]),
                "equals of {} not newest-first: {:?}",
                key,
                seqs
            );
        }
    }
}

// ============================================================================
//  Set facade against BTreeSet
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The set facade behaves exactly like `BTreeSet` for insert, remove
    /// and contains.
    #[test]
    fn set_matches_btreeset(ops in prop::collection::vec((small_key(), any::<bool>()), 0..200)) {
        let mut set: TwoThreeSet<u16> = TwoThreeSet::new();
        let mut oracle: BTreeSet<u16> = BTreeSet::new();

        for (key, insert) in ops {
            if insert {
                prop_assert_eq!(set.insert(key), oracle.insert(key));
            } else {
                prop_assert_eq!(set.remove(&key), oracle.remove(&key));
            }
            prop_assert_eq!(set.len(), oracle.len());
        }

        prop_assert_eq!(
            set.iter().copied().collect::<Vec<_>>(),
            oracle.iter().copied().collect::<Vec<_>>()
        );
    }
}
