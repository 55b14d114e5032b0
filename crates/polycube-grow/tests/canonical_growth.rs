//! Properties of generation and filtering on small sizes.

use std::collections::HashSet;

use polycube_core::{Key, Spacemap};
use polycube_grow::{generate, is_canonical_growth, Generator, LevelChain};
use polycube_test_utils::{connected_shape, is_connected, orbit_representative, KNOWN_COUNTS};
use proptest::prelude::*;

fn enumerate(target: usize) -> Vec<Key> {
    let mut chain = LevelChain::new(2, target);
    chain.load(&[Key::base()]);
    let mut out = Vec::new();
    chain.drain(|keys| out.extend_from_slice(keys));
    out
}

#[test]
fn counts_match_known_sequence() {
    for n in 3..=7 {
        assert_eq!(enumerate(n).len() as u64, KNOWN_COUNTS[n], "size {n}");
    }
}

#[test]
fn no_two_outputs_share_a_shape() {
    for n in 3..=6 {
        let keys = enumerate(n);
        let reps: HashSet<Key> = keys.iter().map(orbit_representative).collect();
        assert_eq!(reps.len(), keys.len(), "size {n}");
    }
}

#[test]
fn outputs_are_connected_and_canonical() {
    for key in enumerate(6) {
        assert!(is_connected(&key));
        assert_eq!(key.canonical_rotation(), key);
        assert!(key.source_index() < key.len());
    }
}

#[test]
fn children_round_trip_through_rotation() {
    let mut gen = Generator::new();
    let mut map = Spacemap::new();
    for parent in enumerate(5) {
        let mut children = Vec::new();
        gen.generate(&parent, &mut children);
        for child in children.iter().filter(|c| is_canonical_growth(c, &mut map)) {
            assert_eq!(child.canonical_rotation().points(), child.points());
        }
    }
}

#[test]
fn every_shape_is_reachable_exactly_once() {
    // Growing every 5-cube by one cell, before filtering, must cover every
    // 6-cube shape; after filtering each shape appears once.
    let mut map = Spacemap::new();
    let mut all = HashSet::new();
    let mut accepted = Vec::new();
    for parent in enumerate(5) {
        let mut children = Vec::new();
        generate(&parent, &mut children);
        for child in children {
            all.insert(orbit_representative(&child));
            if is_canonical_growth(&child, &mut map) {
                accepted.push(child);
            }
        }
    }
    accepted.sort_unstable();
    accepted.dedup();
    assert_eq!(all.len() as u64, KNOWN_COUNTS[6]);
    assert_eq!(accepted.len() as u64, KNOWN_COUNTS[6]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn understated_source_index_is_rejected(shape in connected_shape(9)) {
        prop_assume!(shape.len() >= 3);
        let mut gen = Generator::new();
        let mut map = Spacemap::new();
        let mut children = Vec::new();
        gen.generate(&shape.canonical_rotation(), &mut children);
        let accepted: Vec<Key> = children
            .into_iter()
            .filter(|c| is_canonical_growth(c, &mut map))
            .collect();
        for child in &accepted {
            for s in 0..child.source_index() {
                prop_assert!(!is_canonical_growth(&child.with_source_index(s), &mut map));
            }
        }
        prop_assert!(map.is_clear());
    }

    #[test]
    fn generated_children_are_fixed_points(shape in connected_shape(10)) {
        prop_assume!(shape.len() >= 2);
        let mut children = Vec::new();
        generate(&shape.canonical_rotation(), &mut children);
        for child in &children {
            prop_assert_eq!(child.canonical_rotation(), *child);
            prop_assert_eq!(child.len(), shape.len() + 1);
        }
    }
}
