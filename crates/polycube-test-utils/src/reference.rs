//! Brute-force reference results.

use std::collections::HashSet;

use polycube_core::{Key, ROTATION_COUNT};

/// Number of distinct polycubes of each size under rotation, indexed by
/// size (index 0 is unused).
pub const KNOWN_COUNTS: [u64; 11] = [
    0, 1, 1, 2, 8, 29, 166, 1023, 6922, 48311, 346543,
];

/// The smallest of all 24 rotations of a normalized key.
///
/// Two keys describe the same shape exactly when their representatives
/// are equal. Unlike `Key::canonical_rotation` this tries every rotation.
pub fn orbit_representative(key: &Key) -> Key {
    let key = key.normalized();
    (0..ROTATION_COUNT)
        .map(|r| key.rotated(r))
        .min()
        .unwrap_or(key)
}

/// Number of distinct shapes among `keys`.
pub fn distinct_shapes(keys: &[Key]) -> usize {
    keys.iter()
        .map(orbit_representative)
        .collect::<HashSet<_>>()
        .len()
}

/// Whether every key is face-connected.
pub fn is_connected(key: &Key) -> bool {
    let points = key.points();
    let Some(&first) = points.first() else {
        return true;
    };
    let mut seen = vec![first];
    let mut head = 0;
    while head < seen.len() {
        let p = seen[head];
        head += 1;
        for &q in points {
            let adjacent = p
                .coords()
                .iter()
                .zip(q.coords())
                .map(|(&a, b)| a.abs_diff(b) as u32)
                .sum::<u32>()
                == 1;
            if adjacent && !seen.contains(&q) {
                seen.push(q);
            }
        }
    }
    seen.len() == points.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_images_share_a_representative() {
        // An L-tromino in two orientations.
        let a = Key::from_coords(&[[1, 1, 1], [2, 1, 1], [1, 2, 1]]).unwrap();
        let b = Key::from_coords(&[[1, 1, 1], [1, 1, 2], [1, 2, 2]]).unwrap();
        assert_eq!(orbit_representative(&a), orbit_representative(&b));
        assert_eq!(distinct_shapes(&[a, b]), 1);
    }

    #[test]
    fn connectivity() {
        assert!(is_connected(&Key::base()));
        let split = Key::from_coords(&[[1, 1, 1], [3, 1, 1]]).unwrap();
        assert!(!is_connected(&split));
    }
}
