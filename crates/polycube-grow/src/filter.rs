//! Canonical-growth filter.
//!
//! A shape of size n is reachable from every connected (n-1)-subshape, so
//! the generator produces it many times. Only the copy whose last-added
//! point (`source_index`) is the highest-index point that could have been
//! added last survives. A point with a higher index "could have been added
//! last" exactly when removing it leaves the rest connected.
//!
//! Both checks mark the shape in the caller's [`Spacemap`] and unmark it
//! again before returning on every path.

use polycube_core::{Key, Point, Spacemap, FACE_COUNT, MAX_LENGTH};
use smallvec::SmallVec;

/// Whether some point above the source index is a leaf (exactly one
/// occupied neighbour). A leaf can always be removed without disconnecting
/// the shape, so this is a cheap sufficient test for rejection.
pub fn has_larger_single_neighbour(key: &Key, spacemap: &mut Spacemap) -> bool {
    let points = key.points();
    spacemap.mark_all(points);
    let found = (key.source_index() + 1..points.len())
        .rev()
        .any(|i| spacemap.count_neighbours(points[i]) == 1);
    spacemap.clear_all(points);
    found
}

/// Whether the shape minus `points[index]` is still face-connected.
///
/// Flood-fills from point 0, so `index` must not be 0.
pub fn is_connected_without(key: &Key, index: usize, spacemap: &mut Spacemap) -> bool {
    debug_assert!(index > 0 && index < key.len());
    let points = key.points();
    let target = points.len() - 1;

    spacemap.mark_all(&points[1..]);
    spacemap.unmark(points[index]);

    let mut reached: SmallVec<[Point; MAX_LENGTH]> = SmallVec::new();
    reached.push(points[0]);
    let mut head = 0;
    while head < reached.len() && reached.len() < target {
        let p = reached[head];
        head += 1;
        for face in 0..FACE_COUNT {
            let n = p.offset(face);
            if spacemap.take(n) {
                reached.push(n);
            }
        }
    }

    spacemap.clear_all(points);
    reached.len() >= target
}

/// Whether some point above the source index can be removed while keeping
/// the shape connected. Checks candidates from the highest index down.
pub fn has_larger_connected_source(key: &Key, spacemap: &mut Spacemap) -> bool {
    (key.source_index() + 1..key.len())
        .rev()
        .any(|i| is_connected_without(key, i, spacemap))
}

/// Whether `key` is the unique accepted growth of its shape.
pub fn is_canonical_growth(key: &Key, spacemap: &mut Spacemap) -> bool {
    !has_larger_single_neighbour(key, spacemap) && !has_larger_connected_source(key, spacemap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(coords: &[[u8; 3]], source: usize) -> Key {
        Key::from_coords(coords).unwrap().with_source_index(source)
    }

    #[test]
    fn last_index_source_is_always_accepted() {
        let mut map = Spacemap::new();
        let k = key(&[[1, 1, 1], [2, 1, 1], [3, 1, 1]], 2);
        assert!(is_canonical_growth(&k, &mut map));
        assert!(map.is_clear());
    }

    #[test]
    fn leaf_above_source_rejects() {
        let mut map = Spacemap::new();
        // Straight tromino grown at the middle: point 2 is a leaf.
        let k = key(&[[1, 1, 1], [2, 1, 1], [3, 1, 1]], 1);
        assert!(has_larger_single_neighbour(&k, &mut map));
        assert!(!is_canonical_growth(&k, &mut map));
        assert!(map.is_clear());
    }

    #[test]
    fn cycle_needs_connectivity_check() {
        let mut map = Spacemap::new();
        // A 2x2 square: every point has two neighbours, so only the
        // connectivity test can reject.
        let k = key(&[[1, 1, 1], [2, 1, 1], [1, 2, 1], [2, 2, 1]], 2);
        assert!(!has_larger_single_neighbour(&k, &mut map));
        assert!(has_larger_connected_source(&k, &mut map));
        assert!(map.is_clear());
    }

    #[test]
    fn cut_point_is_not_a_source() {
        let mut map = Spacemap::new();
        // Removing the middle of a straight line disconnects it.
        let k = key(&[[1, 1, 1], [2, 1, 1], [3, 1, 1]], 0);
        assert!(!is_connected_without(&k, 1, &mut map));
        assert!(is_connected_without(&k, 2, &mut map));
        assert!(map.is_clear());
    }
}
