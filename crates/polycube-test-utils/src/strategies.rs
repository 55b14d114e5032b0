//! Proptest strategies.

use std::collections::HashSet;

use polycube_core::{Key, MAX_LENGTH};
use proptest::prelude::*;

const STEPS: [(i16, i16, i16); 6] = [
    (1, 0, 0),
    (0, 1, 0),
    (0, 0, 1),
    (-1, 0, 0),
    (0, -1, 0),
    (0, 0, -1),
];

/// Grow a connected shape of at most `max_len` cells by attaching cells to
/// earlier cells.
///
/// Each `(pick, face)` choice attaches a new cell on `face` of the cell at
/// `pick % cells.len()`; choices that land on an occupied cell are skipped.
/// The result is normalized so every axis minimum is 1.
pub fn build_shape(choices: &[(usize, usize)], max_len: usize) -> Key {
    let max_len = max_len.clamp(1, MAX_LENGTH);
    let mut cells: Vec<(i16, i16, i16)> = vec![(0, 0, 0)];
    let mut seen: HashSet<(i16, i16, i16)> = cells.iter().copied().collect();
    for &(pick, face) in choices {
        if cells.len() == max_len {
            break;
        }
        let (x, y, z) = cells[pick % cells.len()];
        let (dx, dy, dz) = STEPS[face % 6];
        let cell = (x + dx, y + dy, z + dz);
        if seen.insert(cell) {
            cells.push(cell);
        }
    }
    let min_x = cells.iter().map(|c| c.0).min().unwrap_or(0);
    let min_y = cells.iter().map(|c| c.1).min().unwrap_or(0);
    let min_z = cells.iter().map(|c| c.2).min().unwrap_or(0);
    let coords: Vec<[u8; 3]> = cells
        .iter()
        .map(|&(x, y, z)| {
            [
                (x - min_x + 1) as u8,
                (y - min_y + 1) as u8,
                (z - min_z + 1) as u8,
            ]
        })
        .collect();
    Key::from_coords(&coords).expect("grown shape fits the lattice")
}

/// Random connected shapes of 1 to `max_len` cells.
pub fn connected_shape(max_len: usize) -> impl Strategy<Value = Key> {
    prop::collection::vec((any::<usize>(), 0usize..6), 0..4 * max_len.max(1))
        .prop_map(move |choices| build_shape(&choices, max_len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::is_connected;

    #[test]
    fn empty_choices_give_single_cube() {
        assert_eq!(build_shape(&[], 4), Key::single());
    }

    #[test]
    fn repeated_cells_are_skipped() {
        let key = build_shape(&[(0, 0), (0, 0), (1, 3)], 4);
        assert_eq!(key, Key::base());
    }

    proptest! {
        #[test]
        fn shapes_are_connected_and_bounded(key in connected_shape(12)) {
            prop_assert!(key.len() <= 12);
            prop_assert!(is_connected(&key));
            prop_assert_eq!(key.minimum(), polycube_core::Point::ORIGIN);
        }
    }
}
