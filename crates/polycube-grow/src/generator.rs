//! Canonical children of a key.
//!
//! For each boundary cell of a parent key the generator finds the smallest
//! rotation of `parent + cell`. Rotating the parent is the expensive part, so
//! the parent's rotations are computed once per call: one set for cells
//! inside the current bounding box, and one set per box face for cells that
//! grow the box. Each cell then only rotates itself and merges into the
//! precomputed, already-sorted parent sequence.

use std::cmp::Ordering;

use polycube_core::{Key, Point, PointData, RotationMask, FACE_COUNT, MAX_LENGTH, ROTATION_COUNT};

use crate::candidates::{boundary_cells, expansion_face};

/// Largest number of children one parent can produce.
pub const MAX_FANOUT: usize = FACE_COUNT * MAX_LENGTH;

/// The parent key rotated every way a mask allows, against one bounding box.
#[derive(Clone, Copy)]
struct RotationSet {
    mask: RotationMask,
    dims: Point,
    parent_len: usize,
    keys: [Key; ROTATION_COUNT],
}

impl RotationSet {
    fn empty() -> Self {
        RotationSet {
            mask: RotationMask::from_bits(0),
            dims: Point::default(),
            parent_len: 0,
            keys: [Key::comparison_maximum(0); ROTATION_COUNT],
        }
    }

    fn fill(&mut self, key: &Key, dims: Point) {
        self.mask = RotationMask::for_dimensions(dims);
        self.dims = dims;
        self.parent_len = key.len();
        let mut data = [PointData::new(Point::ORIGIN, Point::ORIGIN); MAX_LENGTH];
        for (d, &p) in data.iter_mut().zip(key.points()) {
            *d = PointData::new(p, dims);
        }
        let data = &data[..key.len()];
        for r in self.mask.iter() {
            let rotated = &mut self.keys[r];
            *rotated = *key;
            let points = rotated.points_mut();
            for (dst, d) in points.iter_mut().zip(data) {
                *dst = d.rotate(r);
            }
            points.sort_unstable();
        }
    }

    /// Smallest child formed by adding `cell` (already in this set's box).
    ///
    /// Ties between rotations are broken toward the larger source index.
    fn best_child(&self, cell: Point) -> Key {
        let new_len = self.parent_len + 1;
        let data = PointData::new(cell, self.dims);
        let mut best = Key::comparison_maximum(new_len);
        let mut current = Key::comparison_maximum(new_len);
        for r in self.mask.iter() {
            let parent = self.keys[r].points();
            let Some((source, ord)) =
                merge_against(parent, data.rotate(r), best.points(), current.points_mut())
            else {
                continue;
            };
            if ord == Ordering::Less || source > best.source_index() {
                best = current.with_source_index(source);
            }
        }
        best
    }
}

/// Merge `cell` into the ascending `parent` sequence, writing into `out`.
///
/// Returns the insertion position and how the merged sequence compares to
/// `best`, or `None` as soon as it is known to be greater.
fn merge_against(
    parent: &[Point],
    cell: Point,
    best: &[Point],
    out: &mut [Point],
) -> Option<(usize, Ordering)> {
    let mut k = 0;
    let mut source = parent.len();
    let mut placed = false;
    let mut ord = Ordering::Equal;
    for (n, slot) in out.iter_mut().enumerate() {
        let next = if !placed && (k == parent.len() || cell < parent[k]) {
            placed = true;
            source = n;
            cell
        } else {
            k += 1;
            parent[k - 1]
        };
        if ord == Ordering::Equal {
            match next.cmp(&best[n]) {
                Ordering::Greater => return None,
                Ordering::Less => ord = Ordering::Less,
                Ordering::Equal => {}
            }
        }
        *slot = next;
    }
    Some((source, ord))
}

/// Reusable child generator. Holds the parent's rotation sets between
/// calls so nothing is allocated per parent.
pub struct Generator {
    interior: RotationSet,
    expanded: [RotationSet; FACE_COUNT],
}

impl Generator {
    /// A generator with empty rotation sets.
    pub fn new() -> Self {
        Generator {
            interior: RotationSet::empty(),
            expanded: [RotationSet::empty(); FACE_COUNT],
        }
    }

    /// Append one canonical child per boundary cell of `key` to `out`.
    ///
    /// Children are not filtered and may repeat: two cells of a symmetric
    /// parent can yield the same shape. Returns the number appended.
    pub fn generate(&mut self, key: &Key, out: &mut Vec<Key>) -> usize {
        debug_assert!(key.len() < MAX_LENGTH, "key already at capacity");
        let dims = key.dimensions();
        self.interior.fill(key, dims);
        for (face, set) in self.expanded.iter_mut().enumerate() {
            // Growing toward a low face shifts the shape up so the new cell
            // lands on coordinate 1.
            let shifted = if face >= 3 {
                key.offset_all(face - 3)
            } else {
                *key
            };
            set.fill(&shifted, dims.offset(face % 3));
        }

        let cells = boundary_cells(key);
        for &cell in &cells {
            let child = match expansion_face(cell, dims) {
                None => self.interior.best_child(cell),
                Some(face) if face >= 3 => self.expanded[face].best_child(cell.offset(face - 3)),
                Some(face) => self.expanded[face].best_child(cell),
            };
            out.push(child);
        }
        cells.len()
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot form of [`Generator::generate`].
pub fn generate(key: &Key, out: &mut Vec<Key>) -> usize {
    Generator::new().generate(key, out)
}
