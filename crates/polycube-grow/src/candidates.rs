//! Boundary cells of a shape.

use polycube_core::{Key, Point, FACE_COUNT};
use smallvec::SmallVec;

/// Upper bound on boundary cells: six faces per point of a full key.
pub const MAX_CANDIDATES: usize = FACE_COUNT * polycube_core::MAX_LENGTH;

/// Boundary cell buffer. Sized so it never spills for a valid key.
pub type Candidates = SmallVec<[Point; 256]>;

/// Every empty cell face-adjacent to `key`, ascending and without repeats.
///
/// Neighbours are collected per face, sorted, deduplicated, and then merged
/// against the parent's own sorted points to drop occupied cells.
pub fn boundary_cells(key: &Key) -> Candidates {
    let points = key.points();
    let mut all: Candidates = SmallVec::new();
    for face in 0..FACE_COUNT {
        all.extend(points.iter().map(|p| p.offset(face)));
    }
    all.sort_unstable();
    all.dedup();

    let mut out = Candidates::new();
    let mut occupied = points.iter().peekable();
    for cell in all {
        while occupied.next_if(|&&p| p < cell).is_some() {}
        if occupied.peek() != Some(&&cell) {
            out.push(cell);
        }
    }
    out
}

/// Which face of the bounding box `dims` a cell lies beyond.
///
/// Axes are scanned x, y, z; per axis a coordinate of 0 means the low face
/// (`axis + 3`) and a coordinate past the extent means the high face
/// (`axis`). `None` means the cell is inside the box.
pub fn expansion_face(cell: Point, dims: Point) -> Option<usize> {
    (0..3).find_map(|axis| {
        let c = cell.coord(axis);
        if c == 0 {
            Some(axis + 3)
        } else if c > dims.coord(axis) {
            Some(axis)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cube_has_six_neighbours() {
        let cells = boundary_cells(&Key::single());
        assert_eq!(cells.len(), 6);
        assert!(cells.windows(2).all(|w| w[0] < w[1]));
        assert!(!cells.contains(&Point::ORIGIN));
    }

    #[test]
    fn domino_has_ten_neighbours() {
        let cells = boundary_cells(&Key::base());
        assert_eq!(cells.len(), 10);
        for p in Key::base().points() {
            assert!(!cells.contains(p));
        }
    }

    #[test]
    fn shared_neighbours_counted_once() {
        // An L-tromino: (2, 2, 1) touches two of its cells.
        let key = Key::from_coords(&[[1, 1, 1], [2, 1, 1], [1, 2, 1]]).unwrap();
        let cells = boundary_cells(&key);
        assert_eq!(cells.iter().filter(|&&c| c == Point::from_coords(2, 2, 1)).count(), 1);
        assert_eq!(cells.len(), 13);
    }

    #[test]
    fn expansion_faces() {
        let dims = Point::from_coords(2, 1, 1);
        assert_eq!(expansion_face(Point::from_coords(1, 1, 1), dims), None);
        assert_eq!(expansion_face(Point::from_coords(3, 1, 1), dims), Some(0));
        assert_eq!(expansion_face(Point::from_coords(0, 1, 1), dims), Some(3));
        assert_eq!(expansion_face(Point::from_coords(1, 2, 1), dims), Some(1));
        assert_eq!(expansion_face(Point::from_coords(1, 0, 1), dims), Some(4));
        assert_eq!(expansion_face(Point::from_coords(2, 1, 2), dims), Some(2));
        assert_eq!(expansion_face(Point::from_coords(2, 1, 0), dims), Some(5));
    }
}
