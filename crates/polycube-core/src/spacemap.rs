//! Dense occupancy scratch lattice.
//!
//! One [`Spacemap`] lives per worker. Every user marks the cells it touches
//! and unmarks exactly those cells before returning, so the map is all-clear
//! between calls without a full reset.

use crate::point::{Point, FACE_OFFSETS, SPACEMAP_SIZE};

/// Boolean lattice indexed by packed point value.
#[derive(Clone)]
pub struct Spacemap {
    cells: Vec<u8>,
}

impl Spacemap {
    /// An all-clear lattice covering every packed point.
    pub fn new() -> Self {
        Spacemap {
            cells: vec![0; SPACEMAP_SIZE],
        }
    }

    /// Set `point`.
    #[inline]
    pub fn mark(&mut self, point: Point) {
        self.cells[point.index()] = 1;
    }

    /// Clear `point`.
    #[inline]
    pub fn unmark(&mut self, point: Point) {
        self.cells[point.index()] = 0;
    }

    /// Whether `point` is set.
    #[inline]
    pub fn is_marked(&self, point: Point) -> bool {
        self.cells[point.index()] != 0
    }

    /// Clear `point`, returning whether it was set.
    #[inline]
    pub fn take(&mut self, point: Point) -> bool {
        std::mem::replace(&mut self.cells[point.index()], 0) != 0
    }

    /// Set every point in `points`.
    pub fn mark_all(&mut self, points: &[Point]) {
        for &p in points {
            self.mark(p);
        }
    }

    /// Clear every point in `points`.
    pub fn clear_all(&mut self, points: &[Point]) {
        for &p in points {
            self.unmark(p);
        }
    }

    /// Number of set face neighbours of `point`.
    ///
    /// `point` must not sit on the lattice edge; shape points never do.
    #[inline]
    pub fn count_neighbours(&self, point: Point) -> usize {
        let base = point.index() as isize;
        FACE_OFFSETS
            .iter()
            .filter(|&&off| self.cells[(base + off as isize) as usize] != 0)
            .count()
    }

    /// Whether no cell is set. Linear in the lattice size; meant for
    /// assertions in tests.
    pub fn is_clear(&self) -> bool {
        self.cells.iter().all(|&c| c == 0)
    }
}

impl Default for Spacemap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_and_clear() {
        let mut map = Spacemap::new();
        let p = Point::from_coords(3, 4, 5);
        assert!(!map.is_marked(p));
        map.mark(p);
        assert!(map.is_marked(p));
        assert!(map.take(p));
        assert!(!map.take(p));
        assert!(map.is_clear());
    }

    #[test]
    fn neighbour_count() {
        let mut map = Spacemap::new();
        let centre = Point::from_coords(2, 2, 2);
        let pts = [
            centre,
            centre.offset(0),
            centre.offset(4),
            Point::from_coords(3, 3, 2),
        ];
        map.mark_all(&pts);
        assert_eq!(map.count_neighbours(centre), 2);
        assert_eq!(map.count_neighbours(centre.offset(0)), 2);
        map.clear_all(&pts);
        assert!(map.is_clear());
    }
}
