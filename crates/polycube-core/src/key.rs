//! Canonical keys: sorted, fixed-capacity point sequences.
//!
//! A [`Key`] is a value type. It is copied freely between growth levels and
//! threads; nothing in the workspace shares a key mutably.
//!
//! Identity (`Eq`, `Ord`, `Hash`) covers the point sequence only. The
//! `source_index` is growth bookkeeping: two keys describing the same cells
//! are the same shape whichever cell was added last.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::KeyError;
use crate::point::{Point, PointData, FACE_COUNT, MAX_COORD};
use crate::rotation::RotationMask;

/// Largest number of points a key can hold.
pub const MAX_LENGTH: usize = 30;

/// A shape as an ascending sequence of packed points.
#[derive(Clone, Copy)]
pub struct Key {
    points: [Point; MAX_LENGTH],
    len: u8,
    source_index: u8,
}

impl Key {
    /// A key of `len` copies of [`Point::MAX`].
    ///
    /// Compares greater than or equal to every valid key of the same
    /// length, which makes it the starting value for a minimum search.
    /// Also serves as a scratch key that callers fill through
    /// [`points_mut`](Self::points_mut).
    pub fn comparison_maximum(len: usize) -> Self {
        debug_assert!(len <= MAX_LENGTH);
        Key {
            points: [Point::MAX; MAX_LENGTH],
            len: len as u8,
            source_index: 0,
        }
    }

    /// The single-cube shape `[(1, 1, 1)]`.
    pub fn single() -> Self {
        let mut key = Self::comparison_maximum(1);
        key.points[0] = Point::ORIGIN;
        key
    }

    /// The two-cube shape `[(1, 1, 1), (2, 1, 1)]`, the root of all growth.
    pub fn base() -> Self {
        let mut key = Self::comparison_maximum(2);
        key.points[0] = Point::ORIGIN;
        key.points[1] = Point::from_coords(2, 1, 1);
        key
    }

    /// Build a key from arbitrary points.
    ///
    /// Points are sorted; every coordinate must lie in `1..=MAX_COORD` and
    /// no cell may repeat. The source index is set to 0.
    pub fn from_points(points: &[Point]) -> Result<Self, KeyError> {
        if points.is_empty() {
            return Err(KeyError::Empty);
        }
        if points.len() > MAX_LENGTH {
            return Err(KeyError::TooManyPoints {
                count: points.len(),
                max: MAX_LENGTH,
            });
        }
        for p in points {
            if p.coords().iter().any(|&c| c == 0 || c > MAX_COORD) {
                return Err(KeyError::CoordinateOutOfRange { coords: p.coords() });
            }
        }

        let mut key = Self::comparison_maximum(points.len());
        key.points[..points.len()].copy_from_slice(points);
        key.points_mut().sort_unstable();
        if let Some(w) = key.points().windows(2).find(|w| w[0] == w[1]) {
            return Err(KeyError::DuplicatePoint {
                coords: w[0].coords(),
            });
        }
        Ok(key)
    }

    /// Build a key from coordinate triples. See [`from_points`](Self::from_points).
    pub fn from_coords(coords: &[[u8; 3]]) -> Result<Self, KeyError> {
        if coords.len() > MAX_LENGTH {
            return Err(KeyError::TooManyPoints {
                count: coords.len(),
                max: MAX_LENGTH,
            });
        }
        for &[x, y, z] in coords {
            // Reject before packing so oversized values cannot bleed into
            // neighbouring fields.
            if [x, y, z].iter().any(|&c| c == 0 || c > MAX_COORD) {
                return Err(KeyError::CoordinateOutOfRange { coords: [x, y, z] });
            }
        }
        let points: Vec<Point> = coords
            .iter()
            .map(|&[x, y, z]| Point::from_coords(x, y, z))
            .collect();
        Self::from_points(&points)
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the key holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The occupied points in ascending order.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points[..self.len as usize]
    }

    /// Mutable access to the occupied points.
    ///
    /// Callers must leave the slice strictly ascending.
    #[inline]
    pub fn points_mut(&mut self) -> &mut [Point] {
        &mut self.points[..self.len as usize]
    }

    /// Position of the most recently added point.
    #[inline]
    pub fn source_index(&self) -> usize {
        self.source_index as usize
    }

    /// Overwrite the source index.
    #[inline]
    pub fn set_source_index(&mut self, index: usize) {
        debug_assert!(index < MAX_LENGTH);
        self.source_index = index as u8;
    }

    /// Copy with a different source index.
    pub fn with_source_index(mut self, index: usize) -> Self {
        self.set_source_index(index);
        self
    }

    /// Per-axis maximum coordinate, i.e. the bounding box extents of a
    /// normalized shape.
    pub fn dimensions(&self) -> Point {
        self.points()
            .iter()
            .fold(Point::default(), |acc, &p| acc.component_max(p))
    }

    /// Per-axis minimum coordinate.
    pub fn minimum(&self) -> Point {
        self.points()
            .iter()
            .fold(Point::MAX, |acc, &p| acc.component_min(p))
    }

    /// Translate every point one unit toward `face`.
    ///
    /// Translation along a single axis preserves point order.
    pub fn offset_all(&self, face: usize) -> Self {
        debug_assert!(face < FACE_COUNT);
        let mut out = *self;
        for p in out.points_mut() {
            *p = p.offset(face);
        }
        out
    }

    /// Translate so every axis minimum is 1 and re-sort.
    pub fn normalized(&self) -> Self {
        let min = self.minimum().coords();
        let mut out = *self;
        for p in out.points_mut() {
            let [x, y, z] = p.coords();
            *p = Point::from_coords(x + 1 - min[0], y + 1 - min[1], z + 1 - min[2]);
        }
        out.points_mut().sort_unstable();
        out
    }

    /// Rotate every point against this key's bounding box and re-sort.
    ///
    /// The key must be normalized; the result is normalized too.
    pub fn rotated(&self, rotation: usize) -> Self {
        let dims = self.dimensions();
        let mut out = *self;
        for p in out.points_mut() {
            *p = PointData::new(*p, dims).rotate(rotation);
        }
        out.points_mut().sort_unstable();
        out
    }

    /// The smallest rotation of this key over the rotation subset chosen
    /// by [`RotationMask::for_dimensions`].
    ///
    /// A stored canonical key is its own canonical rotation.
    pub fn canonical_rotation(&self) -> Self {
        let mask = RotationMask::for_dimensions(self.dimensions());
        mask.iter()
            .map(|r| self.rotated(r))
            .min()
            .unwrap_or(*self)
    }
}

/// Rotate `key` by `rotation` against its own bounding box.
pub fn rotate_key(key: &Key, rotation: usize) -> Key {
    key.rotated(rotation)
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.points() == other.points()
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    /// Lexicographic over the point sequence; the first differing point
    /// decides.
    fn cmp(&self, other: &Self) -> Ordering {
        self.points().cmp(other.points())
    }
}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.points().hash(state);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("points", &self.points())
            .field("source_index", &self.source_index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::ROTATION_COUNT;

    fn ell() -> Key {
        Key::from_coords(&[[1, 1, 1], [2, 1, 1], [1, 2, 1]]).unwrap()
    }

    #[test]
    fn base_and_single() {
        assert_eq!(Key::single().points(), &[Point::ORIGIN]);
        let base = Key::base();
        assert_eq!(base.len(), 2);
        assert_eq!(base.source_index(), 0);
        assert_eq!(base.dimensions().coords(), [2, 1, 1]);
    }

    #[test]
    fn from_coords_sorts() {
        let key = Key::from_coords(&[[1, 2, 1], [2, 1, 1], [1, 1, 1]]).unwrap();
        assert_eq!(key, ell());
        assert!(key.points().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn from_coords_rejects_bad_input() {
        assert_eq!(Key::from_coords(&[]), Err(KeyError::Empty));
        assert!(matches!(
            Key::from_coords(&[[0, 1, 1]]),
            Err(KeyError::CoordinateOutOfRange { .. })
        ));
        assert!(matches!(
            Key::from_coords(&[[31, 1, 1]]),
            Err(KeyError::CoordinateOutOfRange { .. })
        ));
        assert!(matches!(
            Key::from_coords(&[[1, 1, 1], [1, 1, 1]]),
            Err(KeyError::DuplicatePoint { coords: [1, 1, 1] })
        ));
        let line: Vec<[u8; 3]> = (1..=30).chain(1..=1).map(|x| [x, 1, 1]).collect();
        assert!(matches!(
            Key::from_coords(&line),
            Err(KeyError::TooManyPoints { count: 31, .. })
        ));
    }

    #[test]
    fn identity_ignores_source_index() {
        let a = ell();
        let b = ell().with_source_index(2);
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn comparison_maximum_dominates() {
        let max = Key::comparison_maximum(3);
        assert!(ell() < max);
        assert_eq!(max.source_index(), 0);
    }

    #[test]
    fn offset_all_preserves_order() {
        let key = ell();
        let shifted = key.offset_all(0);
        assert_eq!(shifted.minimum().coords(), [2, 1, 1]);
        assert!(shifted.points().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(shifted.normalized(), key);
    }

    #[test]
    fn every_rotation_is_normalized() {
        let key = Key::from_coords(&[[1, 1, 1], [2, 1, 1], [2, 2, 1], [2, 2, 2]]).unwrap();
        for r in 0..ROTATION_COUNT {
            let rotated = key.rotated(r);
            assert_eq!(rotated.minimum(), Point::ORIGIN, "rotation {r}");
            assert_eq!(rotated.len(), key.len());
        }
    }

    #[test]
    fn canonical_rotation_is_idempotent() {
        let key = Key::from_coords(&[[3, 1, 1], [3, 2, 1], [2, 2, 1], [1, 2, 1]]).unwrap();
        let canon = key.canonical_rotation();
        assert_eq!(canon.canonical_rotation(), canon);
        assert!(canon <= key);
    }
}
