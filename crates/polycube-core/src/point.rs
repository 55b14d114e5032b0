//! Packed lattice points and face offsets.
//!
//! A [`Point`] packs three 5-bit coordinates into one `u16`:
//!
//! ```text
//!  15  14      10 9       5 4       0
//! [ 0 |    z    |    y    |    x    ]
//! ```
//!
//! Because `z` occupies the high bits, comparing the raw integers orders
//! points z-then-y-then-x, and a face neighbour is always `raw ± stride`.
//! Shape coordinates start at 1 on every axis so that stepping toward a
//! low face never underflows.

use std::fmt;

/// Number of bits per packed axis.
pub const AXIS_BITS: u32 = 5;

/// Largest value a packed axis field can hold.
pub const FIELD_MAX: u8 = 31;

/// Largest coordinate a point of a stored shape may carry.
///
/// One below [`FIELD_MAX`] so that every face neighbour of a shape point is
/// still representable without carrying into the next axis.
pub const MAX_COORD: u8 = 30;

/// Number of cells in a dense lattice indexed by the packed point value.
pub const SPACEMAP_SIZE: usize = 1 << (3 * AXIS_BITS);

/// Number of faces of a unit cube.
pub const FACE_COUNT: usize = 6;

const MASK_X: u16 = 0x001F;
const MASK_Y: u16 = 0x03E0;
const MASK_Z: u16 = 0x7C00;
const AXIS_MASKS: [u16; 3] = [MASK_X, MASK_Y, MASK_Z];

/// Per-face raw offsets. Faces 0-2 step +1 along x, y, z; faces 3-5 step -1.
pub const FACE_OFFSETS: [i32; FACE_COUNT] = [1, 32, 1024, -1, -32, -1024];

/// A lattice point packed into a fixed-width integer.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point(u16);

impl Point {
    /// Largest representable point. Used as "+infinity" in merge loops.
    pub const MAX: Point = Point(0x7FFF);

    /// Base point `(1, 1, 1)`, the minimum corner of every stored shape.
    pub const ORIGIN: Point = Point(1 + (1 << 5) + (1 << 10));

    /// Pack three coordinates. Each must be `<= FIELD_MAX`.
    #[inline]
    pub const fn from_coords(x: u8, y: u8, z: u8) -> Self {
        debug_assert!(x <= FIELD_MAX && y <= FIELD_MAX && z <= FIELD_MAX);
        Point((x as u16) | ((y as u16) << AXIS_BITS) | ((z as u16) << (2 * AXIS_BITS)))
    }

    /// Wrap a raw packed value. Bits above the z field are discarded.
    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Point(raw & 0x7FFF)
    }

    /// The raw packed value.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// The packed value as a dense lattice index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// X coordinate.
    #[inline]
    pub const fn x(self) -> u8 {
        (self.0 & MASK_X) as u8
    }

    /// Y coordinate.
    #[inline]
    pub const fn y(self) -> u8 {
        ((self.0 & MASK_Y) >> AXIS_BITS) as u8
    }

    /// Z coordinate.
    #[inline]
    pub const fn z(self) -> u8 {
        ((self.0 & MASK_Z) >> (2 * AXIS_BITS)) as u8
    }

    /// Coordinate along `axis` (0 = x, 1 = y, 2 = z).
    #[inline]
    pub fn coord(self, axis: usize) -> u8 {
        ((self.0 & AXIS_MASKS[axis]) >> (AXIS_BITS as usize * axis)) as u8
    }

    /// All three coordinates.
    #[inline]
    pub const fn coords(self) -> [u8; 3] {
        [self.x(), self.y(), self.z()]
    }

    /// Shift one unit toward `face`.
    ///
    /// The caller guarantees the shifted coordinate stays within
    /// `0..=FIELD_MAX`; nothing here detects carries between fields.
    #[inline]
    pub fn offset(self, face: usize) -> Point {
        debug_assert!(self.can_offset(face), "offset of {self:?} toward face {face} wraps");
        Point((i32::from(self.0) + FACE_OFFSETS[face]) as u16)
    }

    /// Whether [`offset`](Self::offset) toward `face` stays in range.
    #[inline]
    pub fn can_offset(self, face: usize) -> bool {
        let c = self.coord(face % 3);
        if face < 3 {
            c < FIELD_MAX
        } else {
            c > 0
        }
    }

    /// Per-axis maximum of two points, used to grow a bounding box.
    #[inline]
    pub fn component_max(self, other: Point) -> Point {
        let mut raw = 0;
        for mask in AXIS_MASKS {
            raw |= (self.0 & mask).max(other.0 & mask);
        }
        Point(raw)
    }

    /// Per-axis minimum of two points.
    #[inline]
    pub fn component_min(self, other: Point) -> Point {
        let mut raw = 0;
        for mask in AXIS_MASKS {
            raw |= (self.0 & mask).min(other.0 & mask);
        }
        Point(raw)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x(), self.y(), self.z())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The face pointing the opposite direction.
#[inline]
pub const fn opposite(face: usize) -> usize {
    (face + 3) % FACE_COUNT
}

/// A point projected against a bounding box for rotation.
///
/// Components 0-2 are the raw coordinates; 3-5 are their mirror images
/// `dim - c + 1`, so a reflection is just a different component pick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointData([u8; 6]);

impl PointData {
    /// Project `point` against the bounding box `dims`.
    #[inline]
    pub fn new(point: Point, dims: Point) -> Self {
        let [x, y, z] = point.coords();
        let [dx, dy, dz] = dims.coords();
        PointData([x, y, z, dx + 1 - x, dy + 1 - y, dz + 1 - z])
    }

    /// Apply rotation `rotation` (see [`ROTATIONS`](crate::rotation::ROTATIONS)).
    #[inline]
    pub fn rotate(&self, rotation: usize) -> Point {
        let [r0, r1, r2] = crate::rotation::ROTATIONS[rotation];
        let p = &self.0;
        Point::from_coords(p[r0 as usize], p[r1 as usize], p[r2 as usize])
    }

    /// The six projected components.
    pub fn components(&self) -> [u8; 6] {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn packing_layout() {
        let p = Point::from_coords(3, 5, 7);
        assert_eq!(p.raw(), 3 + (5 << 5) + (7 << 10));
        assert_eq!(p.coords(), [3, 5, 7]);
        assert_eq!(p.coord(0), 3);
        assert_eq!(p.coord(1), 5);
        assert_eq!(p.coord(2), 7);
    }

    #[test]
    fn origin_and_max() {
        assert_eq!(Point::ORIGIN.coords(), [1, 1, 1]);
        assert_eq!(Point::MAX.coords(), [31, 31, 31]);
        assert_eq!(Point::MAX.index(), SPACEMAP_SIZE - 1);
    }

    #[test]
    fn offsets_move_one_axis() {
        let p = Point::from_coords(4, 4, 4);
        assert_eq!(p.offset(0).coords(), [5, 4, 4]);
        assert_eq!(p.offset(1).coords(), [4, 5, 4]);
        assert_eq!(p.offset(2).coords(), [4, 4, 5]);
        assert_eq!(p.offset(3).coords(), [3, 4, 4]);
        assert_eq!(p.offset(4).coords(), [4, 3, 4]);
        assert_eq!(p.offset(5).coords(), [4, 4, 3]);
    }

    #[test]
    fn opposite_faces() {
        for face in 0..FACE_COUNT {
            assert_eq!(opposite(opposite(face)), face);
            let p = Point::from_coords(2, 2, 2);
            assert_eq!(p.offset(face).offset(opposite(face)), p);
        }
    }

    #[test]
    fn can_offset_detects_edges() {
        let low = Point::from_coords(0, 1, 1);
        assert!(!low.can_offset(3));
        assert!(low.can_offset(4));
        let high = Point::from_coords(1, 1, FIELD_MAX);
        assert!(!high.can_offset(2));
    }

    #[test]
    fn order_is_z_major() {
        let a = Point::from_coords(9, 9, 1);
        let b = Point::from_coords(1, 1, 2);
        assert!(a < b);
        let c = Point::from_coords(9, 1, 1);
        let d = Point::from_coords(1, 2, 1);
        assert!(c < d);
    }

    #[test]
    fn component_max_min() {
        let a = Point::from_coords(1, 7, 3);
        let b = Point::from_coords(4, 2, 3);
        assert_eq!(a.component_max(b).coords(), [4, 7, 3]);
        assert_eq!(a.component_min(b).coords(), [1, 2, 3]);
    }

    #[test]
    fn point_data_mirrors_against_box() {
        let dims = Point::from_coords(3, 2, 1);
        let data = PointData::new(Point::from_coords(1, 2, 1), dims);
        assert_eq!(data.components(), [1, 2, 1, 3, 1, 1]);
        // Identity rotation reproduces the point.
        assert_eq!(data.rotate(0), Point::from_coords(1, 2, 1));
    }

    proptest! {
        #[test]
        fn packed_order_matches_zyx_tuple(
            ax in 0u8..=FIELD_MAX, ay in 0u8..=FIELD_MAX, az in 0u8..=FIELD_MAX,
            bx in 0u8..=FIELD_MAX, by in 0u8..=FIELD_MAX, bz in 0u8..=FIELD_MAX,
        ) {
            let a = Point::from_coords(ax, ay, az);
            let b = Point::from_coords(bx, by, bz);
            prop_assert_eq!(a.cmp(&b), (az, ay, ax).cmp(&(bz, by, bx)));
        }
    }
}
