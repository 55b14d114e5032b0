//! The 24 proper rotations of a cube and the subset heuristic.
//!
//! Each entry of [`ROTATIONS`] names which [`PointData`](crate::PointData)
//! component becomes the new x, y and z. Components 0-2 are raw axes and
//! 3-5 their mirror images, so every entry is an axis permutation combined
//! with an even number of reflections.
//!
//! The table is grouped in six blocks of four. Within a block the source
//! axis of every output axis is fixed; the four entries differ only by
//! paired reflections:
//!
//! | block | rotations | new x | new y | new z |
//! |---|---|---|---|---|
//! | XY | 0-3   | x | y | z |
//! | XZ | 4-7   | x | z | y |
//! | YX | 8-11  | y | x | z |
//! | YZ | 12-15 | y | z | x |
//! | ZX | 16-19 | z | x | y |
//! | ZY | 20-23 | z | y | x |

use crate::point::Point;

/// Number of proper rotations of a cube.
pub const ROTATION_COUNT: usize = 24;

/// Component selection per rotation: `[new_x, new_y, new_z]`.
pub const ROTATIONS: [[u8; 3]; ROTATION_COUNT] = [
    [0, 1, 2],
    [0, 4, 5],
    [3, 1, 5],
    [3, 4, 2],
    [0, 2, 4],
    [0, 5, 1],
    [3, 2, 1],
    [3, 5, 4],
    [1, 0, 5],
    [1, 3, 2],
    [4, 0, 2],
    [4, 3, 5],
    [1, 2, 0],
    [1, 5, 3],
    [4, 2, 3],
    [4, 5, 0],
    [2, 0, 1],
    [2, 3, 4],
    [5, 0, 4],
    [5, 3, 1],
    [2, 1, 3],
    [2, 4, 0],
    [5, 1, 0],
    [5, 4, 3],
];

/// A subset of [`ROTATIONS`], one bit per rotation index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RotationMask(u32);

impl RotationMask {
    /// All 24 rotations.
    pub const ALL: RotationMask = RotationMask(0x00FF_FFFF);
    /// The 8 rotations keeping the x axis on x.
    pub const FIX_X: RotationMask = RotationMask(0x0000_00FF);
    /// The 8 rotations moving the y axis onto x.
    pub const FIX_Y: RotationMask = RotationMask(0x0000_FF00);
    /// The 8 rotations moving the z axis onto x.
    pub const FIX_Z: RotationMask = RotationMask(0x00FF_0000);
    /// Block XY.
    pub const XY: RotationMask = RotationMask(0x0000_000F);
    /// Block XZ.
    pub const XZ: RotationMask = RotationMask(0x0000_00F0);
    /// Block YX.
    pub const YX: RotationMask = RotationMask(0x0000_0F00);
    /// Block YZ.
    pub const YZ: RotationMask = RotationMask(0x0000_F000);
    /// Block ZX.
    pub const ZX: RotationMask = RotationMask(0x000F_0000);
    /// Block ZY.
    pub const ZY: RotationMask = RotationMask(0x00F0_0000);

    /// Build a mask from raw bits. Bits above 23 are dropped.
    pub const fn from_bits(bits: u32) -> Self {
        RotationMask(bits & 0x00FF_FFFF)
    }

    /// Raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether rotation `rotation` is in the subset.
    #[inline]
    pub const fn contains(self, rotation: usize) -> bool {
        self.0 & (1 << rotation) != 0
    }

    /// Number of rotations in the subset.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the subset is empty.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the rotation indices in ascending order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..ROTATION_COUNT).filter(move |&r| self.contains(r))
    }

    /// The rotations worth evaluating for a shape with bounding box `dims`.
    ///
    /// Rotations are restricted to those that land the extents in a fixed
    /// order: with all extents equal every rotation is a candidate; with
    /// two equal, only the 8 that put the odd axis on x; with all distinct,
    /// only the 4 that produce `x >= y >= z` extents.
    pub fn for_dimensions(dims: Point) -> Self {
        let [d0, d1, d2] = dims.coords();
        if d0 == d1 && d0 == d2 {
            Self::ALL
        } else if d1 == d2 {
            Self::FIX_X
        } else if d0 == d2 {
            Self::FIX_Y
        } else if d0 == d1 {
            Self::FIX_Z
        } else if d0 > d1 && d0 > d2 {
            if d1 > d2 {
                Self::XY
            } else {
                Self::XZ
            }
        } else if d1 > d0 && d1 > d2 {
            if d0 > d2 {
                Self::YX
            } else {
                Self::YZ
            }
        } else if d0 > d1 {
            Self::ZX
        } else {
            Self::ZY
        }
    }
}

/// The source axis each output axis reads from under `rotation`.
pub fn source_axes(rotation: usize) -> [usize; 3] {
    ROTATIONS[rotation].map(|c| (c % 3) as usize)
}

/// Bounding box extents after applying `rotation` to a box of `dims`.
pub fn rotated_dimensions(dims: Point, rotation: usize) -> Point {
    let d = dims.coords();
    let [a, b, c] = source_axes(rotation);
    Point::from_coords(d[a], d[b], d[c])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::PointData;
    use std::collections::HashSet;

    fn determinant(rotation: usize) -> i32 {
        // Build the signed permutation matrix and take its determinant.
        let mut m = [[0i32; 3]; 3];
        for (row, &c) in ROTATIONS[rotation].iter().enumerate() {
            let sign = if c < 3 { 1 } else { -1 };
            m[row][(c % 3) as usize] = sign;
        }
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    #[test]
    fn every_rotation_is_proper() {
        for r in 0..ROTATION_COUNT {
            assert_eq!(determinant(r), 1, "rotation {r} is a reflection");
        }
    }

    #[test]
    fn rotations_are_distinct() {
        let set: HashSet<[u8; 3]> = ROTATIONS.iter().copied().collect();
        assert_eq!(set.len(), ROTATION_COUNT);
    }

    #[test]
    fn blocks_share_source_axes() {
        for block in 0..6 {
            let axes = source_axes(block * 4);
            for r in block * 4..block * 4 + 4 {
                assert_eq!(source_axes(r), axes, "rotation {r}");
            }
        }
    }

    #[test]
    fn mask_sizes() {
        assert_eq!(RotationMask::ALL.len(), 24);
        assert_eq!(RotationMask::FIX_X.len(), 8);
        assert_eq!(RotationMask::XY.len(), 4);
        assert!(RotationMask::from_bits(0).is_empty());
    }

    #[test]
    fn mask_selection_by_extent() {
        let m = |x, y, z| RotationMask::for_dimensions(Point::from_coords(x, y, z));
        assert_eq!(m(2, 2, 2), RotationMask::ALL);
        assert_eq!(m(3, 1, 1), RotationMask::FIX_X);
        assert_eq!(m(1, 3, 1), RotationMask::FIX_Y);
        assert_eq!(m(1, 1, 3), RotationMask::FIX_Z);
        assert_eq!(m(3, 2, 1), RotationMask::XY);
        assert_eq!(m(3, 1, 2), RotationMask::XZ);
        assert_eq!(m(2, 3, 1), RotationMask::YX);
        assert_eq!(m(1, 3, 2), RotationMask::YZ);
        assert_eq!(m(2, 1, 3), RotationMask::ZX);
        assert_eq!(m(1, 2, 3), RotationMask::ZY);
    }

    #[test]
    fn distinct_extents_rotate_into_descending_order() {
        let dims = [(3, 2, 1), (3, 1, 2), (2, 3, 1), (1, 3, 2), (2, 1, 3), (1, 2, 3)];
        for (x, y, z) in dims {
            let d = Point::from_coords(x, y, z);
            for r in RotationMask::for_dimensions(d).iter() {
                assert_eq!(rotated_dimensions(d, r).coords(), [3, 2, 1], "dims {d:?} rotation {r}");
            }
        }
    }

    #[test]
    fn rotation_keeps_points_in_box() {
        let dims = Point::from_coords(3, 2, 4);
        for r in 0..ROTATION_COUNT {
            let rd = rotated_dimensions(dims, r);
            for x in 1..=3 {
                for y in 1..=2 {
                    for z in 1..=4 {
                        let p = PointData::new(Point::from_coords(x, y, z), dims).rotate(r);
                        let [px, py, pz] = p.coords();
                        assert!(px >= 1 && px <= rd.x());
                        assert!(py >= 1 && py <= rd.y());
                        assert!(pz >= 1 && pz <= rd.z());
                    }
                }
            }
        }
    }

    fn box_points(dims: Point) -> Vec<Point> {
        let mut points = Vec::new();
        for x in 1..=dims.x() {
            for y in 1..=dims.y() {
                for z in 1..=dims.z() {
                    points.push(Point::from_coords(x, y, z));
                }
            }
        }
        points
    }

    proptest::proptest! {
        #[test]
        fn composition_stays_in_table(
            x in 1u8..=4, y in 1u8..=4, z in 1u8..=4,
            a in 0usize..ROTATION_COUNT, b in 0usize..ROTATION_COUNT,
        ) {
            let dims = Point::from_coords(x, y, z);
            let mid = rotated_dimensions(dims, a);
            let points = box_points(dims);
            let composed: Vec<Point> = points
                .iter()
                .map(|&p| {
                    let once = PointData::new(p, dims).rotate(a);
                    PointData::new(once, mid).rotate(b)
                })
                .collect();
            let found = (0..ROTATION_COUNT).any(|c| {
                points
                    .iter()
                    .zip(&composed)
                    .all(|(&p, &q)| PointData::new(p, dims).rotate(c) == q)
            });
            proptest::prop_assert!(found, "rotation {} after {} is not in the table", b, a);
        }
    }
}
