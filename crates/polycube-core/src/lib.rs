//! Core types for polycube enumeration.
//!
//! This is the leaf crate of the workspace. It defines packed lattice
//! points, the cube rotation table, canonical keys, the per-worker scratch
//! lattice, error types, and the source/sink traits the engine is written
//! against.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod key;
pub mod point;
pub mod rotation;
pub mod spacemap;
pub mod traits;

pub use error::{KeyError, StreamError};
pub use key::{rotate_key, Key, MAX_LENGTH};
pub use point::{opposite, Point, PointData, FACE_COUNT, FACE_OFFSETS, MAX_COORD, SPACEMAP_SIZE};
pub use rotation::{RotationMask, ROTATIONS, ROTATION_COUNT};
pub use spacemap::Spacemap;
pub use traits::{check_lengths, KeyPacker, KeySink, SeedSource};
