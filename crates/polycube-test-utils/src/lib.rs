//! Test utilities for polycube development.
//!
//! - [`reference`]: a slow, obviously-correct canonicalizer over all 24
//!   rotations, plus the published polycube counts.
//! - [`mocks`]: in-memory [`SeedSource`](polycube_core::SeedSource) and
//!   [`KeySink`](polycube_core::KeySink) implementations.
//! - [`strategies`]: proptest strategies producing random connected shapes.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod mocks;
pub mod reference;
pub mod strategies;

pub use mocks::{FailingSink, MemorySink, MemorySource, SinkContents};
pub use reference::{distinct_shapes, is_connected, orbit_representative, KNOWN_COUNTS};
pub use strategies::{build_shape, connected_shape};
