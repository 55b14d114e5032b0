//! Canonical growth of polycubes.
//!
//! Given a canonical key of size n-1, [`Generator`] produces the canonical
//! key of every shape formed by adding one cell, and the [`filter`] keeps
//! exactly one growth path per shape. [`LevelChain`] stacks these steps so
//! a worker can grow seeds many sizes at once with bounded memory.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod candidates;
pub mod filter;
pub mod generator;
pub mod level;

pub use candidates::{boundary_cells, expansion_face};
pub use filter::{
    has_larger_connected_source, has_larger_single_neighbour, is_canonical_growth,
    is_connected_without,
};
pub use generator::{generate, Generator, MAX_FANOUT};
pub use level::{GenerationLevel, LevelChain};
