//! Polycube: enumerate polycubes by canonical growth.
//!
//! Every polycube of size `n` is reached from exactly one polycube of size
//! `n - 1` by adding one cell, so shapes can be counted without storing more
//! than a few keys per thread. This facade re-exports the public API of the
//! sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use polycube::prelude::*;
//!
//! // Count directly.
//! assert_eq!(polycube::count(6, Some(2))?, 166);
//!
//! // Or grow every pentacube from the base case and keep the keys.
//! let config = RunConfig { threads: Some(2), progress: false, ..RunConfig::new(2, 5) };
//! let out = GrowthPool::new(config)?.with_seeds(vec![Key::base()])?.collect().run()?;
//! assert_eq!(out.keys.len(), 29);
//! # Ok::<(), RunError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `polycube-core` | points, rotations, keys, stream traits |
//! | [`grow`] | `polycube-grow` | candidate generation, filtering, level chains |
//! | [`format`] | `polycube-format` | bitface and pcube encodings |
//! | [`engine`] | `polycube-engine` | thread pool, configuration, driver |
//! | [`cli`] | | the `polycube` command line |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cli;

/// Points, rotations, keys, and the seed/sink traits (`polycube-core`).
pub use polycube_core as types;

/// Candidate generation, the canonical-growth filter, and level chains
/// (`polycube-grow`).
pub use polycube_grow as grow;

/// Bitface and pcube encodings (`polycube-format`).
///
/// [`format::open_source`] and [`format::create_sink`] open files as a
/// [`types::SeedSource`] or [`types::KeySink`].
pub use polycube_format as format;

/// Thread pool, run configuration, and the two-phase driver
/// (`polycube-engine`).
pub use polycube_engine as engine;

pub use polycube_engine::count;

/// Common imports for typical use.
pub mod prelude {
    // Keys and geometry
    pub use polycube_core::{Key, Point, MAX_LENGTH};

    // Streams
    pub use polycube_core::{KeySink, SeedSource};
    pub use polycube_format::{Compression, Format};

    // Errors
    pub use polycube_core::{KeyError, StreamError};
    pub use polycube_engine::{ConfigError, RunError};

    // Engine
    pub use polycube_engine::{
        DriverConfig, DriverReport, GrowthPool, RunConfig, RunOutput, RunReport,
    };
}
