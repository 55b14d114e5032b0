//! Parallel polycube enumeration.
//!
//! [`GrowthPool`] runs a fixed set of worker threads, each driving its own
//! [`LevelChain`](polycube_grow::LevelChain) over seeds fetched a few at a
//! time from a shared buffer. Output is counted, collected, or packed and
//! streamed to a [`KeySink`](polycube_core::KeySink) through a dedicated
//! writer thread.
//!
//! [`driver::run`] layers the two-phase policy on top: grow small sizes on
//! one thread, then fan the collected keys out across the pool.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod driver;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod progress;
mod worker;

pub use config::{ConfigError, DriverConfig, RunConfig};
pub use driver::{count, DriverReport};
pub use error::RunError;
pub use metrics::RunReport;
pub use pool::{GrowthPool, RunOutput};
pub use progress::{ProgressEstimator, ProgressSnapshot};
