//! Run configuration, validation, and error types.
//!
//! [`RunConfig`] describes one pass of the [`GrowthPool`](crate::GrowthPool):
//! grow seeds of `input_length` to `output_length` on a fixed set of
//! threads. [`DriverConfig`] describes a whole enumeration and is split into
//! one or two passes by [`driver::run`](crate::driver::run).

use std::error::Error;
use std::fmt;

use polycube_core::{KeySink, SeedSource, MAX_LENGTH};

/// Seeds handed to a worker per fetch.
pub const DEFAULT_FETCH_BATCH: usize = 5;

/// Streamed keys buffered before a flush is handed to the writer.
pub const DEFAULT_OUTPUT_CACHE: usize = 100_000;

/// Keys read from a [`SeedSource`] per refill of the seed buffer.
pub const SEED_REFILL: usize = 10_000;

/// Upper bound on an explicit thread count.
pub const MAX_THREADS: usize = 256;

/// Largest target the single-threaded first pass runs to by default.
pub const DEFAULT_SINGLE_THREAD_LENGTH: usize = 9;

// ── RunConfig ──────────────────────────────────────────────────────

/// Configuration for a single [`GrowthPool`](crate::GrowthPool) run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Length of every seed key. Minimum: 1.
    pub input_length: usize,
    /// Length of every emitted key. Must exceed `input_length` and be at
    /// most [`MAX_LENGTH`].
    pub output_length: usize,
    /// Worker thread count. `None` = auto-detect from
    /// `available_parallelism`.
    pub threads: Option<usize>,
    /// Seeds per worker fetch. Default: 5.
    pub fetch_batch: usize,
    /// Streamed keys accumulated before a flush. Default: 100 000.
    pub output_cache: usize,
    /// Log periodic remaining-time estimates. Default: true.
    pub progress: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_length: 2,
            output_length: 3,
            threads: None,
            fetch_batch: DEFAULT_FETCH_BATCH,
            output_cache: DEFAULT_OUTPUT_CACHE,
            progress: true,
        }
    }
}

impl RunConfig {
    /// A default configuration growing `input_length` to `output_length`.
    pub fn new(input_length: usize, output_length: usize) -> Self {
        Self {
            input_length,
            output_length,
            ..Self::default()
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_length < 1
            || self.output_length <= self.input_length
            || self.output_length > MAX_LENGTH
        {
            return Err(ConfigError::InvalidLengths {
                input_length: self.input_length,
                output_length: self.output_length,
            });
        }
        if self.fetch_batch == 0 {
            return Err(ConfigError::ZeroFetchBatch);
        }
        if self.output_cache == 0 {
            return Err(ConfigError::ZeroOutputCache);
        }
        Ok(())
    }

    /// Resolve the worker thread count.
    ///
    /// An explicit count is clamped to `[1, MAX_THREADS]`. Otherwise
    /// `available_parallelism()` is used, falling back to 4.
    pub fn resolved_thread_count(&self) -> usize {
        match self.threads {
            Some(n) => n.clamp(1, MAX_THREADS),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .min(MAX_THREADS),
        }
    }
}

// ── DriverConfig ───────────────────────────────────────────────────

/// Configuration for a full enumeration up to `target_length`.
pub struct DriverConfig {
    /// Size of the shapes to count.
    pub target_length: usize,
    /// Sizes up to this are grown on one thread before the multi-threaded
    /// pass takes over. Default: 9. Values below 3 skip the first pass.
    pub single_thread_length: usize,
    /// Thread count for the multi-threaded pass.
    pub threads: Option<usize>,
    /// Log periodic remaining-time estimates.
    pub progress: bool,
    /// Seeds to start from instead of the base case. Its declared length
    /// becomes the starting size.
    pub source: Option<Box<dyn SeedSource>>,
    /// Where to write the shapes of `target_length`. `None` only counts.
    pub sink: Option<Box<dyn KeySink>>,
}

impl DriverConfig {
    /// Count the shapes of `target_length` with every other setting at its
    /// default.
    pub fn new(target_length: usize) -> Self {
        Self {
            target_length,
            single_thread_length: DEFAULT_SINGLE_THREAD_LENGTH,
            threads: None,
            progress: true,
            source: None,
            sink: None,
        }
    }
}

impl fmt::Debug for DriverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverConfig")
            .field("target_length", &self.target_length)
            .field("single_thread_length", &self.single_thread_length)
            .field("threads", &self.threads)
            .field("progress", &self.progress)
            .field(
                "source_length",
                &self.source.as_ref().map(|s| s.declared_length()),
            )
            .field("sink_length", &self.sink.as_ref().map(|s| s.output_length()))
            .finish()
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected before any growth work starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Lengths do not describe a growth of at least one cell within
    /// `1..=MAX_LENGTH`.
    InvalidLengths {
        /// The configured seed length.
        input_length: usize,
        /// The configured output length.
        output_length: usize,
    },
    /// `fetch_batch` is zero.
    ZeroFetchBatch,
    /// `output_cache` is zero.
    ZeroOutputCache,
    /// A seed key or seed source disagrees with `input_length`.
    SeedLengthMismatch {
        /// The configured seed length.
        expected: usize,
        /// The length actually supplied.
        found: usize,
    },
    /// The sink's fixed length disagrees with `output_length`.
    SinkLengthMismatch {
        /// The configured output length.
        expected: usize,
        /// The sink's declared length.
        found: usize,
    },
    /// The OS refused to spawn a worker or writer thread.
    ThreadSpawnFailed {
        /// The underlying error message.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLengths {
                input_length,
                output_length,
            } => write!(
                f,
                "cannot grow length {input_length} to {output_length} \
                 (need 1 <= input < output <= {MAX_LENGTH})"
            ),
            Self::ZeroFetchBatch => write!(f, "fetch_batch must be at least 1"),
            Self::ZeroOutputCache => write!(f, "output_cache must be at least 1"),
            Self::SeedLengthMismatch { expected, found } => {
                write!(f, "seed length {found} does not match input length {expected}")
            }
            Self::SinkLengthMismatch { expected, found } => {
                write!(f, "sink length {found} does not match output length {expected}")
            }
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for ConfigError {}
