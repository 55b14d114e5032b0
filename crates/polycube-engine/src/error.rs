//! Errors raised while a run is in progress.

use std::error::Error;
use std::fmt;

use polycube_core::StreamError;

use crate::config::ConfigError;

/// Failure of a pool run or a driver pass.
#[derive(Debug)]
pub enum RunError {
    /// The run was misconfigured.
    Config(ConfigError),
    /// Reading seeds or writing output failed.
    Stream(StreamError),
    /// A worker thread panicked.
    WorkerPanicked {
        /// Index of the worker.
        worker: usize,
    },
    /// The writer thread stopped before all output was delivered.
    WriterFailed {
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Stream(e) => write!(f, "stream: {e}"),
            Self::WorkerPanicked { worker } => write!(f, "worker {worker} panicked"),
            Self::WriterFailed { reason } => write!(f, "writer failed: {reason}"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Stream(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StreamError> for RunError {
    fn from(e: StreamError) -> Self {
        Self::Stream(e)
    }
}
