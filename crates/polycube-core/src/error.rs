//! Error types shared across the polycube workspace.
//!
//! Geometry and growth are infallible in-memory computations; the only
//! recoverable failures are building a key from untrusted coordinates and
//! moving keys through a byte stream.

use std::error::Error;
use std::fmt;
use std::io;

/// Errors from building a [`Key`](crate::Key) out of raw coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyError {
    /// No points were supplied.
    Empty,
    /// More points than a key can hold.
    TooManyPoints {
        /// Number of points supplied.
        count: usize,
        /// Key capacity.
        max: usize,
    },
    /// A coordinate lies outside `1..=MAX_COORD`.
    CoordinateOutOfRange {
        /// The offending coordinate triple.
        coords: [u8; 3],
    },
    /// The same cell appears twice.
    DuplicatePoint {
        /// The repeated coordinate triple.
        coords: [u8; 3],
    },
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "key has no points"),
            Self::TooManyPoints { count, max } => {
                write!(f, "key has {count} points, capacity is {max}")
            }
            Self::CoordinateOutOfRange { coords: [x, y, z] } => {
                write!(f, "coordinate ({x}, {y}, {z}) out of range")
            }
            Self::DuplicatePoint { coords: [x, y, z] } => {
                write!(f, "duplicate point ({x}, {y}, {z})")
            }
        }
    }
}

impl Error for KeyError {}

/// Errors from reading or writing key streams.
#[derive(Debug)]
pub enum StreamError {
    /// An I/O error from the underlying reader or writer.
    Io(io::Error),
    /// The stream does not start with the expected magic bytes.
    InvalidMagic {
        /// The four bytes found.
        found: [u8; 4],
    },
    /// The stream is compressed with a scheme this build cannot decode.
    UnsupportedCompression {
        /// The compression flag found in the header.
        flag: u8,
    },
    /// The stream ended partway through a record.
    Truncated {
        /// Records fully read before the cut.
        records_read: u64,
    },
    /// The header declares a key length this build cannot represent.
    InvalidLength {
        /// The declared length.
        length: usize,
    },
    /// A record decodes to something that is not a valid key.
    MalformedRecord {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A batch holds keys of a different length than the stream declares.
    LengthMismatch {
        /// Length the stream was opened with.
        expected: usize,
        /// Length of the offending key.
        found: usize,
    },
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic { found } => {
                write!(f, "invalid magic bytes {found:02x?}")
            }
            Self::UnsupportedCompression { flag } => {
                write!(f, "unsupported compression flag {flag}")
            }
            Self::Truncated { records_read } => {
                write!(f, "stream truncated after {records_read} records")
            }
            Self::InvalidLength { length } => write!(f, "invalid key length {length}"),
            Self::MalformedRecord { detail } => write!(f, "malformed record: {detail}"),
            Self::LengthMismatch { expected, found } => {
                write!(f, "key length {found} does not match stream length {expected}")
            }
        }
    }
}

impl Error for StreamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StreamError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<KeyError> for StreamError {
    fn from(e: KeyError) -> Self {
        Self::MalformedRecord {
            detail: e.to_string(),
        }
    }
}
