//! Seams between the growth engine and key storage.
//!
//! The engine reads seeds through [`SeedSource`] and writes results through
//! [`KeySink`]. Serialization is split out into [`KeyPacker`] so that each
//! worker can encode its own output without holding any shared lock; the
//! sink only ever sees finished bytes.

use crate::error::StreamError;
use crate::key::Key;

/// A stream of seed keys, all of one declared length.
pub trait SeedSource: Send {
    /// Length of every key in the stream.
    fn declared_length(&self) -> usize;

    /// Number of keys the stream claims to hold, when the format records
    /// it. Advisory: used for progress estimates only.
    fn declared_count(&self) -> Option<u64>;

    /// Append up to `max` keys to `out`, returning how many were appended.
    ///
    /// `Ok(0)` means the stream is exhausted. A record cut short by the end
    /// of the stream is [`StreamError::Truncated`], never a fabricated key.
    fn read_batch(&mut self, max: usize, out: &mut Vec<Key>) -> Result<usize, StreamError>;
}

/// Encodes keys into a sink's on-disk record layout.
///
/// A packer carries whatever scratch state its encoding needs, so one is
/// created per worker and never shared.
pub trait KeyPacker: Send {
    /// Append the encoding of `keys` to `out`.
    fn pack_keys(&mut self, keys: &[Key], out: &mut Vec<u8>) -> Result<(), StreamError>;
}

/// A destination for keys of one fixed length.
pub trait KeySink: Send {
    /// Length every written key must have.
    fn output_length(&self) -> usize;

    /// A fresh packer producing this sink's record layout.
    fn packer(&self) -> Box<dyn KeyPacker>;

    /// Append `count` already-packed records.
    fn write_packed(&mut self, bytes: &[u8], count: u64) -> Result<(), StreamError>;

    /// Pack and append `keys`.
    fn write_batch(&mut self, keys: &[Key]) -> Result<(), StreamError> {
        let mut bytes = Vec::new();
        self.packer().pack_keys(keys, &mut bytes)?;
        self.write_packed(&bytes, keys.len() as u64)
    }

    /// Record the final key total. Formats without a count field ignore it.
    fn write_final_count(&mut self, total: u64) -> Result<(), StreamError>;

    /// Push buffered bytes to the underlying writer.
    fn flush(&mut self) -> Result<(), StreamError>;

    /// Complete the stream after the final count: flush, and write any
    /// trailer the encoding needs. Nothing is written afterwards.
    fn finish(&mut self) -> Result<(), StreamError> {
        self.flush()
    }
}

/// Check that every key in `keys` has length `expected`.
pub fn check_lengths(keys: &[Key], expected: usize) -> Result<(), StreamError> {
    match keys.iter().find(|k| k.len() != expected) {
        Some(k) => Err(StreamError::LengthMismatch {
            expected,
            found: k.len(),
        }),
        None => Ok(()),
    }
}
