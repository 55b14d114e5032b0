//! Compact "bitface" encoding.
//!
//! A shape is stored as the face bits of a breadth-first walk. Starting at
//! its first point, every examined point emits one bit per face saying
//! whether that face leads to a not-yet-discovered point of the shape. The
//! face back to the point that discovered it is skipped, so the first point
//! costs 6 bits and every later one 5. The final point is never examined.
//!
//! ```text
//! [length u8] [record 0] [record 1] ...
//! record = ceil((6 + 5 * (n - 2)) / 8) bytes, bits LSB-first
//! ```
//!
//! Decoding replays the walk from `(1, 1, 1)`, normalizes, and sorts.
//! A compressed stream is the same bytes, length byte included, inside one
//! gzip member.

use std::io::{Read, Write};

use polycube_core::{
    check_lengths, opposite, Key, KeyPacker, KeySink, Point, SeedSource, Spacemap, StreamError,
    FACE_COUNT, MAX_LENGTH,
};
use tracing::warn;

use crate::codec::{get_bit, read_record, read_u8, set_bit, write_u8};
use crate::compress::{BodyReader, BodyWriter, Compression};

/// Placeholder face for the walk's first point; its opposite matches no face.
const NO_FACE: usize = FACE_COUNT;

fn back_face(face: usize) -> usize {
    if face == NO_FACE {
        NO_FACE
    } else {
        opposite(face)
    }
}

/// Bytes per record for shapes of `length` cells.
pub const fn key_size(length: usize) -> usize {
    if length < 2 {
        return 1;
    }
    (6 + 5 * (length - 2)).div_ceil(8)
}

/// Encode `key` into `out`, which must be `key_size(key.len())` zeroed bytes.
///
/// Returns the number of bits examined. `spacemap` is left clear.
pub fn pack_key(key: &Key, out: &mut [u8], spacemap: &mut Spacemap) -> usize {
    let points = key.points();
    let len = points.len();
    let mut order = [Point::default(); MAX_LENGTH];
    let mut faces = [NO_FACE; MAX_LENGTH];
    order[0] = points[0];
    let mut found = 1;
    let mut bit = 0;

    spacemap.mark_all(&points[1..]);
    for i in 0..len.saturating_sub(1) {
        if i >= found || found == len {
            break;
        }
        let skip = back_face(faces[i]);
        for face in (0..FACE_COUNT).filter(|&f| f != skip) {
            let next = order[i].offset(face);
            if spacemap.take(next) {
                set_bit(out, bit);
                order[found] = next;
                faces[found] = face;
                found += 1;
            }
            bit += 1;
        }
    }
    // A disconnected key leaves cells marked.
    spacemap.clear_all(points);
    bit
}

/// Decode one record of a `length`-cell shape.
///
/// A record that reconstructs the wrong number of points is logged and
/// passed through with the points it does describe.
pub fn unpack_key(record: &[u8], length: usize) -> Result<Key, StreamError> {
    let mut cells = [[0i16; 3]; MAX_LENGTH];
    let mut faces = [NO_FACE; MAX_LENGTH];
    cells[0] = [1, 1, 1];
    let mut found = 1;
    let mut overflow = false;
    let mut bit = 0;

    for i in 0..length.saturating_sub(1) {
        if i >= found {
            break;
        }
        let skip = back_face(faces[i]);
        for face in (0..FACE_COUNT).filter(|&f| f != skip) {
            let set = get_bit(record, bit);
            bit += 1;
            if !set {
                continue;
            }
            if found == length {
                overflow = true;
                continue;
            }
            let mut cell = cells[i];
            cell[face % 3] += if face < 3 { 1 } else { -1 };
            cells[found] = cell;
            faces[found] = face;
            found += 1;
        }
    }

    if found != length || overflow {
        warn!(length, found, "found malformed polycube");
    }

    let cells = &cells[..found];
    let mut min = [i16::MAX; 3];
    for c in cells {
        for axis in 0..3 {
            min[axis] = min[axis].min(c[axis]);
        }
    }
    let coords: Vec<[u8; 3]> = cells
        .iter()
        .map(|c| {
            [
                (c[0] - min[0] + 1) as u8,
                (c[1] - min[1] + 1) as u8,
                (c[2] - min[2] + 1) as u8,
            ]
        })
        .collect();
    Ok(Key::from_coords(&coords)?)
}

/// Per-worker encoder with its own scratch lattice.
pub struct BitfacePacker {
    length: usize,
    spacemap: Spacemap,
}

impl BitfacePacker {
    /// A packer for `length`-cell shapes.
    pub fn new(length: usize) -> Self {
        BitfacePacker {
            length,
            spacemap: Spacemap::new(),
        }
    }
}

impl KeyPacker for BitfacePacker {
    fn pack_keys(&mut self, keys: &[Key], out: &mut Vec<u8>) -> Result<(), StreamError> {
        check_lengths(keys, self.length)?;
        let size = key_size(self.length);
        for key in keys {
            let start = out.len();
            out.resize(start + size, 0);
            pack_key(key, &mut out[start..], &mut self.spacemap);
        }
        Ok(())
    }
}

/// Reads bitface records from a byte stream.
///
/// Generic over `R: Read` so tests can use `&[u8]` and production code can
/// use `BufReader<File>`.
pub struct BitfaceReader<R: Read> {
    reader: BodyReader<R>,
    length: usize,
    declared_count: Option<u64>,
    records_read: u64,
    record: Vec<u8>,
}

impl<R: Read> BitfaceReader<R> {
    /// Open an uncompressed stream, reading the length byte.
    ///
    /// `stream_len`, the total byte length when known, yields the declared
    /// record count.
    pub fn open(reader: R, stream_len: Option<u64>) -> Result<Self, StreamError> {
        Self::open_body(BodyReader::new(reader, Compression::None), stream_len)
    }

    /// Open a gzip-compressed stream. The record count is not known up
    /// front.
    pub fn open_compressed(reader: R) -> Result<Self, StreamError> {
        Self::open_body(BodyReader::new(reader, Compression::Gzip), None)
    }

    fn open_body(mut reader: BodyReader<R>, stream_len: Option<u64>) -> Result<Self, StreamError> {
        let length = read_u8(&mut reader)? as usize;
        if length == 0 || length > MAX_LENGTH {
            return Err(StreamError::InvalidLength { length });
        }
        let size = key_size(length);
        Ok(BitfaceReader {
            reader,
            length,
            declared_count: stream_len.map(|n| n.saturating_sub(1) / size as u64),
            records_read: 0,
            record: vec![0; size],
        })
    }

    /// Whether the stream is gzip-compressed.
    pub fn compression(&self) -> Compression {
        self.reader.compression()
    }

    /// Records decoded so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Decode the next key, or `None` at a clean end of stream.
    pub fn next_key(&mut self) -> Result<Option<Key>, StreamError> {
        if !read_record(&mut self.reader, &mut self.record, self.records_read)? {
            return Ok(None);
        }
        let key = unpack_key(&self.record, self.length)?;
        self.records_read += 1;
        Ok(Some(key))
    }
}

impl<R: Read + Send> SeedSource for BitfaceReader<R> {
    fn declared_length(&self) -> usize {
        self.length
    }

    fn declared_count(&self) -> Option<u64> {
        self.declared_count
    }

    fn read_batch(&mut self, max: usize, out: &mut Vec<Key>) -> Result<usize, StreamError> {
        let mut n = 0;
        while n < max {
            match self.next_key()? {
                Some(key) if key.len() != self.length => {
                    return Err(StreamError::LengthMismatch {
                        expected: self.length,
                        found: key.len(),
                    })
                }
                Some(key) => out.push(key),
                None => break,
            }
            n += 1;
        }
        Ok(n)
    }
}

/// Writes bitface records to a byte stream. The length byte is written on
/// construction.
pub struct BitfaceWriter<W: Write> {
    writer: BodyWriter<W>,
    length: usize,
    records_written: u64,
}

impl<W: Write> BitfaceWriter<W> {
    /// Create an uncompressed writer for `length`-cell shapes.
    pub fn new(writer: W, length: usize) -> Result<Self, StreamError> {
        Self::with_compression(writer, length, Compression::None)
    }

    /// Create a writer for `length`-cell shapes, compressing the whole
    /// stream when asked.
    pub fn with_compression(
        writer: W,
        length: usize,
        compression: Compression,
    ) -> Result<Self, StreamError> {
        if length == 0 || length > MAX_LENGTH {
            return Err(StreamError::InvalidLength { length });
        }
        let mut writer = BodyWriter::new(writer, compression);
        write_u8(&mut writer, length as u8)?;
        Ok(BitfaceWriter {
            writer,
            length,
            records_written: 0,
        })
    }

    /// Records written so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Finish the stream and return the underlying writer.
    pub fn into_inner(self) -> Result<W, StreamError> {
        Ok(self.writer.into_inner()?)
    }
}

impl<W: Write + Send> KeySink for BitfaceWriter<W> {
    fn output_length(&self) -> usize {
        self.length
    }

    fn packer(&self) -> Box<dyn KeyPacker> {
        Box::new(BitfacePacker::new(self.length))
    }

    fn write_packed(&mut self, bytes: &[u8], count: u64) -> Result<(), StreamError> {
        debug_assert_eq!(bytes.len() as u64, count * key_size(self.length) as u64);
        self.writer.write_all(bytes)?;
        self.records_written += count;
        Ok(())
    }

    fn write_final_count(&mut self, _total: u64) -> Result<(), StreamError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StreamError> {
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), StreamError> {
        self.writer.finish()?;
        Ok(())
    }
}
