//! Volumetric "pcube" encoding.
//!
//! ```text
//! [MAGIC CB EC CB EC] [orientation u8] [compression u8] [count: fixed LEB128, 10 bytes]
//! [record 0] [record 1] ...
//! record = [dx u8] [dy u8] [dz u8] [bitmap: ceil(dx*dy*dz / 8) bytes]
//! ```
//!
//! Bitmap bit `(x-1)*dy*dz + (y-1)*dz + (z-1)` is set when cell `(x, y, z)`
//! is occupied, LSB-first within each byte. The count field is reserved
//! when the stream is created and patched by
//! [`KeySink::write_final_count`]. Orientation is always 0.
//!
//! Compression flag 1 means every byte after the header is one gzip
//! member; the header itself is never compressed. Other flags are
//! rejected.

use std::io::{Read, Seek, SeekFrom, Write};

use polycube_core::{check_lengths, Key, KeyPacker, KeySink, Point, SeedSource, StreamError};
use polycube_core::{MAX_COORD, MAX_LENGTH};
use tracing::debug;

use crate::codec::{
    bytes_for_bits, encode_fixed_leb128, get_bit, read_leb128, read_record, read_u8, set_bit,
    write_u8,
};
use crate::compress::{BodyReader, BodyWriter, Compression};

/// Magic bytes at the start of every pcube stream.
pub const MAGIC: [u8; 4] = [0xCB, 0xEC, 0xCB, 0xEC];

/// Offset of the count field.
pub const COUNT_OFFSET: u64 = 6;

/// Bytes of the fixed header, count field included.
pub const HEADER_LEN: u64 = COUNT_OFFSET + crate::codec::FIXED_LEB128_WIDTH as u64;

/// Append the record for `key`.
pub fn encode_key(key: &Key, out: &mut Vec<u8>) {
    let [dx, dy, dz] = key.dimensions().coords();
    out.extend_from_slice(&[dx, dy, dz]);
    let (dx, dy, dz) = (dx as usize, dy as usize, dz as usize);
    let start = out.len();
    out.resize(start + bytes_for_bits(dx * dy * dz), 0);
    let bitmap = &mut out[start..];
    for p in key.points() {
        let [x, y, z] = p.coords();
        let pos = (x as usize - 1) * dy * dz + (y as usize - 1) * dz + (z as usize - 1);
        set_bit(bitmap, pos);
    }
}

/// Decode a record from its extents and bitmap.
pub fn decode_record(dims: [u8; 3], bitmap: &[u8]) -> Result<Key, StreamError> {
    let [dx, dy, dz] = dims;
    let mut points = Vec::with_capacity(MAX_LENGTH);
    let mut pos = 0;
    for x in 1..=dx {
        for y in 1..=dy {
            for z in 1..=dz {
                if get_bit(bitmap, pos) {
                    points.push(Point::from_coords(x, y, z));
                }
                pos += 1;
            }
        }
    }
    Ok(Key::from_points(&points)?)
}

/// Stateless pcube encoder.
pub struct PcubePacker {
    length: usize,
}

impl PcubePacker {
    /// A packer for `length`-cell shapes.
    pub fn new(length: usize) -> Self {
        PcubePacker { length }
    }
}

impl KeyPacker for PcubePacker {
    fn pack_keys(&mut self, keys: &[Key], out: &mut Vec<u8>) -> Result<(), StreamError> {
        check_lengths(keys, self.length)?;
        for key in keys {
            encode_key(key, out);
        }
        Ok(())
    }
}

/// Reads pcube records from a byte stream.
pub struct PcubeReader<R: Read> {
    reader: BodyReader<R>,
    length: usize,
    declared_count: u64,
    records_read: u64,
    pending: Option<Key>,
}

impl<R: Read> PcubeReader<R> {
    /// Open a stream: validate the header and read the first record to
    /// learn the shape length.
    ///
    /// An empty stream (header only) opens with length 0 and yields no keys.
    pub fn open(mut reader: R) -> Result<Self, StreamError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(StreamError::InvalidMagic { found: magic });
        }
        let _orientation = read_u8(&mut reader)?;
        let flag = read_u8(&mut reader)?;
        let compression =
            Compression::from_flag(flag).ok_or(StreamError::UnsupportedCompression { flag })?;
        let declared_count = read_leb128(&mut reader)?;

        let mut this = PcubeReader {
            reader: BodyReader::new(reader, compression),
            length: 0,
            declared_count,
            records_read: 0,
            pending: None,
        };
        this.pending = this.read_key()?;
        if let Some(first) = &this.pending {
            this.length = first.len();
        }
        debug!(
            length = this.length,
            declared_count,
            %compression,
            "opened pcube stream"
        );
        Ok(this)
    }

    /// Records decoded so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Whether the records are gzip-compressed.
    pub fn compression(&self) -> Compression {
        self.reader.compression()
    }

    fn read_key(&mut self) -> Result<Option<Key>, StreamError> {
        let mut dims = [0u8; 3];
        if !read_record(&mut self.reader, &mut dims, self.records_read)? {
            return Ok(None);
        }
        if dims.iter().any(|&d| d == 0 || d > MAX_COORD) {
            return Err(StreamError::MalformedRecord {
                detail: format!("extents {dims:?} out of range"),
            });
        }
        let bits = dims.iter().map(|&d| d as usize).product::<usize>();
        let mut bitmap = vec![0u8; bytes_for_bits(bits)];
        if !read_record(&mut self.reader, &mut bitmap, self.records_read)? {
            return Err(StreamError::Truncated {
                records_read: self.records_read,
            });
        }
        let key = decode_record(dims, &bitmap)?;
        self.records_read += 1;
        Ok(Some(key))
    }

    /// Decode the next key, or `None` at a clean end of stream.
    pub fn next_key(&mut self) -> Result<Option<Key>, StreamError> {
        if let Some(key) = self.pending.take() {
            return Ok(Some(key));
        }
        self.read_key()
    }
}

impl<R: Read + Send> SeedSource for PcubeReader<R> {
    fn declared_length(&self) -> usize {
        self.length
    }

    fn declared_count(&self) -> Option<u64> {
        (self.declared_count > 0).then_some(self.declared_count)
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

/// Writes pcube records to a seekable byte stream.
///
/// The header, with a zero count, is written on construction.
pub struct PcubeWriter<W: Write + Seek> {
    writer: BodyWriter<W>,
    length: usize,
    records_written: u64,
}

impl<W: Write + Seek> PcubeWriter<W> {
    /// Create an uncompressed writer for `length`-cell shapes.
    pub fn new(writer: W, length: usize) -> Result<Self, StreamError> {
        Self::with_compression(writer, length, Compression::None)
    }

    /// Create a writer for `length`-cell shapes, recording `compression`
    /// in the header and applying it to every record.
    pub fn with_compression(
        mut writer: W,
        length: usize,
        compression: Compression,
    ) -> Result<Self, StreamError> {
        if length == 0 || length > MAX_LENGTH {
            return Err(StreamError::InvalidLength { length });
        }
        writer.write_all(&MAGIC)?;
        write_u8(&mut writer, 0)?;
        write_u8(&mut writer, compression.flag())?;
        writer.write_all(&encode_fixed_leb128(0))?;
        Ok(PcubeWriter {
            writer: BodyWriter::new(writer, compression),
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

impl<W: Write + Seek + Send> KeySink for PcubeWriter<W> {
    fn output_length(&self) -> usize {
        self.length
    }

    fn packer(&self) -> Box<dyn KeyPacker> {
        Box::new(PcubePacker::new(self.length))
    }

    fn write_packed(&mut self, bytes: &[u8], count: u64) -> Result<(), StreamError> {
        self.writer.write_all(bytes)?;
        self.records_written += count;
        Ok(())
    }

    fn write_final_count(&mut self, total: u64) -> Result<(), StreamError> {
        // The header sits outside any gzip member, so it is patched on the
        // raw writer; the deflater resumes at the old end.
        let raw = self.writer.raw_mut();
        let end = raw.stream_position()?;
        raw.seek(SeekFrom::Start(COUNT_OFFSET))?;
        raw.write_all(&encode_fixed_leb128(total))?;
        raw.seek(SeekFrom::Start(end))?;
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
