//! Optional gzip layer under either encoding.
//!
//! A compressed pcube stream keeps its header uncompressed, so the count
//! field can still be patched in place, and deflates everything after it.
//! A compressed bitface stream is gzip from its first byte; its length
//! byte can never be `0x1F`, so the gzip magic identifies it.

use std::fmt;
use std::io::{self, Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

/// The two leading bytes of every gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Deflate level for written streams.
pub const GZIP_LEVEL: u32 = 2;

/// Whether a stream's records are deflated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Records are stored as-is.
    #[default]
    None,
    /// Records pass through a gzip stream.
    Gzip,
}

impl Compression {
    /// The pcube header flag for this setting.
    pub fn flag(self) -> u8 {
        match self {
            Compression::None => 0,
            Compression::Gzip => 1,
        }
    }

    /// The setting for a pcube header flag, if it is one this build reads.
    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(Compression::None),
            1 => Some(Compression::Gzip),
            _ => None,
        }
    }

    /// Lower-case name.
    pub fn name(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Readers ─────────────────────────────────────────────────────

/// A byte stream read either as-is or through an inflater.
pub enum BodyReader<R: Read> {
    /// Uncompressed.
    Plain(R),
    /// Gzip-compressed.
    Gzip(GzDecoder<R>),
}

impl<R: Read> BodyReader<R> {
    /// Wrap `reader` according to `compression`.
    pub fn new(reader: R, compression: Compression) -> Self {
        match compression {
            Compression::None => BodyReader::Plain(reader),
            Compression::Gzip => BodyReader::Gzip(GzDecoder::new(reader)),
        }
    }

    /// The compression this reader undoes.
    pub fn compression(&self) -> Compression {
        match self {
            BodyReader::Plain(_) => Compression::None,
            BodyReader::Gzip(_) => Compression::Gzip,
        }
    }
}

impl<R: Read> Read for BodyReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            BodyReader::Plain(r) => r.read(buf),
            BodyReader::Gzip(r) => r.read(buf),
        }
    }
}

// ── Writers ─────────────────────────────────────────────────────

/// A byte sink written either as-is or through a deflater.
pub enum BodyWriter<W: Write> {
    /// Uncompressed.
    Plain(W),
    /// Gzip-compressed.
    Gzip(GzEncoder<W>),
}

impl<W: Write> BodyWriter<W> {
    /// Wrap `writer` according to `compression`.
    pub fn new(writer: W, compression: Compression) -> Self {
        match compression {
            Compression::None => BodyWriter::Plain(writer),
            Compression::Gzip => BodyWriter::Gzip(GzEncoder::new(
                writer,
                flate2::Compression::new(GZIP_LEVEL),
            )),
        }
    }

    /// The compression this writer applies.
    pub fn compression(&self) -> Compression {
        match self {
            BodyWriter::Plain(_) => Compression::None,
            BodyWriter::Gzip(_) => Compression::Gzip,
        }
    }

    /// The underlying writer. Bytes written here bypass the deflater.
    pub fn raw_mut(&mut self) -> &mut W {
        match self {
            BodyWriter::Plain(w) => w,
            BodyWriter::Gzip(e) => e.get_mut(),
        }
    }

    /// Write the gzip trailer, if any, and flush. Nothing may be written
    /// afterwards.
    pub fn finish(&mut self) -> io::Result<()> {
        if let BodyWriter::Gzip(e) = self {
            e.try_finish()?;
        }
        self.raw_mut().flush()
    }

    /// Finish the stream and return the underlying writer.
    pub fn into_inner(self) -> io::Result<W> {
        let mut w = match self {
            BodyWriter::Plain(w) => w,
            BodyWriter::Gzip(e) => e.finish()?,
        };
        w.flush()?;
        Ok(w)
    }
}

impl<W: Write> Write for BodyWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            BodyWriter::Plain(w) => w.write(buf),
            BodyWriter::Gzip(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            BodyWriter::Plain(w) => w.flush(),
            BodyWriter::Gzip(e) => e.flush(),
        }
    }
}
