//! On-disk encodings for polycube keys.
//!
//! Two formats implement the [`SeedSource`] and [`KeySink`] traits:
//!
//! - [`bitface`]: compact fixed-size records of breadth-first face bits.
//! - [`pcube`]: the interchange format, one bounding box and occupancy
//!   bitmap per shape with a patched count header.
//!
//! Either format can be gzip-compressed through [`compress`].
//!
//! Readers and writers are generic over `Read`/`Write` so tests can use
//! in-memory buffers; [`open_source`] and [`create_sink`] wire them to
//! buffered files.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bitface;
pub mod codec;
pub mod compress;
pub mod pcube;

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek};
use std::path::Path;
use std::str::FromStr;

use polycube_core::{KeySink, SeedSource, StreamError};

pub use bitface::{BitfacePacker, BitfaceReader, BitfaceWriter};
pub use compress::Compression;
pub use pcube::{PcubePacker, PcubeReader, PcubeWriter};

/// A key file encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// Compact breadth-first face bits.
    Bitface,
    /// Bounding box plus occupancy bitmap.
    Pcube,
}

impl Format {
    /// Guess the format from a file extension: `.pcube` is [`Format::Pcube`],
    /// anything else [`Format::Bitface`].
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pcube") => Format::Pcube,
            _ => Format::Bitface,
        }
    }

    /// Lower-case name as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Format::Bitface => "bitface",
            Format::Pcube => "pcube",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognised format name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownFormat {
    /// The name that failed to parse.
    pub name: String,
}

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown format '{}' (expected bitface or pcube)", self.name)
    }
}

impl std::error::Error for UnknownFormat {}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bitface" | "bin" => Ok(Format::Bitface),
            "pcube" => Ok(Format::Pcube),
            _ => Err(UnknownFormat { name: s.into() }),
        }
    }
}

/// Open `path` as a seed source.
///
/// Compression is detected: from the header flag for pcube, from the gzip
/// magic for bitface.
pub fn open_source(format: Format, path: &Path) -> Result<Box<dyn SeedSource>, StreamError> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    Ok(match format {
        Format::Bitface if starts_with_gzip_magic(&mut file)? => {
            Box::new(BitfaceReader::open_compressed(BufReader::new(file))?)
        }
        Format::Bitface => Box::new(BitfaceReader::open(BufReader::new(file), Some(len))?),
        Format::Pcube => Box::new(PcubeReader::open(BufReader::new(file))?),
    })
}

/// Peek at the first two bytes, leaving the file at its start.
fn starts_with_gzip_magic(file: &mut File) -> io::Result<bool> {
    let mut head = Vec::with_capacity(2);
    file.by_ref().take(2).read_to_end(&mut head)?;
    file.rewind()?;
    Ok(head == compress::GZIP_MAGIC)
}

/// Create `path` as a sink for `length`-cell shapes, truncating any
/// existing file.
pub fn create_sink(
    format: Format,
    path: &Path,
    length: usize,
    compression: Compression,
) -> Result<Box<dyn KeySink>, StreamError> {
    let writer = BufWriter::new(File::create(path)?);
    Ok(match format {
        Format::Bitface => Box::new(BitfaceWriter::with_compression(writer, length, compression)?),
        Format::Pcube => Box::new(PcubeWriter::with_compression(writer, length, compression)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_format_names() {
        assert_eq!("bitface".parse::<Format>().unwrap(), Format::Bitface);
        assert_eq!("PCUBE".parse::<Format>().unwrap(), Format::Pcube);
        assert!("zip".parse::<Format>().is_err());
        assert_eq!(Format::Pcube.to_string(), "pcube");
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("cubes_9.pcube")), Format::Pcube);
        assert_eq!(Format::from_path(Path::new("cubes_9.bin")), Format::Bitface);
        assert_eq!(Format::from_path(Path::new("cubes")), Format::Bitface);
    }
}
