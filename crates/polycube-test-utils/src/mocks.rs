//! In-memory sources and sinks.

use std::sync::{Arc, Mutex};

use polycube_core::{check_lengths, Key, KeyPacker, KeySink, Point, SeedSource, StreamError};

/// A [`SeedSource`] over a fixed list of keys.
pub struct MemorySource {
    keys: Vec<Key>,
    cursor: usize,
    length: usize,
    reads: usize,
}

impl MemorySource {
    pub fn new(length: usize, keys: Vec<Key>) -> Self {
        Self {
            keys,
            cursor: 0,
            length,
            reads: 0,
        }
    }

    /// Number of `read_batch` calls so far.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl SeedSource for MemorySource {
    fn declared_length(&self) -> usize {
        self.length
    }

    fn declared_count(&self) -> Option<u64> {
        Some(self.keys.len() as u64)
    }

    fn read_batch(&mut self, max: usize, out: &mut Vec<Key>) -> Result<usize, StreamError> {
        self.reads += 1;
        let end = (self.cursor + max).min(self.keys.len());
        out.extend_from_slice(&self.keys[self.cursor..end]);
        let n = end - self.cursor;
        self.cursor = end;
        Ok(n)
    }
}

/// Everything a [`MemorySink`] has received.
#[derive(Debug, Default)]
pub struct SinkContents {
    pub keys: Vec<Key>,
    pub writes: usize,
    pub flushes: usize,
    pub final_count: Option<u64>,
}

/// A [`KeySink`] that decodes what it is sent into shared memory.
///
/// Clone the handle from [`contents`](MemorySink::contents) before the sink
/// is moved into a run, then inspect it afterwards.
pub struct MemorySink {
    length: usize,
    contents: Arc<Mutex<SinkContents>>,
}

impl MemorySink {
    pub fn new(length: usize) -> Self {
        Self {
            length,
            contents: Arc::new(Mutex::new(SinkContents::default())),
        }
    }

    pub fn contents(&self) -> Arc<Mutex<SinkContents>> {
        Arc::clone(&self.contents)
    }
}

/// Packs each point as two little-endian bytes.
struct RawPacker {
    length: usize,
}

impl KeyPacker for RawPacker {
    fn pack_keys(&mut self, keys: &[Key], out: &mut Vec<u8>) -> Result<(), StreamError> {
        check_lengths(keys, self.length)?;
        for key in keys {
            for p in key.points() {
                out.extend_from_slice(&p.raw().to_le_bytes());
            }
        }
        Ok(())
    }
}

impl KeySink for MemorySink {
    fn output_length(&self) -> usize {
        self.length
    }

    fn packer(&self) -> Box<dyn KeyPacker> {
        Box::new(RawPacker {
            length: self.length,
        })
    }

    fn write_packed(&mut self, bytes: &[u8], count: u64) -> Result<(), StreamError> {
        let record = 2 * self.length;
        if bytes.len() as u64 != count * record as u64 {
            return Err(StreamError::MalformedRecord {
                detail: format!("{} bytes for {count} records", bytes.len()),
            });
        }
        let mut contents = self.contents.lock().unwrap();
        for chunk in bytes.chunks_exact(record) {
            let points: Vec<Point> = chunk
                .chunks_exact(2)
                .map(|b| Point::from_raw(u16::from_le_bytes([b[0], b[1]])))
                .collect();
            contents.keys.push(Key::from_points(&points)?);
        }
        contents.writes += 1;
        Ok(())
    }

    fn write_final_count(&mut self, total: u64) -> Result<(), StreamError> {
        self.contents.lock().unwrap().final_count = Some(total);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StreamError> {
        self.contents.lock().unwrap().flushes += 1;
        Ok(())
    }
}

/// A sink whose writes fail after `ok_writes` successful ones.
pub struct FailingSink {
    inner: MemorySink,
    ok_writes: usize,
}

impl FailingSink {
    pub fn new(length: usize, ok_writes: usize) -> Self {
        Self {
            inner: MemorySink::new(length),
            ok_writes,
        }
    }
}

impl KeySink for FailingSink {
    fn output_length(&self) -> usize {
        self.inner.output_length()
    }

    fn packer(&self) -> Box<dyn KeyPacker> {
        self.inner.packer()
    }

    fn write_packed(&mut self, bytes: &[u8], count: u64) -> Result<(), StreamError> {
        if self.ok_writes == 0 {
            return Err(StreamError::Io(std::io::Error::other("injected write failure")));
        }
        self.ok_writes -= 1;
        self.inner.write_packed(bytes, count)
    }

    fn write_final_count(&mut self, total: u64) -> Result<(), StreamError> {
        self.inner.write_final_count(total)
    }

    fn flush(&mut self) -> Result<(), StreamError> {
        self.inner.flush()
    }

    fn finish(&mut self) -> Result<(), StreamError> {
        self.inner.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_reads_in_batches() {
        let keys = vec![Key::base(); 7];
        let mut src = MemorySource::new(2, keys);
        let mut out = Vec::new();
        assert_eq!(src.read_batch(5, &mut out).unwrap(), 5);
        assert_eq!(src.read_batch(5, &mut out).unwrap(), 2);
        assert_eq!(src.read_batch(5, &mut out).unwrap(), 0);
        assert_eq!(out.len(), 7);
        assert_eq!(src.reads(), 3);
    }

    #[test]
    fn sink_round_trips_through_packer() {
        let mut sink = MemorySink::new(2);
        let contents = sink.contents();
        sink.write_batch(&[Key::base()]).unwrap();
        sink.write_final_count(1).unwrap();
        let c = contents.lock().unwrap();
        assert_eq!(c.keys, vec![Key::base()]);
        assert_eq!(c.final_count, Some(1));
    }

    #[test]
    fn sink_rejects_wrong_length() {
        let mut sink = MemorySink::new(3);
        assert!(matches!(
            sink.write_batch(&[Key::base()]),
            Err(StreamError::LengthMismatch { .. })
        ));
    }
}
