//! Byte-level helpers shared by both encodings.

use std::io::{Read, Write};

use polycube_core::StreamError;

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), StreamError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Width of a fixed LEB128 field.
pub const FIXED_LEB128_WIDTH: usize = 10;

/// Encode `value` as LEB128 padded to exactly [`FIXED_LEB128_WIDTH`] bytes.
///
/// Every byte but the last carries the continuation bit, so the field can
/// be rewritten in place once the final value is known. Standard LEB128
/// decoders read it as the same value.
pub fn encode_fixed_leb128(mut value: u64) -> [u8; FIXED_LEB128_WIDTH] {
    let mut bytes = [0u8; FIXED_LEB128_WIDTH];
    for b in &mut bytes {
        *b = (value & 0x7F) as u8 | 0x80;
        value >>= 7;
    }
    bytes[FIXED_LEB128_WIDTH - 1] &= 0x7F;
    bytes
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, StreamError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read an LEB128 value of at most [`FIXED_LEB128_WIDTH`] bytes.
pub fn read_leb128(r: &mut dyn Read) -> Result<u64, StreamError> {
    let mut value = 0u64;
    for i in 0..FIXED_LEB128_WIDTH {
        let b = read_u8(r)?;
        value |= u64::from(b & 0x7F).checked_shl(7 * i as u32).unwrap_or(0);
        if b & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(StreamError::MalformedRecord {
        detail: "count field longer than 10 bytes".into(),
    })
}

/// Fill `buf` completely.
///
/// Returns `Ok(false)` on a clean end of stream (no bytes available) and
/// [`StreamError::Truncated`] if the stream ends partway through.
pub fn read_record(
    r: &mut dyn Read,
    buf: &mut [u8],
    records_read: u64,
) -> Result<bool, StreamError> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => return Err(StreamError::Truncated { records_read }),
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

// ── Bit access ──────────────────────────────────────────────────

/// Set bit `bit` of `buf`, least significant bit first within each byte.
#[inline]
pub fn set_bit(buf: &mut [u8], bit: usize) {
    buf[bit >> 3] |= 1 << (bit & 7);
}

/// Read bit `bit` of `buf`.
#[inline]
pub fn get_bit(buf: &[u8], bit: usize) -> bool {
    buf[bit >> 3] & (1 << (bit & 7)) != 0
}

/// Bytes needed for `bits` bits.
#[inline]
pub const fn bytes_for_bits(bits: usize) -> usize {
    bits.div_ceil(8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_leb128_layout() {
        let bytes = encode_fixed_leb128(300);
        assert_eq!(bytes[0], 0x80 | (300 & 0x7F) as u8);
        assert_eq!(bytes[1], 0x80 | 2);
        assert!(bytes[2..9].iter().all(|&b| b == 0x80));
        assert_eq!(bytes[9], 0);
        assert_eq!(read_leb128(&mut &bytes[..]).unwrap(), 300);
    }

    #[test]
    fn short_leb128_reads() {
        let bytes = [0xE5, 0x8E, 0x26];
        assert_eq!(read_leb128(&mut &bytes[..]).unwrap(), 624_485);
    }

    #[test]
    fn leb128_extremes() {
        for v in [0, 1, u64::MAX] {
            let bytes = encode_fixed_leb128(v);
            assert_eq!(read_leb128(&mut &bytes[..]).unwrap(), v);
        }
    }

    #[test]
    fn record_eof_handling() {
        let mut buf = [0u8; 4];
        let mut empty: &[u8] = &[];
        assert!(!read_record(&mut empty, &mut buf, 0).unwrap());
        let mut short: &[u8] = &[1, 2];
        assert!(matches!(
            read_record(&mut short, &mut buf, 7),
            Err(StreamError::Truncated { records_read: 7 })
        ));
        let mut full: &[u8] = &[1, 2, 3, 4, 5];
        assert!(read_record(&mut full, &mut buf, 0).unwrap());
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn bits_are_lsb_first() {
        let mut buf = [0u8; 2];
        set_bit(&mut buf, 0);
        set_bit(&mut buf, 9);
        assert_eq!(buf, [0x01, 0x02]);
        assert!(get_bit(&buf, 9));
        assert!(!get_bit(&buf, 8));
        assert_eq!(bytes_for_bits(9), 2);
        assert_eq!(bytes_for_bits(8), 1);
    }
}
