//! The on-disk varint: a big-endian, variable-length integer encoding.
//!
//! Each byte but the last has its high bit set (a continuation bit) and
//! contributes 7 bits to the value. The 9th byte, if reached, is exempt
//! from the continuation rule and contributes all 8 of its bits.

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("Unexpected end of input while decoding a varint.")]
    UnexpectedEof,
}

/// Reads a varint from the start of `data`.
///
/// Returns the decoded value and the number of bytes consumed (1..=9).
/// Fails if `data` ends before a terminating byte (high bit clear, or the
/// 9th byte) is reached.
pub fn read_varint(data: &[u8]) -> Result<(i64, usize), Error> {
    let mut result: i64 = 0;
    for i in 0..8 {
        let byte = *data.get(i).ok_or(Error::UnexpectedEof)?;
        result = (result << 7) | (byte & 0x7f) as i64;
        if byte & 0x80 == 0 {
            return Ok((result, i + 1));
        }
    }
    // Ninth byte: all 8 bits are significant, no continuation check.
    let last = *data.get(8).ok_or(Error::UnexpectedEof)?;
    result = (result << 8) | last as i64;
    Ok((result, 9))
}

/// Encodes `value` as a varint, appending the bytes to `out`.
///
/// Returns the number of bytes appended.
pub fn write_varint(value: i64, out: &mut Vec<u8>) -> usize {
    let mut v = value as u64;
    // If any of the top 8 bits are set, the 9-byte form is required: the
    // last byte holds the low 8 bits of v verbatim, and the preceding 8
    // bytes each carry 7 bits of the remainder, continuation bit always set.
    if v & 0xff00_0000_0000_0000 != 0 {
        let mut bytes = [0u8; 9];
        bytes[8] = v as u8;
        v >>= 8;
        for i in (0..8).rev() {
            bytes[i] = (v & 0x7f) as u8 | 0x80;
            v >>= 7;
        }
        out.extend_from_slice(&bytes);
        return 9;
    }
    let mut buf = [0u8; 9];
    let mut n = 0;
    loop {
        buf[n] = (v & 0x7f) as u8 | 0x80;
        n += 1;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    buf[0] &= 0x7f; // clear the continuation bit on the least-significant group.
    let start = out.len();
    for i in (0..n).rev() {
        out.push(buf[i]);
    }
    out.len() - start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_small_values() {
        for v in [0_i64, 1, 63, 127, 128, 255, 16383, 16384] {
            let mut buf = vec![];
            let n = write_varint(v, &mut buf);
            assert_eq!(n, buf.len());
            let (decoded, consumed) = read_varint(&buf).unwrap();
            assert_eq!(decoded, v);
            assert_eq!(consumed, n);
        }
    }

    #[test]
    fn single_byte_values_fit_in_one_byte() {
        let mut buf = vec![];
        write_varint(100, &mut buf);
        assert_eq!(buf, vec![100]);
    }

    #[test]
    fn two_byte_boundary() {
        // 128 needs 2 bytes: 0x81 0x00
        let mut buf = vec![];
        write_varint(128, &mut buf);
        assert_eq!(buf, vec![0x81, 0x00]);
        assert_eq!(read_varint(&buf).unwrap(), (128, 2));
    }

    #[test]
    fn nine_byte_varint_reads_all_bits_of_last_byte() {
        // Nine bytes, with the final byte having its high bit set, which
        // must NOT be treated as a continuation bit (there is no 10th byte).
        let data = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        let (value, consumed) = read_varint(&data).unwrap();
        assert_eq!(consumed, 9);
        assert_eq!(value, -1_i64); // all 64 bits set, as i64.
    }

    #[test]
    fn roundtrip_max_i64() {
        let mut buf = vec![];
        let n = write_varint(i64::MAX, &mut buf);
        let (decoded, consumed) = read_varint(&buf).unwrap();
        assert_eq!(consumed, n);
        assert_eq!(decoded, i64::MAX);
    }

    #[test]
    fn roundtrip_negative_one() {
        let mut buf = vec![];
        let n = write_varint(-1, &mut buf);
        assert_eq!(n, 9);
        let (decoded, consumed) = read_varint(&buf).unwrap();
        assert_eq!(consumed, 9);
        assert_eq!(decoded, -1);
    }

    #[test]
    fn known_two_byte_rowid_fixture() {
        // 0x81 0x4e -> continuation bit set on first byte: (1 << 7) | 0x4e = 206.
        let data = [0x81, 0x4e];
        assert_eq!(read_varint(&data).unwrap(), (206, 2));
    }

    #[test]
    fn empty_input_is_unexpected_eof() {
        assert_eq!(read_varint(&[]), Err(Error::UnexpectedEof));
    }

    #[test]
    fn truncated_multi_byte_varint_is_unexpected_eof() {
        // High bit set with no following byte.
        assert_eq!(read_varint(&[0x81]), Err(Error::UnexpectedEof));
    }

    #[test]
    fn truncated_nine_byte_varint_is_unexpected_eof() {
        let data = [0xff; 8];
        assert_eq!(read_varint(&data), Err(Error::UnexpectedEof));
    }
}
