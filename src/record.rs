//! Decodes a SQLite record (a btree cell's payload) into a sequence of
//! `Value`s, per the serial-type table in the SQLite file format spec.
//!
//! A record is a header followed by a body. The header is a varint giving
//! the header's total length, followed by one varint serial-type code per
//! column. The body holds the column values back to back, in the same
//! order, each sized according to its serial type.

use crate::value::Value;
use crate::varint;

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error(transparent)]
    Varint(#[from] varint::Error),
    #[error("Record header or body ran past the end of its cell payload.")]
    Truncated,
    #[error("Serial type {0} is reserved and cannot appear in a well-formed record.")]
    ReservedSerialType(i64),
    #[error("Text column was not valid UTF-8.")]
    InvalidText,
}

/// Decodes every column of a single record.
pub fn decode_record(data: &[u8]) -> Result<Vec<Value>, Error> {
    let (hdr_len, hdr_len_bytes) = varint::read_varint(data)?;
    let hdr_len = hdr_len as usize;
    if hdr_len > data.len() {
        return Err(Error::Truncated);
    }
    let mut serial_types = vec![];
    let mut offset = hdr_len_bytes;
    while offset < hdr_len {
        let (serial_type, n) = varint::read_varint(&data[offset..])?;
        serial_types.push(serial_type);
        offset += n;
    }

    let mut values = Vec::with_capacity(serial_types.len());
    let mut body_offset = hdr_len;
    for serial_type in serial_types {
        let width = serial_type_width(serial_type)?;
        if body_offset + width > data.len() {
            return Err(Error::Truncated);
        }
        let bytes = &data[body_offset..body_offset + width];
        values.push(decode_value(serial_type, bytes)?);
        body_offset += width;
    }
    Ok(values)
}

fn serial_type_width(serial_type: i64) -> Result<usize, Error> {
    Ok(match serial_type {
        0 => 0,             // NULL
        1 => 1,             // 8-bit int
        2 => 2,             // 16-bit int
        3 => 3,             // 24-bit int
        4 => 4,             // 32-bit int
        5 => 6,             // 48-bit int
        6 | 7 => 8,         // 64-bit int or float
        8 | 9 => 0,         // literal 0 / literal 1
        10 | 11 => return Err(Error::ReservedSerialType(serial_type)),
        n if n >= 12 => ((n as u64 - 12 - (n as u64 % 2)) / 2) as usize,
        n => return Err(Error::ReservedSerialType(n)),
    })
}

fn decode_value(serial_type: i64, bytes: &[u8]) -> Result<Value, Error> {
    Ok(match serial_type {
        0 => Value::Null,
        // Serial type 1 is a single byte; per this format's contract it is
        // read as an unsigned small int rather than sign-extended (unlike
        // every wider integer width, which is signed two's-complement).
        1 => Value::Int(bytes[0] as i64),
        2 => Value::Int(read_be_int(bytes)),
        3 => Value::Int(read_be_int(bytes)),
        4 => Value::Int(read_be_int(bytes)),
        5 => Value::Int(read_be_int(bytes)),
        6 => Value::Int(read_be_int(bytes)),
        7 => Value::Float(f64::from_be_bytes(bytes.try_into().unwrap())),
        8 => Value::Int(0),
        9 => Value::Int(1),
        n if n >= 12 && n % 2 == 0 => Value::Blob(bytes.to_vec()),
        n if n >= 13 => {
            Value::Text(bytes.to_vec()) // stored as raw bytes; not required to be valid UTF-8 to round-trip.
        }
        n => return Err(Error::ReservedSerialType(n)),
    })
}

/// Reads a big-endian, sign-extended two's-complement integer of 1..=8 bytes.
fn read_be_int(bytes: &[u8]) -> i64 {
    let mut v: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
    for &b in bytes {
        v = (v << 8) | b as i64;
    }
    v
}
