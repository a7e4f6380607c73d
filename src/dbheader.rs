//! Parses the 100-byte file header that begins every database file.
//!
//! Only the fields needed to traverse pages are validated: the magic
//! string and the page size. Integrity fields unrelated to traversal
//! (freelist bookkeeping, schema cookie, text encoding, vacuum mode,
//! application id, version-valid-for) are read where present but not
//! enforced, since verifying file integrity beyond what's needed to
//! traverse the requested pages is out of scope.

use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Cursor, Read, Seek, SeekFrom};

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("The magic bytes for this file are wrong.")]
    WrongMagic,
    #[error("The page size is not a supported power of two between 512 and 65536.")]
    UnsupportedPageSize,
    #[error("Error reading file header.")]
    ReadFailed,
}

const SQLITE_DB_HEADER_BYTES: usize = 100;
const MAGIC_STRING: &[u8; 16] = b"SQLite format 3\0";

/// The parts of the 100-byte file header this crate needs to traverse pages.
#[derive(Debug, Clone, Copy)]
pub struct DbHeader {
    pub page_size: u32,
    pub num_pages: u32,
}

pub fn read_header(f: &mut std::fs::File) -> Result<DbHeader, Error> {
    let mut buf = vec![0_u8; SQLITE_DB_HEADER_BYTES];
    f.seek(SeekFrom::Start(0)).map_err(|_| Error::ReadFailed)?;
    f.read_exact(&mut buf).map_err(|_| Error::ReadFailed)?;
    let header = parse_header(&buf)?;
    f.seek(SeekFrom::Start(0)).map_err(|_| Error::ReadFailed)?;
    Ok(header)
}

fn parse_header(buf: &[u8]) -> Result<DbHeader, Error> {
    let mut c = Cursor::new(buf);

    let mut magic = [0u8; 16];
    c.read_exact(&mut magic).map_err(|_| Error::ReadFailed)?;
    if &magic != MAGIC_STRING {
        return Err(Error::WrongMagic);
    }

    // Offset 16, 2 bytes: page size. Power of two in 512..=32768, or 1 meaning 65536.
    let page_size: u32 = match c.read_u16::<BigEndian>().map_err(|_| Error::ReadFailed)? {
        1 => 65536,
        n if n >= 512 && n.is_power_of_two() => n as u32,
        _ => return Err(Error::UnsupportedPageSize),
    };

    // Offset 28, 4 bytes: size of the database file in pages (the
    // "in-header database size"; may be stale/zero on older files, in
    // which case callers fall back to file length / page size).
    c.seek(SeekFrom::Start(28)).map_err(|_| Error::ReadFailed)?;
    let num_pages = c.read_u32::<BigEndian>().map_err(|_| Error::ReadFailed)?;

    Ok(DbHeader {
        page_size,
        num_pages,
    })
}
