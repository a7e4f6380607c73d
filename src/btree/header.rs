//! Parses the 8- or 12-byte in-page btree header that follows the
//! (page-1-only) 100-byte file header.

use super::PageKind;
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Cursor, Seek, SeekFrom};

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("Byte {0:#04x} is not a valid btree page kind.")]
    InvalidPageKind(u8),
    #[error("Error reading btree page header.")]
    ReadFailed,
}

#[derive(Debug, Clone, Copy)]
pub struct Header {
    pub page_kind: PageKind,
    pub freeblock_start: u32,
    pub num_cells: u32,
    pub cell_content_start: u32,
    pub rightmost_pointer: Option<u32>,
}

/// Parses the btree header of `page`, where `start` bytes precede it
/// (100 on page 1, 0 elsewhere — see `btree::btree_start_offset`).
pub fn parse_header(page: &[u8], start: usize) -> Result<Header, Error> {
    let mut c = Cursor::new(page);
    c.seek(SeekFrom::Start(start as u64))
        .map_err(|_| Error::ReadFailed)?;

    let kind_byte = c.read_u8().map_err(|_| Error::ReadFailed)?;
    let page_kind = PageKind::from_byte(kind_byte).ok_or(Error::InvalidPageKind(kind_byte))?;

    let freeblock_start = c.read_u16::<BigEndian>().map_err(|_| Error::ReadFailed)? as u32;
    let num_cells = c.read_u16::<BigEndian>().map_err(|_| Error::ReadFailed)? as u32;
    let cell_content_start = match c.read_u16::<BigEndian>().map_err(|_| Error::ReadFailed)? {
        0 => 65536,
        x => x as u32,
    };
    let _fragmented_free_bytes = c.read_u8().map_err(|_| Error::ReadFailed)?;

    let rightmost_pointer = if page_kind.is_interior() {
        Some(c.read_u32::<BigEndian>().map_err(|_| Error::ReadFailed)?)
    } else {
        None
    };

    Ok(Header {
        page_kind,
        freeblock_start,
        num_cells,
        cell_content_start,
        rightmost_pointer,
    })
}
