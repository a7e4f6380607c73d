//! Iterates over the cell-pointer array of a single page and parses each
//! cell according to its page's kind. Overflow pages are not supported:
//! a cell whose declared payload length doesn't fit on the page is an
//! error, per this crate's Non-goals.

use super::PageKind;
use crate::pager::PageNum;
use crate::varint;
use byteorder::{BigEndian, ReadBytesExt};

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error(transparent)]
    Header(#[from] super::header::Error),
    #[error(transparent)]
    Varint(#[from] crate::varint::Error),
    #[error("Cell payload would spill to an overflow page, which is not supported.")]
    OverflowNotSupported,
    #[error("Cell bytes ran past the end of the page.")]
    Truncated,
}

/// A single parsed btree cell, shaped according to the page kind it came from.
#[derive(Debug, Clone)]
pub enum Cell<'a> {
    TableLeaf { rowid: i64, payload: &'a [u8] },
    TableInterior { left_child: PageNum, key: i64 },
    IndexLeaf { payload: &'a [u8] },
    IndexInterior { left_child: PageNum, payload: &'a [u8] },
}

/// Cursor over the cell-pointer array of a page, in on-page pointer-array
/// order (left-most/smallest key first).
///
/// This cursor deliberately does not borrow the page itself: it only
/// remembers cell offsets/lengths, and `next` takes the page bytes as an
/// argument. That lets a btree traversal keep a stack of these cursors
/// alongside their owned page buffers (see `btree::table`) without the
/// self-referential-struct problem a `Cursor { page: &[u8], .. } holding
/// both the bytes and a borrow into them in one struct would create.
pub struct Cursor {
    cell_idx: usize,
    cell_offsets: Vec<usize>,
    cell_lengths: Vec<usize>,
}

impl Cursor {
    pub fn new(page: &[u8], start: usize, page_size: u32) -> Result<Cursor, Error> {
        let hdr = super::header::parse_header(page, start)?;
        let header_bytes: usize = if hdr.page_kind.is_interior() { 12 } else { 8 };
        let pointer_array_start = start + header_bytes;

        let mut c = std::io::Cursor::new(page);
        use std::io::{Seek, SeekFrom};
        c.seek(SeekFrom::Start(pointer_array_start as u64))
            .map_err(|_| Error::Truncated)?;

        let mut cell_offsets = Vec::with_capacity(hdr.num_cells as usize);
        let mut cell_lengths = Vec::with_capacity(hdr.num_cells as usize);
        let mut last_offset = page_size as usize;
        for _ in 0..hdr.num_cells {
            let off = c.read_u16::<BigEndian>().map_err(|_| Error::Truncated)? as usize;
            if off > page.len() || off > last_offset {
                return Err(Error::Truncated);
            }
            cell_offsets.push(off);
            cell_lengths.push(last_offset - off);
            last_offset = off;
        }

        Ok(Cursor {
            cell_idx: 0,
            cell_offsets,
            cell_lengths,
        })
    }

    pub fn num_cells(&self) -> usize {
        self.cell_offsets.len()
    }

    /// Returns the next raw cell slice, borrowed from `page`.
    pub fn next<'p>(&mut self, page: &'p [u8]) -> Option<&'p [u8]> {
        if self.cell_idx >= self.cell_offsets.len() {
            return None;
        }
        let b = self.cell_offsets[self.cell_idx];
        let e = b + self.cell_lengths[self.cell_idx];
        self.cell_idx += 1;
        Some(&page[b..e])
    }
}

/// Parses a raw cell slice according to `page_kind`.
pub fn parse_cell<'a>(page_kind: PageKind, raw: &'a [u8]) -> Result<Cell<'a>, Error> {
    match page_kind {
        PageKind::TableLeaf => {
            let (payload_len, n1) = varint::read_varint(raw)?;
            let (rowid, n2) = varint::read_varint(raw.get(n1..).ok_or(Error::Truncated)?)?;
            let offset = n1 + n2;
            if raw.len() < offset {
                return Err(Error::Truncated);
            }
            if raw.len() - offset != payload_len as usize {
                return Err(Error::OverflowNotSupported);
            }
            Ok(Cell::TableLeaf {
                rowid,
                payload: &raw[offset..],
            })
        }
        PageKind::TableInterior => {
            let mut c = std::io::Cursor::new(raw);
            let left_child = c.read_u32::<BigEndian>().map_err(|_| Error::Truncated)? as PageNum;
            let (key, _) = varint::read_varint(raw.get(4..).ok_or(Error::Truncated)?)?;
            Ok(Cell::TableInterior { left_child, key })
        }
        PageKind::IndexLeaf => {
            let (payload_len, n1) = varint::read_varint(raw)?;
            if raw.len() < n1 {
                return Err(Error::Truncated);
            }
            if raw.len() - n1 != payload_len as usize {
                return Err(Error::OverflowNotSupported);
            }
            Ok(Cell::IndexLeaf {
                payload: &raw[n1..],
            })
        }
        PageKind::IndexInterior => {
            let mut c = std::io::Cursor::new(raw);
            let left_child = c.read_u32::<BigEndian>().map_err(|_| Error::Truncated)? as PageNum;
            let (payload_len, n2) = varint::read_varint(raw.get(4..).ok_or(Error::Truncated)?)?;
            let offset = 4 + n2;
            if raw.len() < offset {
                return Err(Error::Truncated);
            }
            if raw.len() - offset != payload_len as usize {
                return Err(Error::OverflowNotSupported);
            }
            Ok(Cell::IndexInterior {
                left_child,
                payload: &raw[offset..],
            })
        }
    }
}
