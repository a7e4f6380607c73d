//! Walks a table btree: rowid -> record payload.
//!
//! `TableScan` does an explicit-stack pre-order traversal for full scans,
//! avoiding recursion so traversal depth isn't bounded by the call stack.
//! `seek_rowid` instead descends directly toward a single rowid, pruning
//! every subtree that cannot contain it, for the index-accelerated query
//! path.

use super::{btree_start_offset, cell, header, PageKind, RowId};
use crate::pager::{PageNum, Pager};

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error(transparent)]
    Pager(#[from] crate::pager::Error),
    #[error(transparent)]
    Header(#[from] header::Error),
    #[error(transparent)]
    Cell(#[from] cell::Error),
    #[error("Encountered an index page while scanning a table btree.")]
    UnexpectedIndexPage,
    #[error("Interior table page is missing its required rightmost pointer.")]
    MissingRightmostPointer,
}

struct Frame {
    page: Vec<u8>,
    page_kind: PageKind,
    cursor: cell::Cursor,
    rightmost: Option<PageNum>,
    returned_rightmost: bool,
}

/// Iterates over every (rowid, payload) pair of a table btree, in rowid order.
pub struct TableScan<'p> {
    pager: &'p mut Pager,
    page_size: u32,
    root_page: PageNum,
    stack: Vec<Frame>,
    started: bool,
}

impl<'p> TableScan<'p> {
    pub fn new(pager: &'p mut Pager, root_page: PageNum) -> TableScan<'p> {
        let page_size = pager.page_size();
        TableScan {
            pager,
            page_size,
            root_page,
            stack: vec![],
            started: false,
        }
    }

    fn push_page(&mut self, pagenum: PageNum) -> Result<(), Error> {
        let page = self.pager.get_page(pagenum)?.clone();
        let start = btree_start_offset(pagenum);
        let hdr = header::parse_header(&page, start)?;
        if !matches!(hdr.page_kind, PageKind::TableLeaf | PageKind::TableInterior) {
            return Err(Error::UnexpectedIndexPage);
        }
        let cursor = cell::Cursor::new(&page, start, self.page_size)?;
        self.stack.push(Frame {
            page,
            page_kind: hdr.page_kind,
            cursor,
            rightmost: hdr.rightmost_pointer.map(|p| p as PageNum),
            returned_rightmost: false,
        });
        Ok(())
    }

    /// Descends to the leftmost leaf reachable from `pagenum`, pushing
    /// every interior page visited along the way onto the stack.
    fn seek_leftmost(&mut self, mut pagenum: PageNum) -> Result<(), Error> {
        loop {
            self.push_page(pagenum)?;
            let frame = self.stack.last_mut().unwrap();
            match frame.page_kind {
                PageKind::TableLeaf => return Ok(()),
                PageKind::TableInterior => match frame.cursor.next(&frame.page) {
                    Some(raw) => match cell::parse_cell(PageKind::TableInterior, raw)? {
                        cell::Cell::TableInterior { left_child, .. } => {
                            pagenum = left_child;
                        }
                        _ => unreachable!(),
                    },
                    None => {
                        frame.returned_rightmost = true;
                        pagenum = frame.rightmost.ok_or(Error::MissingRightmostPointer)?;
                    }
                },
                _ => unreachable!(),
            }
        }
    }
}

impl<'p> Iterator for TableScan<'p> {
    type Item = Result<(RowId, Vec<u8>), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            if let Err(e) = self.seek_leftmost(self.root_page) {
                return Some(Err(e));
            }
        }
        loop {
            if self.stack.is_empty() {
                return None;
            }
            let page_kind = self.stack.last().unwrap().page_kind;
            match page_kind {
                PageKind::TableLeaf => {
                    let frame = self.stack.last_mut().unwrap();
                    match frame.cursor.next(&frame.page) {
                        Some(raw) => match cell::parse_cell(PageKind::TableLeaf, raw) {
                            Ok(cell::Cell::TableLeaf { rowid, payload }) => {
                                return Some(Ok((rowid, payload.to_vec())))
                            }
                            Ok(_) => unreachable!(),
                            Err(e) => return Some(Err(e.into())),
                        },
                        None => {
                            self.stack.pop();
                            continue;
                        }
                    }
                }
                PageKind::TableInterior => {
                    let frame = self.stack.last_mut().unwrap();
                    match frame.cursor.next(&frame.page) {
                        Some(raw) => match cell::parse_cell(PageKind::TableInterior, raw) {
                            Ok(cell::Cell::TableInterior { left_child, .. }) => {
                                if let Err(e) = self.seek_leftmost(left_child) {
                                    return Some(Err(e));
                                }
                                continue;
                            }
                            Ok(_) => unreachable!(),
                            Err(e) => return Some(Err(e.into())),
                        },
                        None => {
                            if !frame.returned_rightmost {
                                frame.returned_rightmost = true;
                                let rmp = frame.rightmost;
                                match rmp {
                                    Some(p) => {
                                        if let Err(e) = self.seek_leftmost(p) {
                                            return Some(Err(e));
                                        }
                                        continue;
                                    }
                                    None => return Some(Err(Error::MissingRightmostPointer)),
                                }
                            }
                            self.stack.pop();
                            continue;
                        }
                    }
                }
                _ => unreachable!(),
            }
        }
    }
}

/// Finds the record payload for a single rowid, pruning subtrees that
/// cannot contain it instead of visiting every leaf (used by the
/// index-accelerated query path, after an index lookup yields the rowid).
pub fn seek_rowid(
    pager: &mut Pager,
    root_page: PageNum,
    target: RowId,
) -> Result<Option<Vec<u8>>, Error> {
    let page_size = pager.page_size();
    let mut pagenum = root_page;
    loop {
        let page = pager.get_page(pagenum)?.clone();
        let start = btree_start_offset(pagenum);
        let hdr = header::parse_header(&page, start)?;
        match hdr.page_kind {
            PageKind::TableLeaf => {
                let mut cursor = cell::Cursor::new(&page, start, page_size)?;
                while let Some(raw) = cursor.next(&page) {
                    if let cell::Cell::TableLeaf { rowid, payload } =
                        cell::parse_cell(PageKind::TableLeaf, raw)?
                    {
                        if rowid == target {
                            return Ok(Some(payload.to_vec()));
                        }
                    }
                }
                return Ok(None);
            }
            PageKind::TableInterior => {
                let mut cursor = cell::Cursor::new(&page, start, page_size)?;
                let mut next_page = hdr
                    .rightmost_pointer
                    .ok_or(Error::MissingRightmostPointer)? as PageNum;
                while let Some(raw) = cursor.next(&page) {
                    if let cell::Cell::TableInterior { left_child, key } =
                        cell::parse_cell(PageKind::TableInterior, raw)?
                    {
                        // All rowids in `left_child`'s subtree are <= `key`.
                        if target <= key {
                            next_page = left_child;
                            break;
                        }
                    }
                }
                pagenum = next_page;
            }
            _ => return Err(Error::UnexpectedIndexPage),
        }
    }
}
