//! Searches a single-column index btree for rows matching an equality
//! predicate, returning the rowids of matching entries.
//!
//! An index record's final column is always the rowid of the table row it
//! points at (SQLite appends it when building the index entry). Interior
//! index cells, unlike table interior cells, carry a full record
//! themselves — the separator key is itself a live index entry, not just
//! a boundary value — so both its own match and its left subtree need
//! checking while descending.
//!
//! Descent rule (see Open Question 3 in DESIGN.md): a subtree is explored
//! whenever the target could be in it; cells are never skipped early.
//! `target <= separator` means the left child might hold it; the
//! right-most child is explored only when the target is strictly greater
//! than every separator on the page.

use super::{btree_start_offset, cell, header, PageKind, RowId};
use crate::pager::{PageNum, Pager};
use crate::record;
use crate::value::Value;

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error(transparent)]
    Pager(#[from] crate::pager::Error),
    #[error(transparent)]
    Header(#[from] header::Error),
    #[error(transparent)]
    Cell(#[from] cell::Error),
    #[error(transparent)]
    Record(#[from] record::Error),
    #[error("Index entry has no columns; expected at least the indexed value and a rowid.")]
    EmptyIndexEntry,
    #[error("Index entry's final column was not an integer rowid.")]
    MissingRowidColumn,
    #[error("Encountered a table page while searching an index btree.")]
    UnexpectedTablePage,
}

/// Returns the rowids of every index entry whose indexed column equals `target`.
pub fn search_equal(
    pager: &mut Pager,
    root_page: PageNum,
    target: &Value,
) -> Result<Vec<RowId>, Error> {
    let mut results = vec![];
    search_page(pager, root_page, target, &mut results)?;
    Ok(results)
}

fn entry_value_and_rowid(payload: &[u8]) -> Result<(Value, RowId), Error> {
    let values = record::decode_record(payload)?;
    if values.is_empty() {
        return Err(Error::EmptyIndexEntry);
    }
    let rowid = match values.last().unwrap() {
        Value::Int(r) => *r,
        _ => return Err(Error::MissingRowidColumn),
    };
    Ok((values[0].clone(), rowid))
}

fn search_page(
    pager: &mut Pager,
    pagenum: PageNum,
    target: &Value,
    results: &mut Vec<RowId>,
) -> Result<(), Error> {
    let page_size = pager.page_size();
    let page = pager.get_page(pagenum)?.clone();
    let start = btree_start_offset(pagenum);
    let hdr = header::parse_header(&page, start)?;

    match hdr.page_kind {
        PageKind::IndexLeaf => {
            let mut cursor = cell::Cursor::new(&page, start, page_size)?;
            while let Some(raw) = cursor.next(&page) {
                if let cell::Cell::IndexLeaf { payload } = cell::parse_cell(PageKind::IndexLeaf, raw)? {
                    let (value, rowid) = entry_value_and_rowid(payload)?;
                    if &value == target {
                        results.push(rowid);
                    }
                }
            }
            Ok(())
        }
        PageKind::IndexInterior => {
            let mut cursor = cell::Cursor::new(&page, start, page_size)?;
            let mut last_value: Option<Value> = None;
            let mut to_descend: Vec<PageNum> = vec![];
            while let Some(raw) = cursor.next(&page) {
                if let cell::Cell::IndexInterior {
                    left_child,
                    payload,
                } = cell::parse_cell(PageKind::IndexInterior, raw)?
                {
                    let (value, rowid) = entry_value_and_rowid(payload)?;
                    if *target <= value {
                        to_descend.push(left_child);
                    }
                    if &value == target {
                        results.push(rowid);
                    }
                    last_value = Some(value);
                }
            }
            let explore_rightmost = match &last_value {
                None => true,
                Some(v) => *target > *v,
            };
            if explore_rightmost {
                if let Some(rmp) = hdr.rightmost_pointer {
                    to_descend.push(rmp as PageNum);
                }
            }
            for child in to_descend {
                search_page(pager, child, target, results)?;
            }
            Ok(())
        }
        _ => Err(Error::UnexpectedTablePage),
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        use std::cmp::Ordering;
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Null, _) => Some(Ordering::Less),
            (_, Value::Null) => Some(Ordering::Greater),
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            // Byte-wise comparison only; no locale/NOCASE collations (see
            // DESIGN.md Open Question 5).
            (Value::Text(a), Value::Text(b)) => a.partial_cmp(b),
            (Value::Blob(a), Value::Blob(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}
