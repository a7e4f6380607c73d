//! The schema walker: enumerates the entries of the schema table (root
//! page 1) and resolves a table name to its root page/`CREATE TABLE`
//! text, or a `(table, column)` pair to an applicable index.

use crate::btree::table::TableScan;
use crate::column_resolver;
use crate::pager::{PageNum, Pager};
use crate::record;
use crate::value::Value;

pub const SCHEMA_ROOT_PAGE: PageNum = 1;

const COL_TYPE: usize = 0;
const COL_NAME: usize = 1;
const COL_TBL_NAME: usize = 2;
const COL_ROOTPAGE: usize = 3;
const COL_SQL: usize = 4;

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error(transparent)]
    Table(#[from] crate::btree::table::Error),
    #[error(transparent)]
    Record(#[from] record::Error),
    #[error("Table not found: {0}")]
    TableNotFound(String),
}

#[derive(Debug, Clone)]
pub struct TableInfo {
    pub root_page: PageNum,
    pub create_sql: String,
}

#[derive(Debug, Clone)]
pub struct IndexInfo {
    pub root_page: PageNum,
    #[allow(dead_code)]
    pub name: String,
}

#[derive(Debug, Clone)]
struct SchemaEntry {
    kind: String,
    name: String,
    tbl_name: String,
    root_page: PageNum,
    sql: String,
}

fn text_column(values: &[Value], idx: usize) -> String {
    match values.get(idx) {
        Some(Value::Text(bytes)) => String::from_utf8_lossy(bytes).into_owned(),
        _ => String::new(),
    }
}

/// Enumerates every row of the schema table, in B-tree pre-order. The
/// schema table is itself a table btree rooted at page 1; it is walked
/// with the same scanner used for ordinary tables, so a schema spanning
/// more than one page (interior root) is handled correctly.
fn all_entries(pager: &mut Pager) -> Result<Vec<SchemaEntry>, Error> {
    let mut entries = vec![];
    for row in TableScan::new(pager, SCHEMA_ROOT_PAGE) {
        let (_rowid, payload) = row?;
        let values = record::decode_record(&payload)?;
        let root_page = match values.get(COL_ROOTPAGE) {
            Some(Value::Int(n)) => *n as PageNum,
            _ => continue,
        };
        entries.push(SchemaEntry {
            kind: text_column(&values, COL_TYPE),
            name: text_column(&values, COL_NAME),
            tbl_name: text_column(&values, COL_TBL_NAME),
            root_page,
            sql: text_column(&values, COL_SQL),
        });
    }
    Ok(entries)
}

/// The number of entries on the schema root page itself (not its full
/// subtree), used by `.dbinfo`'s legacy "number of tables" count — see
/// DESIGN.md Open Question 1. Counts every schema entry (tables, indexes,
/// views, triggers alike), matching the documented legacy behavior.
pub fn root_page_entry_count(pager: &mut Pager, page_size: u32) -> Result<u32, Error> {
    let page = pager.get_page(SCHEMA_ROOT_PAGE)?.clone();
    let _ = page_size;
    let hdr = crate::btree::header::parse_header(&page, crate::btree::btree_start_offset(SCHEMA_ROOT_PAGE))?;
    Ok(hdr.num_cells)
}

/// Resolves `table_name` (ASCII case-insensitive) to its root page and
/// stored `CREATE TABLE` text.
pub fn find_table(pager: &mut Pager, table_name: &str) -> Result<TableInfo, Error> {
    for e in all_entries(pager)? {
        if e.kind.eq_ignore_ascii_case("table") && e.name.eq_ignore_ascii_case(table_name) {
            return Ok(TableInfo {
                root_page: e.root_page,
                create_sql: e.sql,
            });
        }
    }
    Err(Error::TableNotFound(table_name.to_owned()))
}

/// Resolves an index on `(table_name, column_name)`, if one exists.
/// Requires re-parsing each candidate index's own `CREATE INDEX` text
/// (via `column_resolver::index_column_name`) since the schema table
/// does not store indexed columns separately from the DDL text.
pub fn find_index(pager: &mut Pager, table_name: &str, column_name: &str) -> Result<Option<IndexInfo>, Error> {
    for e in all_entries(pager)? {
        if !e.kind.eq_ignore_ascii_case("index") || !e.tbl_name.eq_ignore_ascii_case(table_name) {
            continue;
        }
        if e.sql.is_empty() {
            // Auto-created indexes (e.g. for UNIQUE constraints) have no
            // stored CREATE INDEX text; they can't be resolved by column.
            continue;
        }
        match column_resolver::index_column_name(&e.sql) {
            Ok(col) if col.eq_ignore_ascii_case(column_name) => {
                return Ok(Some(IndexInfo {
                    root_page: e.root_page,
                    name: e.name,
                }))
            }
            _ => continue,
        }
    }
    Ok(None)
}
