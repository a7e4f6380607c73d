//! The query evaluator: the structured value the SQL-surface
//! collaborator (`parser`) produces, and the logic that executes it
//! against an open database — choosing a full table scan or an
//! index-accelerated rowid lookup.

use crate::btree::{index as btree_index, table as btree_table};
use crate::column_resolver;
use crate::pager::Pager;
use crate::record;
use crate::schema;
use crate::value::{Row, Value};

/// An equality predicate: `column = value`.
#[derive(Debug, Clone)]
pub struct Predicate {
    pub column: String,
    pub value: String,
}

/// The projected columns of a `SELECT`: either an explicit, ordered list
/// of names, or `*` (every column of the table, in declaration order).
#[derive(Debug, Clone)]
pub enum ColumnSpec {
    All,
    Named(Vec<String>),
}

/// The structured query value the SQL-surface collaborator hands to this
/// evaluator. Kept deliberately minimal — parsing and evaluation stay
/// decoupled at this seam.
#[derive(Debug, Clone)]
pub enum Query {
    DbInfo,
    CountRows {
        table: String,
    },
    Select {
        columns: ColumnSpec,
        table: String,
        filter: Option<Predicate>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbInfo {
    pub page_size: u32,
    /// Count of entries on the schema root page (legacy quirk; see
    /// DESIGN.md Open Question 1 — this conflates schema entries with
    /// tables and is not a full-schema-subtree count).
    pub num_tables: u32,
}

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error(transparent)]
    Pager(#[from] crate::pager::Error),
    #[error(transparent)]
    Schema(#[from] schema::Error),
    #[error(transparent)]
    ColumnResolver(#[from] column_resolver::Error),
    #[error(transparent)]
    TableScan(#[from] btree_table::Error),
    #[error(transparent)]
    IndexSearch(#[from] btree_index::Error),
    #[error(transparent)]
    Record(#[from] record::Error),
    #[error("Table not found: {0}")]
    TableNotFound(String),
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
}

impl Error {
    /// Maps a resolution failure onto its exact diagnostic string
    /// (`Table not found: X` / `Column not found: X`), folding in the
    /// lower-layer "not found" variants this evaluator produces.
    pub fn not_found_message(&self) -> Option<String> {
        match self {
            Error::TableNotFound(t) => Some(format!("Table not found: {}", t)),
            Error::ColumnNotFound(c) => Some(format!("Column not found: {}", c)),
            Error::Schema(schema::Error::TableNotFound(t)) => Some(format!("Table not found: {}", t)),
            Error::ColumnResolver(column_resolver::Error::ColumnNotFound(c)) => {
                Some(format!("Column not found: {}", c))
            }
            _ => None,
        }
    }
}

pub fn run_dbinfo(pager: &mut Pager) -> Result<DbInfo, Error> {
    let page_size = pager.page_size();
    let num_tables = schema::root_page_entry_count(pager, page_size)?;
    Ok(DbInfo { page_size, num_tables })
}

fn decode_row(payload: &[u8], projected_idx: &[usize]) -> Result<Row, Error> {
    let values = record::decode_record(payload)?;
    let projected = projected_idx
        .iter()
        .map(|&i| values.get(i).cloned().unwrap_or(Value::Null))
        .collect();
    Ok(Row { values: projected })
}

pub fn run_count_rows(pager: &mut Pager, table: &str) -> Result<u64, Error> {
    let info = schema::find_table(pager, table)?;
    let mut count: u64 = 0;
    for row in btree_table::TableScan::new(pager, info.root_page) {
        row?;
        count += 1;
    }
    Ok(count)
}

pub fn run_select(
    pager: &mut Pager,
    columns: &ColumnSpec,
    table: &str,
    filter: &Option<Predicate>,
) -> Result<Vec<Row>, Error> {
    let info = schema::find_table(pager, table)?;
    let projected_idx: Vec<usize> = match columns {
        ColumnSpec::All => {
            (0..column_resolver::table_column_names(&info.create_sql)?.len()).collect()
        }
        ColumnSpec::Named(names) => names
            .iter()
            .map(|c| column_resolver::resolve_table_column(&info.create_sql, c))
            .collect::<Result<_, _>>()?,
    };

    let predicate_idx = match filter {
        Some(p) => Some(column_resolver::resolve_table_column(&info.create_sql, &p.column)?),
        None => None,
    };

    // Use the index path only when there's a predicate AND an applicable
    // index exists for its column.
    let index_info = match filter {
        Some(p) => schema::find_index(pager, table, &p.column)?,
        None => None,
    };

    match (filter, index_info) {
        (Some(p), Some(idx)) => {
            log::debug!("select on {} using index {:?} for column {}", table, idx.root_page, p.column);
            let target = Value::Text(p.value.clone().into_bytes());
            let rowids = btree_index::search_equal(pager, idx.root_page, &target)?;
            let mut rows = vec![];
            for rowid in rowids {
                if let Some(payload) = btree_table::seek_rowid(pager, info.root_page, rowid)? {
                    rows.push(decode_row(&payload, &projected_idx)?);
                }
            }
            Ok(rows)
        }
        _ => {
            log::debug!("select on {} using full scan", table);
            let mut rows = vec![];
            for result in btree_table::TableScan::new(pager, info.root_page) {
                let (_rowid, payload) = result?;
                if let (Some(p), Some(pred_idx)) = (filter, predicate_idx) {
                    let values = record::decode_record(&payload)?;
                    let matches = values
                        .get(pred_idx)
                        .map(|v| v.to_string() == p.value)
                        .unwrap_or(false);
                    if !matches {
                        continue;
                    }
                }
                rows.push(decode_row(&payload, &projected_idx)?);
            }
            Ok(rows)
        }
    }
}

pub fn run(pager: &mut Pager, query: &Query) -> Result<QueryResult, Error> {
    match query {
        Query::DbInfo => Ok(QueryResult::DbInfo(run_dbinfo(pager)?)),
        Query::CountRows { table } => Ok(QueryResult::Count(run_count_rows(pager, table)?)),
        Query::Select { columns, table, filter } => {
            Ok(QueryResult::Rows(run_select(pager, columns, table, filter)?))
        }
    }
}

#[derive(Debug, Clone)]
pub enum QueryResult {
    DbInfo(DbInfo),
    Count(u64),
    Rows(Vec<Row>),
}
