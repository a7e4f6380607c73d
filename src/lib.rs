//! A read-only query engine over a single on-disk database file in the
//! well-known page/B-tree relational format. Answers `.dbinfo`,
//! `SELECT COUNT(*)`, and single-table projection queries with an
//! optional indexed or scanned equality predicate.
//!
//! Layering: `pager` maps page numbers to bytes; `btree` walks table and
//! index B-trees over those pages; `record` decodes a cell's payload
//! into typed `value::Value`s; `schema` resolves table/index names via
//! the schema table; `column_resolver` re-parses stored DDL text for
//! column ordinals; `query` ties it together into the evaluator;
//! `parser` is the (intentionally minimal) SQL-surface collaborator.

mod btree;
mod column_resolver;
mod dbheader;
pub mod pager;
pub mod parser;
pub mod query;
mod record;
mod schema;
#[cfg(test)]
mod testutil;
pub mod value;
pub(crate) mod varint;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Pager(#[from] pager::Error),
    #[error(transparent)]
    Parser(#[from] parser::Error),
    #[error(transparent)]
    Query(#[from] query::Error),
}

impl Error {
    /// Maps a table/column resolution failure onto its exact diagnostic
    /// string (`Table not found: X` / `Column not found: X`). Returns
    /// `None` for every other error kind, which callers format with
    /// their own `Display` message instead.
    pub fn not_found_message(&self) -> Option<String> {
        match self {
            Error::Query(e) => e.not_found_message(),
            _ => None,
        }
    }
}

/// Opens `path` read-only and parses its file header.
pub fn open(path: &str) -> Result<pager::Pager, pager::Error> {
    pager::Pager::open(path)
}

/// Runs the `.dbinfo` command.
pub fn run_dbinfo(pager: &mut pager::Pager) -> Result<query::DbInfo, Error> {
    Ok(query::run_dbinfo(pager)?)
}

/// Parses and runs a SQL string against an open database.
pub fn run_sql(pager: &mut pager::Pager, sql: &str) -> Result<query::QueryResult, Error> {
    let parsed = parser::parse(sql)?;
    Ok(query::run(pager, &parsed)?)
}
