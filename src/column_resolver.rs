//! Resolves column ordinals out of stored DDL text.
//!
//! The schema table stores the original `CREATE TABLE`/`CREATE INDEX`
//! text verbatim; this module re-parses just enough of it to answer
//! "which ordinal is column X" without a real SQL grammar. This is a
//! simplified resolver: nested parens in a column's type definition
//! (e.g. `DECIMAL(10,2)`) and multi-column indexes are a documented
//! limitation, not handled.

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("CREATE statement has no parenthesized column list: {0:?}")]
    NoColumnList(String),
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
}

/// Extracts the substring between the first `(` and its matching final `)`.
fn parenthesized_body(sql: &str) -> Result<&str, Error> {
    let open = sql.find('(').ok_or_else(|| Error::NoColumnList(sql.to_owned()))?;
    let close = sql.rfind(')').ok_or_else(|| Error::NoColumnList(sql.to_owned()))?;
    if close <= open {
        return Err(Error::NoColumnList(sql.to_owned()));
    }
    Ok(&sql[open + 1..close])
}

/// Strips one layer of `"`/`` ` `` quoting around an identifier, if present.
fn unquote(token: &str) -> &str {
    let t = token.trim();
    for quote in ['"', '`'] {
        if t.len() >= 2 && t.starts_with(quote) && t.ends_with(quote) {
            return &t[1..t.len() - 1];
        }
    }
    t
}

/// Splits a `CREATE TABLE`'s column-def list by top-level commas (a
/// simplified implementation that assumes no nested parens inside a
/// column definition) and returns each column's name, in declaration
/// order.
pub fn table_column_names(create_table_sql: &str) -> Result<Vec<String>, Error> {
    let body = parenthesized_body(create_table_sql)?;
    Ok(body
        .split(',')
        .map(|fragment| {
            let first_token = fragment.trim().split_whitespace().next().unwrap_or("");
            unquote(first_token).to_owned()
        })
        .collect())
}

/// Returns the zero-based ordinal of `column_name` within a `CREATE
/// TABLE`'s column list, matched case-insensitively.
pub fn resolve_table_column(create_table_sql: &str, column_name: &str) -> Result<usize, Error> {
    table_column_names(create_table_sql)?
        .iter()
        .position(|c| c.eq_ignore_ascii_case(column_name))
        .ok_or_else(|| Error::ColumnNotFound(column_name.to_owned()))
}

/// Returns the single identifier indexed by a `CREATE INDEX ix ON t (col)`
/// statement.
pub fn index_column_name(create_index_sql: &str) -> Result<String, Error> {
    let body = parenthesized_body(create_index_sql)?;
    let first_identifier = body.split(',').next().unwrap_or("").trim();
    Ok(unquote(first_identifier).to_owned())
}
