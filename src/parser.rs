//! The SQL-surface collaborator: turns a query string into the
//! structured `Query` value the evaluator (`query.rs`) consumes.
//! Deliberately minimal — the on-disk format and btree traversal are
//! the hard part, not the SQL surface.

use crate::query::{ColumnSpec, Predicate, Query};
use pest::Parser;

#[derive(pest_derive::Parser)]
#[grammar = "sql.pest"]
struct SqlParser;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Could not parse SQL statement: {0}")]
    Syntax(Box<pest::error::Error<Rule>>),
}

impl From<pest::error::Error<Rule>> for Error {
    fn from(e: pest::error::Error<Rule>) -> Error {
        Error::Syntax(Box::new(e))
    }
}

fn strip_quotes(literal: &str) -> String {
    literal[1..literal.len() - 1].to_string()
}

/// Parses `SELECT COUNT(*) FROM ident` or
/// `SELECT ident[, ident]* FROM ident [WHERE ident = 'literal']`.
pub fn parse(sql: &str) -> Result<Query, Error> {
    let mut pairs = SqlParser::parse(Rule::count_stmt, sql)
        .or_else(|_| SqlParser::parse(Rule::select_stmt, sql))?;
    let stmt = pairs.next().expect("grammar guarantees one top-level pair");

    match stmt.as_rule() {
        Rule::count_stmt => {
            let table = stmt
                .into_inner()
                .find(|p| p.as_rule() == Rule::ident)
                .expect("count_stmt always has a table ident")
                .as_str()
                .to_string();
            Ok(Query::CountRows { table })
        }
        Rule::select_stmt => {
            let mut columns = ColumnSpec::Named(vec![]);
            let mut table = None;
            let mut filter = None;
            for part in stmt.into_inner() {
                match part.as_rule() {
                    Rule::column_list => {
                        let mut inner = part.into_inner().peekable();
                        columns = if matches!(inner.peek().map(|p| p.as_rule()), Some(Rule::all_columns)) {
                            ColumnSpec::All
                        } else {
                            ColumnSpec::Named(inner.map(|c| c.as_str().to_string()).collect())
                        };
                    }
                    Rule::ident => table = Some(part.as_str().to_string()),
                    Rule::predicate => {
                        let mut inner = part.into_inner();
                        let column = inner.next().unwrap().as_str().to_string();
                        let literal = inner.next().unwrap().as_str();
                        filter = Some(Predicate { column, value: strip_quotes(literal) });
                    }
                    Rule::EOI => {}
                    _ => unreachable!(),
                }
            }
            Ok(Query::Select {
                columns,
                table: table.expect("select_stmt always has a table ident"),
                filter,
            })
        }
        _ => unreachable!("grammar only produces count_stmt or select_stmt at top level"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_count_statement() {
        let q = parse("SELECT COUNT(*) FROM apples").unwrap();
        assert!(matches!(q, Query::CountRows { table } if table == "apples"));
    }

    #[test]
    fn parses_count_case_insensitively() {
        let q = parse("select count(*) from Apples").unwrap();
        assert!(matches!(q, Query::CountRows { table } if table == "Apples"));
    }

    #[test]
    fn parses_projection_without_predicate() {
        let q = parse("SELECT name, color FROM apples").unwrap();
        match q {
            Query::Select { columns, table, filter } => {
                assert!(matches!(columns, ColumnSpec::Named(c) if c == vec!["name", "color"]));
                assert_eq!(table, "apples");
                assert!(filter.is_none());
            }
            _ => panic!("expected Select"),
        }
    }

    #[test]
    fn parses_select_star() {
        let q = parse("SELECT * FROM nope").unwrap();
        match q {
            Query::Select { columns, table, filter } => {
                assert!(matches!(columns, ColumnSpec::All));
                assert_eq!(table, "nope");
                assert!(filter.is_none());
            }
            _ => panic!("expected Select"),
        }
    }

    #[test]
    fn parses_projection_with_predicate() {
        let q = parse("SELECT name FROM apples WHERE color = 'Red'").unwrap();
        match q {
            Query::Select { columns, table, filter } => {
                assert!(matches!(columns, ColumnSpec::Named(c) if c == vec!["name"]));
                assert_eq!(table, "apples");
                let f = filter.unwrap();
                assert_eq!(f.column, "color");
                assert_eq!(f.value, "Red");
            }
            _ => panic!("expected Select"),
        }
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert!(parse("DELETE FROM apples").is_err());
    }
}
