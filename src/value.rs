//! The tagged value space a decoded column can hold, and its textual
//! view for CLI output.

use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(Vec<u8>),
    Blob(Vec<u8>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, ""),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            Value::Blob(bytes) => write!(f, "{}", hex_lossy(bytes)),
        }
    }
}

fn hex_lossy(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// A decoded row: one `Value` per column, in column order.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
}

/// Joins a row's values with `|`, matching the CLI output format.
pub fn format_row(row: &Row) -> String {
    row.values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("|")
}
