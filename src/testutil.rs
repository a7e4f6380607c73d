//! Test-only helpers that assemble small synthetic database files (as
//! in-memory byte buffers) so the page/B-tree/record/schema/index logic
//! can be exercised without checked-in binary fixtures.

#![cfg(test)]

use crate::pager::{PageNum, Pager};
use crate::value::Value;
use crate::varint;
use std::sync::atomic::{AtomicU64, Ordering};

const MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// Picks the narrowest serial type/width that can hold `v`, mirroring the
/// on-disk serial-type table `record::decode_record` reads back (this is
/// the writer side, used only by tests).
fn int_serial_type_and_bytes(v: i64) -> (i64, Vec<u8>) {
    if v == 0 {
        return (8, vec![]);
    }
    if v == 1 {
        return (9, vec![]);
    }
    // Serial type 1 is a single byte read back as an unsigned small int
    // (see record::decode_value), so only non-negative byte-range values
    // may use it here; anything negative needs a wider, signed width.
    if (0..=u8::MAX as i64).contains(&v) {
        return (1, vec![v as u8]);
    }
    if (i16::MIN as i64..=i16::MAX as i64).contains(&v) {
        return (2, (v as i16).to_be_bytes().to_vec());
    }
    if (-(1 << 23)..(1 << 23)).contains(&v) {
        let b = (v as i32).to_be_bytes();
        return (3, b[1..].to_vec());
    }
    if (i32::MIN as i64..=i32::MAX as i64).contains(&v) {
        return (4, (v as i32).to_be_bytes().to_vec());
    }
    (6, v.to_be_bytes().to_vec())
}

fn encode_value(v: &Value) -> (i64, Vec<u8>) {
    match v {
        Value::Null => (0, vec![]),
        Value::Int(i) => int_serial_type_and_bytes(*i),
        Value::Float(f) => (7, f.to_be_bytes().to_vec()),
        Value::Blob(b) => (12 + 2 * b.len() as i64, b.clone()),
        Value::Text(t) => (13 + 2 * t.len() as i64, t.clone()),
    }
}

/// Encodes a record (header-size varint + serial-type varints + bodies).
/// Assumes the header fits in a 1-byte varint (true for every fixture
/// this module builds).
pub fn encode_record(values: &[Value]) -> Vec<u8> {
    let mut serial_types = vec![];
    let mut bodies = vec![];
    for v in values {
        let (st, body) = encode_value(v);
        serial_types.push(st);
        bodies.push(body);
    }
    let mut header_tail = vec![];
    for st in &serial_types {
        varint::write_varint(*st, &mut header_tail);
    }
    let header_len = 1 + header_tail.len();
    assert!(header_len < 128, "fixture record header too long for a 1-byte varint");
    let mut record = vec![header_len as u8];
    record.extend(header_tail);
    for body in bodies {
        record.extend(body);
    }
    record
}

fn table_leaf_cell(rowid: i64, payload: &[u8]) -> Vec<u8> {
    let mut cell = vec![];
    varint::write_varint(payload.len() as i64, &mut cell);
    varint::write_varint(rowid, &mut cell);
    cell.extend_from_slice(payload);
    cell
}

fn index_leaf_cell(payload: &[u8]) -> Vec<u8> {
    let mut cell = vec![];
    varint::write_varint(payload.len() as i64, &mut cell);
    cell.extend_from_slice(payload);
    cell
}

/// Builds one full-size leaf page (table or index) holding `cells` in
/// pointer-array order, with `start` bytes of non-btree header preceding
/// the btree page header (100 on page 1, 0 elsewhere).
fn build_leaf_page(page_size: usize, start: usize, kind: u8, cells: &[Vec<u8>]) -> Vec<u8> {
    let mut page = vec![0u8; page_size];
    page[start] = kind;
    page[start + 3..start + 5].copy_from_slice(&(cells.len() as u16).to_be_bytes());
    let mut cell_content_end = page_size;
    let mut pointer_offset = start + 8;
    for cell in cells {
        cell_content_end -= cell.len();
        page[pointer_offset..pointer_offset + 2]
            .copy_from_slice(&(cell_content_end as u16).to_be_bytes());
        pointer_offset += 2;
        page[cell_content_end..cell_content_end + cell.len()].copy_from_slice(cell);
    }
    let ccs_field = if cell_content_end == 65536 {
        0
    } else {
        cell_content_end as u16
    };
    page[start + 5..start + 7].copy_from_slice(&ccs_field.to_be_bytes());
    page
}

fn file_header(page_size: usize, num_pages: u32) -> [u8; 16] {
    let field: u16 = if page_size == 65536 { 1 } else { page_size as u16 };
    let mut hdr = [0u8; 16];
    hdr[0..2].copy_from_slice(&field.to_be_bytes());
    let _ = num_pages;
    hdr
}

/// A whole synthetic database file, ready to be opened with a `Pager`.
pub struct SyntheticDb {
    pub bytes: Vec<u8>,
    pub table_root_page: PageNum,
    pub index_root_page: Option<PageNum>,
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

impl SyntheticDb {
    /// Writes the bytes to a uniquely-named temp file and opens a `Pager`
    /// on it. The temp file is removed immediately after opening; the
    /// still-open file descriptor keeps its contents readable.
    pub fn open_pager(&self) -> Pager {
        let id = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("litequery-synthetic-{}.db", id));
        std::fs::write(&path, &self.bytes).expect("should have written synthetic db");
        let pager = Pager::open(path.to_str().unwrap()).expect("should have opened synthetic db");
        std::fs::remove_file(&path).ok();
        pager
    }

    /// A schema page (page 1) plus a single table leaf page (page 2)
    /// holding `rows`.
    pub fn single_table(
        page_size: usize,
        table_name: &str,
        create_sql: &str,
        rows: &[(i64, Vec<Value>)],
    ) -> SyntheticDb {
        Self::build(page_size, table_name, create_sql, rows, None)
    }

    /// Like `single_table`, plus a third page: an index leaf page built
    /// from `(indexed_value, rowid)` pairs derived from `rows` at
    /// `indexed_col`.
    pub fn single_table_with_index(
        page_size: usize,
        table_name: &str,
        create_sql: &str,
        index_name: &str,
        create_index_sql: &str,
        rows: &[(i64, Vec<Value>)],
    ) -> SyntheticDb {
        let _ = index_name;
        Self::build(page_size, table_name, create_sql, rows, Some(create_index_sql))
    }

    fn build(
        page_size: usize,
        table_name: &str,
        create_sql: &str,
        rows: &[(i64, Vec<Value>)],
        create_index_sql: Option<&str>,
    ) -> SyntheticDb {
        let table_root_page: PageNum = 2;
        let index_root_page: Option<PageNum> = create_index_sql.map(|_| 3);

        let mut schema_rows: Vec<Vec<u8>> = vec![table_leaf_cell(
            1,
            &encode_record(&[
                Value::Text(b"table".to_vec()),
                Value::Text(table_name.as_bytes().to_vec()),
                Value::Text(table_name.as_bytes().to_vec()),
                Value::Int(table_root_page as i64),
                Value::Text(create_sql.as_bytes().to_vec()),
            ]),
        )];

        if let Some(index_sql) = create_index_sql {
            schema_rows.push(table_leaf_cell(
                2,
                &encode_record(&[
                    Value::Text(b"index".to_vec()),
                    Value::Text(b"synthetic_index".to_vec()),
                    Value::Text(table_name.as_bytes().to_vec()),
                    Value::Int(index_root_page.unwrap() as i64),
                    Value::Text(index_sql.as_bytes().to_vec()),
                ]),
            ));
        }

        let schema_page = build_leaf_page(page_size, 100, 0x0d, &schema_rows);

        let table_cells: Vec<Vec<u8>> = rows
            .iter()
            .map(|(rowid, values)| table_leaf_cell(*rowid, &encode_record(values)))
            .collect();
        let table_page = build_leaf_page(page_size, 0, 0x0d, &table_cells);

        let mut bytes = vec![];
        let mut num_pages = 2u32;
        if create_index_sql.is_some() {
            num_pages = 3;
        }
        let file_hdr = file_header(page_size, num_pages);

        let mut page1 = schema_page.clone();
        page1[0..16].copy_from_slice(MAGIC);
        page1[16..18].copy_from_slice(&file_hdr[0..2]);
        page1[18] = 1;
        page1[19] = 1;
        page1[28..32].copy_from_slice(&num_pages.to_be_bytes());

        bytes.extend_from_slice(&page1);
        bytes.extend_from_slice(&table_page);

        if let Some(index_sql) = create_index_sql {
            let indexed_col_name =
                crate::column_resolver::index_column_name(index_sql).expect("bad index sql in fixture");
            let col_idx = crate::column_resolver::resolve_table_column(create_sql, &indexed_col_name)
                .expect("indexed column must exist in the table fixture");
            let index_cells: Vec<Vec<u8>> = rows
                .iter()
                .map(|(rowid, values)| {
                    index_leaf_cell(&encode_record(&[values[col_idx].clone(), Value::Int(*rowid)]))
                })
                .collect();
            let index_page = build_leaf_page(page_size, 0, 0x0a, &index_cells);
            bytes.extend_from_slice(&index_page);
        }

        SyntheticDb {
            bytes,
            table_root_page,
            index_root_page,
        }
    }
}
