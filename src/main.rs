//! The CLI frontend: argument parsing, `.dbinfo` vs SQL-string dispatch,
//! and `|`-joined row printing. All of the interesting engineering
//! lives in the library.

use litequery::query::QueryResult;
use litequery::value::format_row;

fn print_result(result: QueryResult) {
    match result {
        QueryResult::DbInfo(info) => {
            println!("database page size: {}", info.page_size);
            println!("number of tables: {}", info.num_tables);
        }
        QueryResult::Count(n) => println!("{}", n),
        QueryResult::Rows(rows) => {
            for row in &rows {
                println!("{}", format_row(row));
            }
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <database file path> <command>", args[0]);
        std::process::exit(1);
    }
    let db_path = &args[1];
    let command = &args[2];

    let mut pager = match litequery::open(db_path) {
        Ok(p) => p,
        Err(e) => {
            println!("{}", e);
            std::process::exit(0);
        }
    };

    let result = if command == ".dbinfo" {
        litequery::run_dbinfo(&mut pager).map(QueryResult::DbInfo)
    } else {
        litequery::run_sql(&mut pager, command)
    };

    match result {
        Ok(r) => print_result(r),
        Err(e) => {
            // Legacy behavior: print one diagnostic line and exit 0.
            println!("{}", e.not_found_message().unwrap_or_else(|| e.to_string()));
        }
    }
}
