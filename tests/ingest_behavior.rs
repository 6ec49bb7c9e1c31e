//! Behavior-driven tests for loading price files
//!
//! These tests verify WHAT ends up in the store when a user points the
//! loader at a directory of exported CSV files.

use std::fs;
use std::path::Path;

use ohlcview_core::{ingest_directory, ingest_file, IngestError, Warehouse};
use tempfile::tempdir;

const AAPL: &str = "\
Date,Close/Last,Volume,Open,High,Low
01/04/2024,$181.91,71983570,$182.15,$183.0872,$180.88
01/03/2024,$184.25,58414460,$184.22,$185.88,$183.43
01/02/2024,$185.64,82488670,$187.15,$188.44,$183.885
";

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("write csv");
}

// =============================================================================
// Ingest: Directory loads
// =============================================================================

#[test]
fn when_user_loads_a_directory_every_csv_becomes_a_company() {
    // Given: Two price files and an unrelated file
    let temp = tempdir().expect("tempdir");
    write(temp.path(), "aapl.csv", AAPL);
    write(temp.path(), "msft.csv", "Date,Close\n2024-01-02,370.87\n");
    write(temp.path(), "notes.txt", "not a price file");
    let warehouse = Warehouse::open_in_memory().expect("warehouse");

    // When: The directory is loaded
    let report = ingest_directory(&warehouse, temp.path()).expect("ingest");

    // Then: Both tickers are stored, in file-name order
    assert!(report.failures.is_empty());
    let symbols: Vec<&str> = report.files.iter().map(|file| file.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    assert_eq!(report.total_rows, 4);

    let companies = warehouse.companies().expect("companies");
    let names: Vec<&str> = companies.iter().map(|company| company.name.as_str()).collect();
    assert_eq!(names, vec!["aapl", "msft"]);

    let rows = warehouse
        .daily_prices("AAPL", "2024-01-01", "2024-01-31")
        .expect("query");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].date, "2024-01-02");
    assert_eq!(rows[0].low, 183.89);
    assert_eq!(rows[2].high, 183.09);
}

#[test]
fn when_one_file_is_broken_the_rest_still_load() {
    let temp = tempdir().expect("tempdir");
    write(temp.path(), "aapl.csv", AAPL);
    write(temp.path(), "bad.csv", "Date,Open\n2024-01-02,1\n");
    let warehouse = Warehouse::open_in_memory().expect("warehouse");

    let report = ingest_directory(&warehouse, temp.path()).expect("ingest");

    assert_eq!(report.files.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].file.ends_with("bad.csv"));
    assert!(report.failures[0].error.contains("Close/Last"));
}

#[test]
fn when_directory_is_missing_the_load_fails_up_front() {
    let temp = tempdir().expect("tempdir");
    let warehouse = Warehouse::open_in_memory().expect("warehouse");

    let error = ingest_directory(&warehouse, &temp.path().join("StocksData")).expect_err("missing");
    assert!(matches!(error, IngestError::DirectoryNotFound { .. }));
}

// =============================================================================
// Ingest: Re-running a load
// =============================================================================

#[test]
fn when_user_reloads_a_file_rows_are_not_duplicated() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("aapl.csv");
    fs::write(&path, AAPL).expect("write");
    let warehouse = Warehouse::open_in_memory().expect("warehouse");

    ingest_file(&warehouse, &path).expect("first");
    let second = ingest_file(&warehouse, &path).expect("second");

    assert_eq!(second.store.previous_rows, 3);
    assert_eq!(second.store.written_rows, 3);
    assert_eq!(second.store.removed_rows, 0);
    assert_eq!(warehouse.summary().expect("summary").total_rows, 3);
    assert_eq!(warehouse.companies().expect("companies").len(), 1);
}

#[test]
fn when_file_has_bad_rows_they_are_reported_and_skipped() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("zzz.csv");
    fs::write(
        &path,
        "Date,Close/Last,Volume,Open,High,Low\n\
         01/02/2024,$10.00,100,$10.00,$11.00,$9.00\n\
         01/03/2024,N/A,100,$10.00,$11.00,$9.00\n\
         01/02/2024,$12.00,100,$12.00,$12.00,$12.00\n",
    )
    .expect("write");
    let warehouse = Warehouse::open_in_memory().expect("warehouse");

    let report = ingest_file(&warehouse, &path).expect("ingest");

    assert_eq!(report.rows_loaded, 1);
    assert_eq!(report.skipped_rows.len(), 1);
    assert_eq!(report.skipped_rows[0].line, 3);
    assert_eq!(report.duplicate_rows, 1);
    let rows = warehouse
        .daily_prices("ZZZ", "2024-01-01", "2024-01-31")
        .expect("query");
    assert_eq!(rows[0].close, 10.0);
}

#[test]
fn when_file_name_is_not_a_ticker_the_file_is_rejected() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("2024 prices.csv");
    fs::write(&path, AAPL).expect("write");
    let warehouse = Warehouse::open_in_memory().expect("warehouse");

    let error = ingest_file(&warehouse, &path).expect_err("must reject");
    assert!(matches!(error, IngestError::InvalidFileName { .. }));
    assert!(warehouse.companies().expect("companies").is_empty());
}
