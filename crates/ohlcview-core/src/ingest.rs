//! Loading daily price files into the warehouse.
//!
//! A price file is a CSV named after its ticker (`aapl.csv`) with a header
//! row. Headers are matched case-insensitively:
//!
//! | Column | Required | Notes |
//! |--------|----------|-------|
//! | `Date` | yes | `MM/DD/YYYY` or `YYYY-MM-DD` |
//! | `Close/Last` or `Close` | yes | `$` prefix allowed |
//! | `Open`, `High`, `Low` | no | blank or absent cells fall back to the close |
//! | `Volume` | no | blank or absent cells count as 0 |
//!
//! Rows with a blank date or close are dropped, rows that fail validation
//! are skipped with a reason, and a repeated date keeps its first row.
//! Each file replaces the stored history of its ticker in one transaction.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ohlcview_warehouse::{PriceRecord, ReplaceReport, Warehouse, WarehouseError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{parse_trading_date, DailyBar, Price, Symbol};
use crate::store::record_from_bar;
use crate::ValidationError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("data directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("cannot derive a ticker from file name {}: {source}", path.display())]
    InvalidFileName {
        path: PathBuf,
        source: ValidationError,
    },

    #[error("missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),
}

/// A data row that was not loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based line number in the file, header included.
    pub line: u64,
    pub reason: String,
}

/// Bars read from one price file, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPrices {
    pub bars: Vec<DailyBar>,
    pub skipped: Vec<SkippedRow>,
    pub duplicates: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file: String,
    pub symbol: Symbol,
    pub company_name: String,
    pub rows_loaded: usize,
    pub skipped_rows: Vec<SkippedRow>,
    pub duplicate_rows: usize,
    pub store: ReplaceReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryReport {
    pub directory: String,
    pub files: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
    pub total_rows: usize,
}

struct Columns {
    date: usize,
    close: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    volume: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, IngestError> {
        let lowered: Vec<String> = headers
            .iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .collect();
        let find = |names: &[&str]| lowered.iter().position(|h| names.contains(&h.as_str()));

        Ok(Self {
            date: find(&["date"]).ok_or(IngestError::MissingColumn { column: "Date" })?,
            close: find(&["close/last", "close"])
                .ok_or(IngestError::MissingColumn { column: "Close/Last" })?,
            open: find(&["open"]),
            high: find(&["high"]),
            low: find(&["low"]),
            volume: find(&["volume"]),
        })
    }
}

/// Parse a price file for `symbol`.
pub fn parse_price_csv<R: io::Read>(
    reader: R,
    symbol: &Symbol,
) -> Result<ParsedPrices, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::locate(reader.headers()?)?;

    let mut parsed = ParsedPrices::default();
    let mut seen = HashSet::new();

    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let cell = |index: usize| record.get(index).unwrap_or("").trim();
        let optional = |index: Option<usize>| index.map(cell).filter(|value| !value.is_empty());

        let (date, close) = (cell(columns.date), cell(columns.close));
        if date.is_empty() || close.is_empty() {
            parsed.skipped.push(SkippedRow {
                line,
                reason: String::from("missing date or close"),
            });
            continue;
        }

        let bar = (|| -> Result<DailyBar, ValidationError> {
            let close = Price::parse(close)?;
            let price_or_close = |index| optional(index).map_or(Ok(close), Price::parse);
            DailyBar::new(
                symbol.clone(),
                parse_trading_date(date)?,
                price_or_close(columns.open)?,
                price_or_close(columns.high)?,
                price_or_close(columns.low)?,
                close,
                optional(columns.volume).map_or(Ok(0), parse_volume)?,
            )
        })();

        match bar {
            Ok(bar) if seen.insert(bar.date) => parsed.bars.push(bar),
            Ok(bar) => {
                debug!(%symbol, date = %bar.date, line, "dropping repeated date");
                parsed.duplicates += 1;
            }
            Err(error) => parsed.skipped.push(SkippedRow {
                line,
                reason: error.to_string(),
            }),
        }
    }

    parsed.bars.sort_by_key(|bar| bar.date);
    Ok(parsed)
}

fn parse_volume(value: &str) -> Result<u64, ValidationError> {
    let negative = || ValidationError::NegativeValue { field: "volume" };
    if let Ok(volume) = value.parse::<u64>() {
        return Ok(volume);
    }
    if value.starts_with('-') {
        return Err(negative());
    }
    // Exports occasionally write whole volumes as `1234.0`.
    match value.parse::<f64>() {
        Ok(volume) if !volume.is_finite() => {
            Err(ValidationError::NonFiniteValue { field: "volume" })
        }
        Ok(volume) if volume.fract() == 0.0 && volume <= u64::MAX as f64 => Ok(volume as u64),
        _ => Err(ValidationError::InvalidVolume {
            value: value.to_owned(),
        }),
    }
}

/// Load one price file, replacing whatever the store held for its ticker.
pub fn ingest_file(warehouse: &Warehouse, path: &Path) -> Result<FileReport, IngestError> {
    let symbol = Symbol::from_file_stem(path).map_err(|source| IngestError::InvalidFileName {
        path: path.to_path_buf(),
        source,
    })?;
    let company_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(symbol.as_str())
        .to_owned();
    let file = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_owned();

    let parsed = parse_price_csv(fs::File::open(path)?, &symbol)?;
    if parsed.bars.is_empty() {
        warn!(%symbol, file = %file, "price file holds no loadable rows");
    }

    let rows: Vec<PriceRecord> = parsed.bars.iter().map(record_from_bar).collect();
    let run_id = format!("ingest:{}", Uuid::new_v4());
    let store = warehouse.replace_prices(&company_name, symbol.as_str(), &file, &run_id, &rows)?;

    info!(
        %symbol,
        file = %file,
        loaded = rows.len(),
        skipped = parsed.skipped.len(),
        duplicates = parsed.duplicates,
        "ingested price file"
    );

    Ok(FileReport {
        file,
        symbol,
        company_name,
        rows_loaded: rows.len(),
        skipped_rows: parsed.skipped,
        duplicate_rows: parsed.duplicates,
        store,
    })
}

/// Load every `*.csv` file in `directory`, in file-name order. A file that
/// fails is recorded and the rest still load.
pub fn ingest_directory(
    warehouse: &Warehouse,
    directory: &Path,
) -> Result<DirectoryReport, IngestError> {
    if !directory.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: directory.to_path_buf(),
        });
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    info!(directory = %directory.display(), files = paths.len(), "found price files");

    let mut report = DirectoryReport {
        directory: directory.display().to_string(),
        files: Vec::new(),
        failures: Vec::new(),
        total_rows: 0,
    };

    for path in paths {
        match ingest_file(warehouse, &path) {
            Ok(file) => {
                report.total_rows += file.rows_loaded;
                report.files.push(file);
            }
            Err(error) => {
                warn!(file = %path.display(), %error, "failed to ingest price file");
                report.failures.push(FileFailure {
                    file: path.display().to_string(),
                    error: error.to_string(),
                });
            }
        }
    }

    Ok(report)
}
