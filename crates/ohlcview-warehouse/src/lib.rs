//! # Ohlcview Warehouse
//!
//! DuckDB-backed record store for daily OHLC price rows.
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `companies` | One row per instrument (id, name, symbol) |
//! | `ohlc_data` | Daily bars keyed by `(symbol, date)` |
//! | `ingest_log` | One row per ingested file |
//! | `schema_migrations` | Applied migration versions |
//!
//! Prices are stored as `DECIMAL(10,2)` and dates as `DATE`; both cross the
//! API boundary as `f64` and `YYYY-MM-DD` text. Every user-provided value is
//! bound as a query parameter.
//!
//! ```rust,no_run
//! use ohlcview_warehouse::Warehouse;
//!
//! let warehouse = Warehouse::open_default()?;
//! let rows = warehouse.daily_prices("AAPL", "2024-01-01", "2024-03-31")?;
//! println!("{} daily rows", rows.len());
//! # Ok::<(), ohlcview_warehouse::WarehouseError>(())
//! ```

pub mod migrations;
pub mod pool;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ::duckdb::{params, Connection, Row};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

pub use pool::{ConnectionPool, DbLocation, PooledConnection};

/// Errors that can occur during warehouse operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (creating the data directory).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A value could not be stored or read back faithfully.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A thread panicked while holding the connection pool lock.
    #[error("connection pool lock poisoned")]
    PoolPoisoned,
}

/// Configuration for the warehouse database.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Root directory for ohlcview data.
    pub ohlcview_home: PathBuf,
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Maximum number of idle connections kept in the pool.
    pub max_pool_size: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        let ohlcview_home = resolve_ohlcview_home();
        let db_path = ohlcview_home.join("data").join("ohlcview.duckdb");
        Self {
            ohlcview_home,
            db_path,
            max_pool_size: 4,
        }
    }
}

impl WarehouseConfig {
    /// Default configuration with the database file moved to `db_path`.
    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }
}

/// One daily price row as written to or read from `ohlc_data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    pub symbol: String,
    /// Trading date as `YYYY-MM-DD`.
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// A stored row together with the file it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredPrice {
    #[serde(flatten)]
    pub price: PriceRecord,
    pub file_source: Option<String>,
}

/// A row of the `companies` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyRecord {
    pub id: i64,
    pub name: String,
    pub symbol: String,
}

/// Outcome of replacing one instrument's price history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaceReport {
    pub symbol: String,
    pub company_id: i64,
    pub run_id: String,
    /// Rows stored for the symbol before the replace.
    pub previous_rows: u64,
    /// Rows written by this replace.
    pub written_rows: u64,
    /// Previously stored rows whose dates were absent from the new set.
    pub removed_rows: u64,
}

/// Earliest and latest trading date across all instruments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    pub earliest: String,
    pub latest: String,
}

/// Row count for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolCount {
    pub symbol: String,
    pub rows: u64,
}

/// Store-wide statistics used to verify an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarehouseSummary {
    pub total_rows: u64,
    pub companies: u64,
    pub per_symbol: Vec<SymbolCount>,
    pub bounds: Option<DateBounds>,
}

/// The record store.
#[derive(Clone)]
pub struct Warehouse {
    pool: ConnectionPool,
}

impl Warehouse {
    /// Open a warehouse with default configuration.
    pub fn open_default() -> Result<Self, WarehouseError> {
        Self::open(WarehouseConfig::default())
    }

    /// Open (creating if needed) the database file named by `config`.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let pool = ConnectionPool::open(DbLocation::File(config.db_path), config.max_pool_size)?;
        Self::from_pool(pool)
    }

    /// Open a private in-memory warehouse.
    pub fn open_in_memory() -> Result<Self, WarehouseError> {
        Self::from_pool(ConnectionPool::open(DbLocation::Memory, 2)?)
    }

    fn from_pool(pool: ConnectionPool) -> Result<Self, WarehouseError> {
        let warehouse = Self { pool };
        let connection = warehouse.pool.checkout()?;
        migrations::apply_migrations(&connection)?;
        drop(connection);
        Ok(warehouse)
    }

    /// Path to the database file, `None` for in-memory stores.
    pub fn db_path(&self) -> Option<&Path> {
        self.pool.db_path()
    }

    /// Replace the full price history of `symbol` with `rows` in one
    /// transaction, creating the company row when it does not exist yet.
    ///
    /// Rows are upserted by `(symbol, date)` and every previously stored
    /// row not rewritten by this run is deleted afterwards.
    pub fn replace_prices(
        &self,
        company_name: &str,
        symbol: &str,
        file_source: &str,
        run_id: &str,
        rows: &[PriceRecord],
    ) -> Result<ReplaceReport, WarehouseError> {
        let connection = self.pool.checkout()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<ReplaceReport, WarehouseError> {
            let company_id = ensure_company(&connection, company_name, symbol)?;
            let previous_rows = count_rows(&connection, symbol)?;

            for row in rows {
                if row.symbol != symbol {
                    return Err(WarehouseError::InvalidData(format!(
                        "row for '{}' passed while replacing '{symbol}'",
                        row.symbol
                    )));
                }
                let volume = i64::try_from(row.volume).map_err(|_| {
                    WarehouseError::InvalidData(format!("volume {} out of range", row.volume))
                })?;
                connection.execute(
                    "INSERT OR REPLACE INTO ohlc_data \
                     (symbol, date, open, high, low, close, volume, file_source, ingest_run, created_at) \
                     VALUES (?, CAST(? AS DATE), CAST(? AS DECIMAL(10,2)), CAST(? AS DECIMAL(10,2)), \
                     CAST(? AS DECIMAL(10,2)), CAST(? AS DECIMAL(10,2)), ?, ?, ?, CURRENT_TIMESTAMP)",
                    params![
                        row.symbol,
                        row.date,
                        row.open,
                        row.high,
                        row.low,
                        row.close,
                        volume,
                        file_source,
                        run_id,
                    ],
                )?;
            }

            let removed_rows = connection.execute(
                "DELETE FROM ohlc_data WHERE symbol = ? AND ingest_run <> ?",
                params![symbol, run_id],
            )?;

            connection.execute(
                "INSERT INTO ingest_log (run_id, symbol, file_source, status, row_count, timestamp) \
                 VALUES (?, ?, ?, 'replaced', ?, CURRENT_TIMESTAMP)",
                params![run_id, symbol, file_source, rows.len() as i64],
            )?;

            Ok(ReplaceReport {
                symbol: symbol.to_owned(),
                company_id,
                run_id: run_id.to_owned(),
                previous_rows,
                written_rows: rows.len() as u64,
                removed_rows: removed_rows as u64,
            })
        })();

        let report = finalize_transaction(&connection, result)?;
        info!(
            symbol = %report.symbol,
            previous = report.previous_rows,
            written = report.written_rows,
            removed = report.removed_rows,
            "replaced price history"
        );
        Ok(report)
    }

    /// Daily rows for `symbol` with `start <= date <= end`, oldest first.
    pub fn daily_prices(
        &self,
        symbol: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<PriceRecord>, WarehouseError> {
        let connection = self.pool.checkout()?;
        let mut statement = connection.prepare(
            "SELECT symbol, strftime(date, '%Y-%m-%d'), CAST(open AS DOUBLE), CAST(high AS DOUBLE), \
             CAST(low AS DOUBLE), CAST(close AS DOUBLE), volume \
             FROM ohlc_data \
             WHERE symbol = ? AND date BETWEEN CAST(? AS DATE) AND CAST(? AS DATE) \
             ORDER BY date ASC",
        )?;
        let rows = statement
            .query_map(params![symbol, start, end], read_price)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(symbol, start, end, rows = rows.len(), "fetched daily prices");
        Ok(rows)
    }

    /// Newest-first listing of stored rows, optionally for one symbol.
    pub fn recent_prices(
        &self,
        symbol: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<StoredPrice>, WarehouseError> {
        let connection = self.pool.checkout()?;
        let columns = "SELECT symbol, strftime(date, '%Y-%m-%d'), CAST(open AS DOUBLE), \
             CAST(high AS DOUBLE), CAST(low AS DOUBLE), CAST(close AS DOUBLE), volume, file_source \
             FROM ohlc_data";
        let limit = limit as i64;
        let offset = offset as i64;

        let read = |row: &Row<'_>| -> Result<StoredPrice, ::duckdb::Error> {
            Ok(StoredPrice {
                price: read_price(row)?,
                file_source: row.get(7)?,
            })
        };

        let rows = match symbol {
            Some(symbol) => {
                let sql = format!(
                    "{columns} WHERE symbol = ? ORDER BY date DESC, symbol LIMIT ? OFFSET ?"
                );
                let mut statement = connection.prepare(sql.as_str())?;
                let rows = statement
                    .query_map(params![symbol, limit, offset], read)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let sql = format!("{columns} ORDER BY date DESC, symbol LIMIT ? OFFSET ?");
                let mut statement = connection.prepare(sql.as_str())?;
                let rows = statement
                    .query_map(params![limit, offset], read)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(rows)
    }

    /// All companies ordered by symbol.
    pub fn companies(&self) -> Result<Vec<CompanyRecord>, WarehouseError> {
        let connection = self.pool.checkout()?;
        let mut statement =
            connection.prepare("SELECT id, name, symbol FROM companies ORDER BY symbol")?;
        let rows = statement
            .query_map([], read_company)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn company_by_id(&self, id: i64) -> Result<Option<CompanyRecord>, WarehouseError> {
        let connection = self.pool.checkout()?;
        let mut statement =
            connection.prepare("SELECT id, name, symbol FROM companies WHERE id = ?")?;
        let mut rows = statement.query_map(params![id], read_company)?;
        let found = rows.next().transpose()?;
        Ok(found)
    }

    pub fn company_by_symbol(&self, symbol: &str) -> Result<Option<CompanyRecord>, WarehouseError> {
        let connection = self.pool.checkout()?;
        let mut statement =
            connection.prepare("SELECT id, name, symbol FROM companies WHERE symbol = ?")?;
        let mut rows = statement.query_map(params![symbol], read_company)?;
        let found = rows.next().transpose()?;
        Ok(found)
    }

    /// Create a company (named after its symbol) for every stored symbol
    /// that has none. Returns how many were created.
    pub fn sync_companies(&self) -> Result<usize, WarehouseError> {
        let connection = self.pool.checkout()?;
        let mut statement = connection.prepare(
            "SELECT DISTINCT d.symbol FROM ohlc_data d \
             LEFT JOIN companies c ON c.symbol = d.symbol \
             WHERE c.id IS NULL ORDER BY d.symbol",
        )?;
        let missing = statement
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        for symbol in &missing {
            ensure_company(&connection, symbol, symbol)?;
        }
        if !missing.is_empty() {
            info!(created = missing.len(), "created companies for orphan symbols");
        }
        Ok(missing.len())
    }

    /// Earliest and latest stored trading dates, `None` when empty.
    pub fn date_bounds(&self) -> Result<Option<DateBounds>, WarehouseError> {
        let connection = self.pool.checkout()?;
        query_bounds(&connection)
    }

    pub fn summary(&self) -> Result<WarehouseSummary, WarehouseError> {
        let connection = self.pool.checkout()?;
        let total_rows: i64 =
            connection.query_row("SELECT COUNT(*) FROM ohlc_data", [], |row| row.get(0))?;
        let companies: i64 =
            connection.query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))?;

        let mut statement = connection.prepare(
            "SELECT symbol, COUNT(*) FROM ohlc_data GROUP BY symbol ORDER BY symbol",
        )?;
        let per_symbol = statement
            .query_map([], |row| {
                let rows: i64 = row.get(1)?;
                Ok(SymbolCount {
                    symbol: row.get(0)?,
                    rows: rows.max(0) as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WarehouseSummary {
            total_rows: total_rows.max(0) as u64,
            companies: companies.max(0) as u64,
            per_symbol,
            bounds: query_bounds(&connection)?,
        })
    }
}

/// Commit on success, roll back on failure.
fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, WarehouseError>,
) -> Result<T, WarehouseError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}

fn ensure_company(
    connection: &Connection,
    name: &str,
    symbol: &str,
) -> Result<i64, WarehouseError> {
    let existing = {
        let mut statement = connection.prepare("SELECT id FROM companies WHERE symbol = ?")?;
        let mut rows = statement.query_map(params![symbol], |row| row.get::<_, i64>(0))?;
        let found = rows.next().transpose()?;
        found
    };
    if let Some(id) = existing {
        return Ok(id);
    }

    let id: i64 = connection.query_row(
        "INSERT INTO companies (name, symbol) VALUES (?, ?) RETURNING id",
        params![name, symbol],
        |row| row.get(0),
    )?;
    debug!(id, name, symbol, "created company");
    Ok(id)
}

fn count_rows(connection: &Connection, symbol: &str) -> Result<u64, WarehouseError> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM ohlc_data WHERE symbol = ?",
        params![symbol],
        |row| row.get(0),
    )?;
    Ok(count.max(0) as u64)
}

fn query_bounds(connection: &Connection) -> Result<Option<DateBounds>, WarehouseError> {
    let (earliest, latest): (Option<String>, Option<String>) = connection.query_row(
        "SELECT strftime(MIN(date), '%Y-%m-%d'), strftime(MAX(date), '%Y-%m-%d') FROM ohlc_data",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(earliest
        .zip(latest)
        .map(|(earliest, latest)| DateBounds { earliest, latest }))
}

fn read_price(row: &Row<'_>) -> Result<PriceRecord, ::duckdb::Error> {
    let volume: i64 = row.get(6)?;
    Ok(PriceRecord {
        symbol: row.get(0)?,
        date: row.get(1)?,
        open: row.get(2)?,
        high: row.get(3)?,
        low: row.get(4)?,
        close: row.get(5)?,
        volume: volume.max(0) as u64,
    })
}

fn read_company(row: &Row<'_>) -> Result<CompanyRecord, ::duckdb::Error> {
    Ok(CompanyRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        symbol: row.get(2)?,
    })
}

/// Resolve the ohlcview home directory from environment or default.
fn resolve_ohlcview_home() -> PathBuf {
    if let Some(path) = env::var_os("OHLCVIEW_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".ohlcview");
    }

    PathBuf::from(".ohlcview")
}
