//! Core contracts for ohlcview.
//!
//! This crate contains:
//! - Domain models and validation (tickers, prices, dates, bars)
//! - Daily-to-weekly/monthly OHLC aggregation
//! - Price file ingestion into the warehouse
//! - The chart query service used by the web API and the CLI

pub mod aggregate;
pub mod chart;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod store;

pub use aggregate::{aggregate, aggregate_named, AggregateError};
pub use chart::{
    BarStore, ChartError, ChartRequest, ChartResponse, ChartSeries, ChartService, CompanyLookup,
    CompanyRef,
};
pub use domain::{
    format_date, parse_iso_date, parse_trading_date, AggregatedBar, Company, DailyBar,
    Granularity, Price, Symbol,
};
pub use error::{CoreError, ValidationError};
pub use ingest::{
    ingest_directory, ingest_file, parse_price_csv, DirectoryReport, FileFailure, FileReport,
    IngestError, ParsedPrices, SkippedRow,
};
pub use ohlcview_warehouse::{
    CompanyRecord, DateBounds, PriceRecord, ReplaceReport, StoredPrice, Warehouse,
    WarehouseConfig, WarehouseError, WarehouseSummary,
};
