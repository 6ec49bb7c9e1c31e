use ohlcview_core::{ingest_directory, Warehouse};
use serde_json::Value;
use tracing::warn;

use crate::cli::LoadArgs;
use crate::error::CliError;

pub fn run(args: &LoadArgs, warehouse: &Warehouse) -> Result<Value, CliError> {
    let report = ingest_directory(warehouse, &args.dir)?;
    if report.files.is_empty() && report.failures.is_empty() {
        warn!(directory = %args.dir.display(), "no CSV files found");
    }
    Ok(serde_json::to_value(report)?)
}
