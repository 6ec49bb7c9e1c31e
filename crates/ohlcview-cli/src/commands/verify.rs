use std::collections::HashSet;

use ohlcview_core::Warehouse;
use serde_json::{json, Value};

use crate::error::CliError;

pub fn run(warehouse: &Warehouse) -> Result<Value, CliError> {
    let summary = warehouse.summary()?;
    let known: HashSet<String> = warehouse
        .companies()?
        .into_iter()
        .map(|company| company.symbol)
        .collect();
    let without_company: Vec<&str> = summary
        .per_symbol
        .iter()
        .map(|count| count.symbol.as_str())
        .filter(|symbol| !known.contains(*symbol))
        .collect();

    Ok(json!({
        "db_path": warehouse.db_path().map(|path| path.display().to_string()),
        "empty": summary.total_rows == 0,
        "symbols_without_company": without_company,
        "summary": summary,
    }))
}
