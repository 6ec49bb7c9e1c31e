use ohlcview_core::Warehouse;
use serde_json::{json, Value};

use crate::error::CliError;

pub fn run(warehouse: &Warehouse) -> Result<Value, CliError> {
    warehouse.sync_companies()?;
    let companies = warehouse.companies()?;
    let bounds = warehouse.date_bounds()?;

    Ok(json!({
        "companies": companies,
        "earliest_date": bounds.as_ref().map(|bounds| bounds.earliest.as_str()),
        "latest_date": bounds.as_ref().map(|bounds| bounds.latest.as_str()),
    }))
}
