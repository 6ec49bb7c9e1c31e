use ohlcview_core::{Symbol, Warehouse};
use serde_json::{json, Value};

use crate::cli::PricesArgs;
use crate::error::CliError;

pub fn run(args: &PricesArgs, warehouse: &Warehouse) -> Result<Value, CliError> {
    if args.limit == 0 {
        return Err(CliError::InvalidArgument(String::from(
            "--limit must be greater than zero",
        )));
    }

    let symbol = args.symbol.as_deref().map(Symbol::parse).transpose()?;
    let rows = warehouse.recent_prices(
        symbol.as_ref().map(Symbol::as_str),
        args.limit,
        args.offset,
    )?;

    Ok(json!({
        "symbol": symbol,
        "limit": args.limit,
        "offset": args.offset,
        "rows": rows,
    }))
}
