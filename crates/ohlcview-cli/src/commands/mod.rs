mod chart;
mod companies;
mod load;
mod prices;
mod serve;
mod verify;

use ohlcview_core::{Warehouse, WarehouseConfig};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let warehouse = open_warehouse(cli)?;

    match &cli.command {
        Command::Load(args) => load::run(args, &warehouse),
        Command::Companies => companies::run(&warehouse),
        Command::Chart(args) => chart::run(args, warehouse),
        Command::Prices(args) => prices::run(args, &warehouse),
        Command::Verify => verify::run(&warehouse),
        Command::Serve(args) => serve::run(args, warehouse).await,
    }
}

fn open_warehouse(cli: &Cli) -> Result<Warehouse, CliError> {
    let config = match &cli.db_path {
        Some(path) => WarehouseConfig::with_db_path(path),
        None => WarehouseConfig::default(),
    };
    debug!(db_path = %config.db_path.display(), "opening warehouse");
    Ok(Warehouse::open(config)?)
}
