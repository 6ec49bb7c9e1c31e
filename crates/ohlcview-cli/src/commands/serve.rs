use std::time::Duration;

use ohlcview_core::Warehouse;
use ohlcview_web::ServerConfig;
use serde_json::{json, Value};

use crate::cli::ServeArgs;
use crate::error::CliError;

pub async fn run(args: &ServeArgs, warehouse: Warehouse) -> Result<Value, CliError> {
    let config = ServerConfig {
        bind: args.bind,
        request_timeout: Duration::from_millis(args.request_timeout_ms),
    };
    ohlcview_web::serve(warehouse, config).await?;
    Ok(json!({ "status": "stopped", "bind": args.bind.to_string() }))
}
