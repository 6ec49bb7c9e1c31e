use std::fs::File;
use std::io::BufWriter;

use ohlcview_core::{
    parse_iso_date, ChartRequest, ChartService, CompanyRef, Granularity, Warehouse,
};
use serde_json::Value;
use tracing::info;

use crate::cli::{AggregationChoice, ChartArgs};
use crate::error::CliError;

pub fn run(args: &ChartArgs, warehouse: Warehouse) -> Result<Value, CliError> {
    let granularity = match args.aggregation {
        AggregationChoice::Daily => Granularity::Daily,
        AggregationChoice::Weekly => Granularity::Weekly,
        AggregationChoice::Monthly => Granularity::Monthly,
        AggregationChoice::Auto => {
            Granularity::for_range(parse_iso_date(&args.start)?, parse_iso_date(&args.end)?)
        }
    };

    let request = ChartRequest::new(CompanyRef::Text(args.company.clone()), &args.start, &args.end)
        .with_aggregation(granularity.as_str());
    let response = ChartService::new(warehouse).chart(&request)?;

    if let Some(path) = &args.csv {
        response
            .chart_data
            .write_csv(BufWriter::new(File::create(path)?))?;
        info!(path = %path.display(), points = response.data_points, "wrote chart csv");
    }

    Ok(serde_json::to_value(response)?)
}
