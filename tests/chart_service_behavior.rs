//! Behavior-driven tests for chart queries
//!
//! These tests drive the chart service the way the web API does: a JSON
//! request in, parallel arrays or a categorised error out.

use ohlcview_core::{
    ChartError, ChartRequest, ChartService, CompanyRef, Granularity, PriceRecord, Warehouse,
};

fn loaded_warehouse() -> Warehouse {
    let warehouse = Warehouse::open_in_memory().expect("warehouse");
    let rows: Vec<PriceRecord> = [
        ("2024-01-02", 10.0, 12.0, 9.0, 11.0, 100),
        ("2024-01-03", 11.0, 13.0, 10.0, 12.0, 200),
        ("2024-02-01", 12.0, 12.5, 11.5, 11.75, 50),
        ("2024-03-05", 5.0, 5.25, 4.75, 5.25, 3),
        ("2024-03-07", 5.25, 5.5, 5.0, 5.5, 7),
    ]
    .into_iter()
    .map(|(date, open, high, low, close, volume)| PriceRecord {
        symbol: String::from("AAA"),
        date: date.to_string(),
        open,
        high,
        low,
        close,
        volume,
    })
    .collect();
    warehouse
        .replace_prices("aaa", "AAA", "aaa.csv", "run-1", &rows)
        .expect("load");
    warehouse
}

fn ticker() -> CompanyRef {
    CompanyRef::Text(String::from("AAA"))
}

fn request(json: &str) -> ChartRequest {
    serde_json::from_str(json).expect("request json")
}

// =============================================================================
// Chart: Successful queries
// =============================================================================

#[test]
fn when_user_charts_monthly_they_get_one_point_per_month() {
    // Given: A store with January through March data
    let service = ChartService::new(loaded_warehouse());
    let company_id = service.store().companies().expect("companies")[0].id;

    // When: The user asks for a monthly chart of Q1
    let response = service
        .chart(&request(&format!(
            r#"{{"company_id": {company_id}, "start_date": "2024-01-01",
                "end_date": "2024-03-31", "aggregation": "monthly"}}"#
        )))
        .expect("chart");

    // Then: Three points anchored on the first of each month
    assert_eq!(response.aggregation, Granularity::Monthly);
    assert_eq!(response.company_name, "aaa");
    assert_eq!(response.data_points, 3);
    let series = &response.chart_data;
    assert_eq!(series.dates, vec!["2024-01-01", "2024-02-01", "2024-03-01"]);
    assert_eq!(series.opens, vec![10.0, 12.0, 5.0]);
    assert_eq!(series.highs, vec![13.0, 12.5, 5.5]);
    assert_eq!(series.lows, vec![9.0, 11.5, 4.75]);
    assert_eq!(series.closes, vec![12.0, 11.75, 5.5]);
    assert_eq!(series.volumes, vec![300, 50, 10]);
}

#[test]
fn when_user_names_the_company_by_ticker_the_chart_still_resolves() {
    let service = ChartService::new(loaded_warehouse());
    let response = service
        .chart(
            &ChartRequest::new(CompanyRef::Text(String::from("aaa")), "2024-03-01", "2024-03-31")
                .with_aggregation("weekly"),
        )
        .expect("chart");

    assert_eq!(response.chart_data.dates, vec!["2024-03-04"]);
    assert_eq!(response.chart_data.volumes, vec![10]);
}

#[test]
fn chart_response_serializes_as_parallel_arrays() {
    let service = ChartService::new(loaded_warehouse());
    let response = service
        .chart(&ChartRequest::new(ticker(), "2024-01-02", "2024-01-02"))
        .expect("chart");

    let json = serde_json::to_value(&response).expect("json");
    assert_eq!(json["chart_data"]["dates"][0], "2024-01-02");
    assert_eq!(json["chart_data"]["closes"][0], 11.0);
    assert_eq!(json["data_points"], 1);
    assert_eq!(json["aggregation"], "daily");
}

// =============================================================================
// Chart: Error categories
// =============================================================================

#[test]
fn when_parameters_are_missing_the_error_is_a_bad_request() {
    let service = ChartService::new(loaded_warehouse());
    let error = service
        .chart(&request(r#"{"company_id": 1, "start_date": "2024-01-01"}"#))
        .expect_err("must fail");
    assert!(matches!(error, ChartError::MissingParameters));
    assert_eq!(error.status_code(), 400);
    assert_eq!(error.to_string(), "Missing required parameters");
}

#[test]
fn when_company_is_unknown_or_range_is_empty_the_error_is_not_found() {
    let service = ChartService::new(loaded_warehouse());

    let error = service
        .chart(&ChartRequest::new(CompanyRef::Id(9_999), "2024-01-01", "2024-01-31"))
        .expect_err("unknown company");
    assert_eq!(error.to_string(), "Company not found");
    assert_eq!(error.status_code(), 404);

    let error = service
        .chart(&ChartRequest::new(ticker(), "2020-01-01", "2020-12-31"))
        .expect_err("empty range");
    assert_eq!(error.to_string(), "No data found for the selected range");
    assert_eq!(error.status_code(), 404);
}

#[test]
fn when_dates_or_aggregation_are_malformed_the_error_is_a_bad_request() {
    let service = ChartService::new(loaded_warehouse());

    for body in [
        r#"{"company_id": 1, "start_date": "01/01/2024", "end_date": "2024-01-31"}"#,
        r#"{"company_id": 1, "start_date": "2024-01-01", "end_date": "2024-01-31", "aggregation": "yearly"}"#,
        r#"{"company_id": 1, "start_date": "2024-02-01", "end_date": "2024-01-01"}"#,
    ] {
        let error = service.chart(&request(body)).expect_err(body);
        assert_eq!(error.status_code(), 400, "{body}");
        assert!(error.is_client_error());
    }
}
