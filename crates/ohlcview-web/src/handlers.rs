use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ohlcview_core::{format_date, ChartRequest, ChartResponse, CompanyRecord};
use serde::Serialize;
use serde_json::{json, Value};
use time::{Duration, OffsetDateTime};
use tokio::task;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::AppState;

/// Date picker default span when the store is empty.
const EMPTY_STORE_LOOKBACK_DAYS: i64 = 3650;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompaniesResponse {
    pub companies: Vec<CompanyRecord>,
    pub earliest_date: String,
    pub latest_date: String,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Every stored instrument plus the date range the picker should offer.
pub async fn companies(State(state): State<AppState>) -> Result<Json<CompaniesResponse>, ApiError> {
    let warehouse = state.charts.store().clone();
    let response = task::spawn_blocking(move || -> Result<CompaniesResponse, ApiError> {
        warehouse.sync_companies()?;
        let companies = warehouse.companies()?;
        let today = OffsetDateTime::now_utc().date();
        let (earliest_date, latest_date) = match warehouse.date_bounds()? {
            Some(bounds) => (bounds.earliest, bounds.latest),
            None => (
                format_date(today - Duration::days(EMPTY_STORE_LOOKBACK_DAYS)),
                format_date(today),
            ),
        };
        Ok(CompaniesResponse {
            companies,
            earliest_date,
            latest_date,
        })
    })
    .await??;

    debug!(companies = response.companies.len(), "listed companies");
    Ok(Json(response))
}

/// Aggregated chart series for one company and date range.
pub async fn chart_data(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChartResponse>, ApiError> {
    let request: ChartRequest =
        serde_json::from_slice(&body).map_err(|_| ApiError::invalid_json())?;

    let charts = state.charts.clone();
    let response = task::spawn_blocking(move || charts.chart(&request)).await??;

    info!(
        company = %response.symbol,
        aggregation = %response.aggregation,
        points = response.data_points,
        "served chart data"
    );
    Ok(Json(response))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

/// The timeout layer answers 408 with an empty body; give it the usual
/// error shape.
pub async fn timeout_body(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        ApiError::request_timeout().into_response()
    } else {
        response
    }
}
