//! Chart queries: resolve a company, load its daily bars for a date range,
//! aggregate them and lay the result out as parallel arrays for plotting.

use std::error::Error as StdError;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;
use tracing::debug;

use crate::aggregate::{aggregate, AggregateError};
use crate::domain::{
    format_date, parse_iso_date, AggregatedBar, Company, DailyBar, Granularity, Symbol,
};

/// How a caller names the company to chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyLookup {
    Id(i64),
    Symbol(Symbol),
}

/// Read access to stored companies and daily bars.
pub trait BarStore {
    type Error: StdError + Send + Sync + 'static;

    fn find_company(&self, lookup: &CompanyLookup) -> Result<Option<Company>, Self::Error>;

    /// Bars for `symbol` with `start <= date <= end`.
    fn daily_bars(
        &self,
        symbol: &Symbol,
        start: Date,
        end: Date,
    ) -> Result<Vec<DailyBar>, Self::Error>;
}

/// Aggregated bars as parallel arrays, index `i` of every array describing
/// the same period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub dates: Vec<String>,
    pub opens: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub closes: Vec<f64>,
    pub volumes: Vec<u64>,
}

impl ChartSeries {
    pub fn from_bars(bars: &[AggregatedBar]) -> Self {
        let mut series = Self {
            dates: Vec::with_capacity(bars.len()),
            opens: Vec::with_capacity(bars.len()),
            highs: Vec::with_capacity(bars.len()),
            lows: Vec::with_capacity(bars.len()),
            closes: Vec::with_capacity(bars.len()),
            volumes: Vec::with_capacity(bars.len()),
        };
        for bar in bars {
            series.dates.push(format_date(bar.anchor));
            series.opens.push(bar.open.as_f64());
            series.highs.push(bar.high.as_f64());
            series.lows.push(bar.low.as_f64());
            series.closes.push(bar.close.as_f64());
            series.volumes.push(bar.volume);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Write `Date,Open,High,Low,Close,Volume` rows, prices to two decimals.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(["Date", "Open", "High", "Low", "Close", "Volume"])?;
        for index in 0..self.len() {
            writer.write_record([
                self.dates[index].clone(),
                format!("{:.2}", self.opens[index]),
                format!("{:.2}", self.highs[index]),
                format!("{:.2}", self.lows[index]),
                format!("{:.2}", self.closes[index]),
                self.volumes[index].to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Company reference as sent by clients: a numeric id, a numeric string or
/// a ticker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CompanyRef {
    Id(i64),
    Text(String),
}

impl CompanyRef {
    /// `None` when the reference is blank.
    pub fn lookup(&self) -> Option<Result<CompanyLookup, ChartError>> {
        match self {
            Self::Id(id) => Some(Ok(CompanyLookup::Id(*id))),
            Self::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                if let Ok(id) = text.parse::<i64>() {
                    return Some(Ok(CompanyLookup::Id(id)));
                }
                Some(
                    Symbol::parse(text)
                        .map(CompanyLookup::Symbol)
                        .map_err(|_| ChartError::CompanyNotFound),
                )
            }
        }
    }
}

/// Body of a chart request. Every field is optional on the wire so that
/// missing values surface as [`ChartError::MissingParameters`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChartRequest {
    #[serde(default)]
    pub company_id: Option<CompanyRef>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub aggregation: Option<String>,
}

impl ChartRequest {
    pub fn new(company: CompanyRef, start_date: &str, end_date: &str) -> Self {
        Self {
            company_id: Some(company),
            start_date: Some(start_date.to_owned()),
            end_date: Some(end_date.to_owned()),
            aggregation: None,
        }
    }

    pub fn with_aggregation(mut self, aggregation: &str) -> Self {
        self.aggregation = Some(aggregation.to_owned());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartResponse {
    pub chart_data: ChartSeries,
    pub data_points: usize,
    pub company_name: String,
    pub symbol: Symbol,
    pub start_date: String,
    pub end_date: String,
    pub aggregation: Granularity,
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Missing required parameters")]
    MissingParameters,

    #[error("Invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Invalid aggregation '{value}', expected one of daily, weekly, monthly")]
    InvalidGranularity { value: String },

    #[error("start_date {start} is after end_date {end}")]
    InvertedRange { start: String, end: String },

    #[error("Company not found")]
    CompanyNotFound,

    #[error("No data found for the selected range")]
    NoData,

    #[error(transparent)]
    Aggregation(#[from] AggregateError),

    #[error("store error: {0}")]
    Store(#[source] Box<dyn StdError + Send + Sync>),
}

impl ChartError {
    /// HTTP status the error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingParameters
            | Self::InvalidDate { .. }
            | Self::InvalidGranularity { .. }
            | Self::InvertedRange { .. } => 400,
            Self::CompanyNotFound | Self::NoData => 404,
            Self::Aggregation(_) | Self::Store(_) => 500,
        }
    }

    /// Whether the caller, not the server, is at fault.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

/// Validated form of a [`ChartRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
struct ChartQuery {
    company: CompanyLookup,
    start: Date,
    end: Date,
    granularity: Granularity,
}

impl ChartQuery {
    fn from_request(request: &ChartRequest) -> Result<Self, ChartError> {
        let company = request.company_id.as_ref().and_then(CompanyRef::lookup);
        let start = non_blank(request.start_date.as_deref());
        let end = non_blank(request.end_date.as_deref());
        let (Some(company), Some(start), Some(end)) = (company, start, end) else {
            return Err(ChartError::MissingParameters);
        };

        let parse = |value: &str| {
            parse_iso_date(value).map_err(|_| ChartError::InvalidDate {
                value: value.to_owned(),
            })
        };
        let start = parse(start)?;
        let end = parse(end)?;

        let granularity = match non_blank(request.aggregation.as_deref()) {
            None => Granularity::default(),
            Some(name) => name
                .parse::<Granularity>()
                .map_err(|_| ChartError::InvalidGranularity {
                    value: name.to_owned(),
                })?,
        };

        if start > end {
            return Err(ChartError::InvertedRange {
                start: format_date(start),
                end: format_date(end),
            });
        }

        Ok(Self {
            company: company?,
            start,
            end,
            granularity,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Answers chart requests against a [`BarStore`].
#[derive(Debug, Clone)]
pub struct ChartService<S> {
    store: S,
}

impl<S: BarStore> ChartService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn chart(&self, request: &ChartRequest) -> Result<ChartResponse, ChartError> {
        let query = ChartQuery::from_request(request)?;

        let company = self
            .store
            .find_company(&query.company)
            .map_err(store_error)?
            .ok_or(ChartError::CompanyNotFound)?;

        let bars = self
            .store
            .daily_bars(&company.symbol, query.start, query.end)
            .map_err(store_error)?;
        if bars.is_empty() {
            return Err(ChartError::NoData);
        }

        let periods = aggregate(&bars, query.granularity)?;
        let chart_data = ChartSeries::from_bars(&periods);
        debug!(
            symbol = %company.symbol,
            granularity = %query.granularity,
            daily = bars.len(),
            points = chart_data.len(),
            "built chart series"
        );

        Ok(ChartResponse {
            data_points: chart_data.len(),
            chart_data,
            company_name: company.name,
            symbol: company.symbol,
            start_date: format_date(query.start),
            end_date: format_date(query.end),
            aggregation: query.granularity,
        })
    }
}

fn store_error<E: StdError + Send + Sync + 'static>(error: E) -> ChartError {
    ChartError::Store(Box::new(error))
}
