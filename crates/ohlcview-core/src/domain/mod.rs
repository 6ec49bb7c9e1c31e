//! # Domain Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated upper-case ticker |
//! | [`Price`] | Two-decimal amount held as whole cents |
//! | [`Granularity`] | Chart period length (daily, weekly, monthly) |
//! | [`DailyBar`] | One trading day of one instrument |
//! | [`AggregatedBar`] | One period summarised from daily bars |
//! | [`Company`] | A stored instrument with its numeric id |
//!
//! Dates are plain [`time::Date`] values; see [`parse_trading_date`] and
//! [`format_date`] for the accepted text layouts.

mod bar;
mod date;
mod granularity;
mod price;
mod symbol;

use serde::Serialize;

pub use bar::{AggregatedBar, DailyBar};
pub use date::{format_date, parse_iso_date, parse_trading_date};
pub use granularity::Granularity;
pub use price::Price;
pub use symbol::Symbol;

/// A stored instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub symbol: Symbol,
}
