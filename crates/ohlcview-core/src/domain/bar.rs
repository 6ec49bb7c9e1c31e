use serde::Serialize;
use time::Date;

use crate::domain::{Price, Symbol};
use crate::ValidationError;

/// One trading day of one instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyBar {
    pub symbol: Symbol,
    pub date: Date,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: u64,
}

impl DailyBar {
    /// Build a bar, requiring `low <= open, close <= high`.
    pub fn new(
        symbol: Symbol,
        date: Date,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidBarBounds);
        }

        Ok(Self::unchecked(symbol, date, open, high, low, close, volume))
    }

    /// Build a bar without checking price consistency. Used for rows that
    /// already sit in the store, which are charted as they are.
    pub fn unchecked(
        symbol: Symbol,
        date: Date,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: u64,
    ) -> Self {
        Self {
            symbol,
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Summary of every daily bar inside one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AggregatedBar {
    /// First calendar day of the period, which need not be a trading day.
    #[serde(serialize_with = "serialize_date")]
    pub anchor: Date,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: u64,
}

impl AggregatedBar {
    /// Start a period at `anchor` from its earliest bar.
    pub fn open_period(anchor: Date, first: &DailyBar) -> Self {
        Self {
            anchor,
            open: first.open,
            high: first.high,
            low: first.low,
            close: first.close,
            volume: first.volume,
        }
    }

    /// Fold the next bar of the period in; bars must arrive in date order.
    pub fn absorb(&mut self, next: &DailyBar) {
        self.high = self.high.max(next.high);
        self.low = self.low.min(next.low);
        self.close = next.close;
        self.volume = self.volume.saturating_add(next.volume);
    }
}

fn serialize_date<S: serde::Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&crate::domain::format_date(*date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn price(text: &str) -> Price {
        Price::parse(text).expect("price")
    }

    fn bar(open: &str, high: &str, low: &str, close: &str) -> Result<DailyBar, ValidationError> {
        DailyBar::new(
            Symbol::parse("AAA").expect("symbol"),
            date!(2024 - 01 - 02),
            price(open),
            price(high),
            price(low),
            price(close),
            10,
        )
    }

    #[test]
    fn rejects_inverted_range() {
        assert_eq!(bar("10", "9", "11", "10"), Err(ValidationError::InvalidBarRange));
    }

    #[test]
    fn rejects_open_or_close_outside_range() {
        assert_eq!(bar("13", "12", "9", "11"), Err(ValidationError::InvalidBarBounds));
        assert_eq!(bar("10", "12", "9", "8"), Err(ValidationError::InvalidBarBounds));
    }

    #[test]
    fn absorb_tracks_extremes_last_close_and_total_volume() {
        let first = bar("10", "12", "9", "11").expect("first");
        let mut second = bar("11", "14", "10", "13").expect("second");
        second.date = date!(2024 - 01 - 03);
        second.volume = 15;

        let mut period = AggregatedBar::open_period(date!(2024 - 01 - 01), &first);
        period.absorb(&second);

        assert_eq!(period.open, price("10"));
        assert_eq!(period.high, price("14"));
        assert_eq!(period.low, price("9"));
        assert_eq!(period.close, price("13"));
        assert_eq!(period.volume, 25);
    }

    #[test]
    fn volume_saturates_instead_of_wrapping() {
        let mut first = bar("10", "12", "9", "11").expect("first");
        first.volume = u64::MAX - 1;
        let second = bar("10", "12", "9", "11").expect("second");

        let mut period = AggregatedBar::open_period(date!(2024 - 01 - 01), &first);
        period.absorb(&second);
        assert_eq!(period.volume, u64::MAX);
    }
}
