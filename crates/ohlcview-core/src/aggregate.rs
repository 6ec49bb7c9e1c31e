//! Daily-to-period OHLC aggregation.
//!
//! Bars are grouped by [`Granularity::period_start`]. Inside a group the
//! earliest bar supplies `open`, the latest supplies `close`, `high` and
//! `low` are the extremes and `volume` is the sum. Output is ordered by
//! anchor with one bar per non-empty period; periods without trading days
//! are skipped, not zero-filled.

use thiserror::Error;
use time::Date;

use crate::domain::{AggregatedBar, DailyBar, Granularity, Symbol};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("invalid granularity '{value}', expected one of daily, weekly, monthly")]
    InvalidGranularity { value: String },

    #[error("more than one bar for {date}")]
    DuplicateDate { date: Date },

    #[error("bars for {found} mixed into series for {expected}")]
    MixedInstruments { expected: Symbol, found: Symbol },
}

/// Summarise `bars` (one instrument, any order) into one bar per period.
///
/// Empty input yields empty output. Input is left untouched.
pub fn aggregate(
    bars: &[DailyBar],
    granularity: Granularity,
) -> Result<Vec<AggregatedBar>, AggregateError> {
    let Some(first) = bars.first() else {
        return Ok(Vec::new());
    };

    if let Some(other) = bars.iter().find(|bar| bar.symbol != first.symbol) {
        return Err(AggregateError::MixedInstruments {
            expected: first.symbol.clone(),
            found: other.symbol.clone(),
        });
    }

    let mut ordered: Vec<&DailyBar> = bars.iter().collect();
    ordered.sort_by_key(|bar| bar.date);

    if let Some(pair) = ordered.windows(2).find(|pair| pair[0].date == pair[1].date) {
        return Err(AggregateError::DuplicateDate { date: pair[0].date });
    }

    let mut periods: Vec<AggregatedBar> = Vec::new();
    for bar in ordered {
        let anchor = granularity.period_start(bar.date);
        match periods.last_mut() {
            Some(period) if period.anchor == anchor => period.absorb(bar),
            _ => periods.push(AggregatedBar::open_period(anchor, bar)),
        }
    }

    Ok(periods)
}

/// [`aggregate`] with the granularity given by name.
pub fn aggregate_named(
    bars: &[DailyBar],
    granularity: &str,
) -> Result<Vec<AggregatedBar>, AggregateError> {
    let granularity = granularity
        .parse::<Granularity>()
        .map_err(|_| AggregateError::InvalidGranularity {
            value: granularity.to_owned(),
        })?;
    aggregate(bars, granularity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Price;
    use time::macros::date;

    fn bar(symbol: &str, date: Date, ohlc: [i64; 4], volume: u64) -> DailyBar {
        let [open, high, low, close] = ohlc.map(|cents| Price::from_cents(cents).expect("price"));
        DailyBar::unchecked(
            Symbol::parse(symbol).expect("symbol"),
            date,
            open,
            high,
            low,
            close,
            volume,
        )
    }

    #[test]
    fn empty_input_gives_empty_output() {
        for granularity in Granularity::ALL {
            assert_eq!(aggregate(&[], granularity), Ok(Vec::new()));
        }
    }

    #[test]
    fn daily_is_identity_in_date_order() {
        let bars = vec![
            bar("AAA", date!(2024 - 01 - 03), [1100, 1300, 1000, 1200], 200),
            bar("AAA", date!(2024 - 01 - 02), [1000, 1200, 900, 1100], 100),
        ];

        let daily = aggregate(&bars, Granularity::Daily).expect("daily");
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].anchor, date!(2024 - 01 - 02));
        assert_eq!(daily[0].close.cents(), 1100);
        assert_eq!(daily[1].anchor, date!(2024 - 01 - 03));
        assert_eq!(daily[1].volume, 200);
    }

    #[test]
    fn monthly_groups_by_calendar_month() {
        let bars = vec![
            bar("AAA", date!(2024 - 01 - 02), [1000, 1200, 900, 1100], 100),
            bar("AAA", date!(2024 - 01 - 03), [1100, 1300, 1000, 1200], 200),
            bar("AAA", date!(2024 - 02 - 01), [1200, 1250, 1150, 1180], 50),
        ];

        let monthly = aggregate(&bars, Granularity::Monthly).expect("monthly");
        assert_eq!(monthly.len(), 2);

        let january = monthly[0];
        assert_eq!(january.anchor, date!(2024 - 01 - 01));
        assert_eq!(
            [january.open, january.high, january.low, january.close].map(Price::cents),
            [1000, 1300, 900, 1200]
        );
        assert_eq!(january.volume, 300);

        let february = monthly[1];
        assert_eq!(february.anchor, date!(2024 - 02 - 01));
        assert_eq!(
            [february.open, february.high, february.low, february.close].map(Price::cents),
            [1200, 1250, 1150, 1180]
        );
        assert_eq!(february.volume, 50);
    }

    #[test]
    fn weekly_anchor_is_monday_even_without_monday_trading() {
        let bars = vec![
            bar("AAA", date!(2024 - 03 - 07), [520, 560, 510, 550], 7),
            bar("AAA", date!(2024 - 03 - 05), [500, 530, 480, 515], 3),
        ];

        let weekly = aggregate(&bars, Granularity::Weekly).expect("weekly");
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].anchor, date!(2024 - 03 - 04));
        assert_eq!(weekly[0].open.cents(), 500);
        assert_eq!(weekly[0].close.cents(), 550);
        assert_eq!(weekly[0].high.cents(), 560);
        assert_eq!(weekly[0].low.cents(), 480);
        assert_eq!(weekly[0].volume, 10);
    }

    #[test]
    fn gaps_are_skipped_not_filled() {
        let bars = vec![
            bar("AAA", date!(2024 - 01 - 10), [100, 100, 100, 100], 1),
            bar("AAA", date!(2024 - 04 - 10), [100, 100, 100, 100], 1),
        ];
        let monthly = aggregate(&bars, Granularity::Monthly).expect("monthly");
        let anchors: Vec<Date> = monthly.iter().map(|bar| bar.anchor).collect();
        assert_eq!(anchors, vec![date!(2024 - 01 - 01), date!(2024 - 04 - 01)]);
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let bars = vec![
            bar("AAA", date!(2024 - 01 - 02), [100, 100, 100, 100], 1),
            bar("AAA", date!(2024 - 01 - 03), [100, 100, 100, 100], 1),
            bar("AAA", date!(2024 - 01 - 02), [200, 200, 200, 200], 1),
        ];
        assert_eq!(
            aggregate(&bars, Granularity::Daily),
            Err(AggregateError::DuplicateDate {
                date: date!(2024 - 01 - 02)
            })
        );
    }

    #[test]
    fn mixed_instruments_are_rejected() {
        let bars = vec![
            bar("AAA", date!(2024 - 01 - 02), [100, 100, 100, 100], 1),
            bar("BBB", date!(2024 - 01 - 03), [100, 100, 100, 100], 1),
        ];
        let error = aggregate(&bars, Granularity::Weekly).expect_err("must reject");
        assert!(matches!(error, AggregateError::MixedInstruments { .. }));
    }

    #[test]
    fn malformed_bars_pass_through() {
        let bars = vec![bar("AAA", date!(2024 - 01 - 02), [500, 100, 900, 50], 1)];
        let daily = aggregate(&bars, Granularity::Daily).expect("daily");
        assert_eq!(daily[0].high.cents(), 100);
        assert_eq!(daily[0].low.cents(), 900);
    }

    #[test]
    fn unknown_granularity_name_is_rejected() {
        let bars = vec![bar("AAA", date!(2024 - 01 - 02), [100, 100, 100, 100], 1)];
        assert_eq!(
            aggregate_named(&bars, "yearly"),
            Err(AggregateError::InvalidGranularity {
                value: String::from("yearly")
            })
        );
        assert_eq!(aggregate_named(&bars, "weekly").expect("weekly").len(), 1);
    }
}
