//! [`BarStore`] over the DuckDB warehouse.

use ohlcview_warehouse::{CompanyRecord, PriceRecord, Warehouse};
use time::Date;

use crate::chart::{BarStore, CompanyLookup};
use crate::domain::{format_date, parse_iso_date, Company, DailyBar, Price, Symbol};
use crate::CoreError;

impl BarStore for Warehouse {
    type Error = CoreError;

    fn find_company(&self, lookup: &CompanyLookup) -> Result<Option<Company>, CoreError> {
        let record = match lookup {
            CompanyLookup::Id(id) => self.company_by_id(*id)?,
            CompanyLookup::Symbol(symbol) => self.company_by_symbol(symbol.as_str())?,
        };
        record.map(company_from_record).transpose()
    }

    fn daily_bars(
        &self,
        symbol: &Symbol,
        start: Date,
        end: Date,
    ) -> Result<Vec<DailyBar>, CoreError> {
        self.daily_prices(symbol.as_str(), &format_date(start), &format_date(end))?
            .iter()
            .map(bar_from_record)
            .collect()
    }
}

pub fn company_from_record(record: CompanyRecord) -> Result<Company, CoreError> {
    Ok(Company {
        id: record.id,
        symbol: Symbol::parse(&record.symbol)?,
        name: record.name,
    })
}

/// Stored rows are taken as they are; price consistency is only enforced
/// on the way in.
pub fn bar_from_record(record: &PriceRecord) -> Result<DailyBar, CoreError> {
    Ok(DailyBar::unchecked(
        Symbol::parse(&record.symbol)?,
        parse_iso_date(&record.date)?,
        Price::from_f64(record.open)?,
        Price::from_f64(record.high)?,
        Price::from_f64(record.low)?,
        Price::from_f64(record.close)?,
        record.volume,
    ))
}

pub fn record_from_bar(bar: &DailyBar) -> PriceRecord {
    PriceRecord {
        symbol: bar.symbol.to_string(),
        date: format_date(bar.date),
        open: bar.open.as_f64(),
        high: bar.high.as_f64(),
        low: bar.low.as_f64(),
        close: bar.close.as_f64(),
        volume: bar.volume,
    }
}
