use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use crate::ValidationError;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const US_DATE: &[BorrowedFormatItem<'static>] = format_description!("[month]/[day]/[year]");
const US_DATE_UNPADDED: &[BorrowedFormatItem<'static>] =
    format_description!("[month padding:none]/[day padding:none]/[year]");

/// Parse an API date, which must be `YYYY-MM-DD`.
pub fn parse_iso_date(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input.trim(), ISO_DATE).map_err(|_| ValidationError::InvalidDate {
        value: input.to_owned(),
    })
}

/// Parse a date cell from a price file: `YYYY-MM-DD` or `MM/DD/YYYY`.
pub fn parse_trading_date(input: &str) -> Result<Date, ValidationError> {
    let trimmed = input.trim();
    [ISO_DATE, US_DATE, US_DATE_UNPADDED]
        .into_iter()
        .find_map(|format| Date::parse(trimmed, format).ok())
        .ok_or_else(|| ValidationError::InvalidDate {
            value: input.to_owned(),
        })
}

/// Render `date` as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}
