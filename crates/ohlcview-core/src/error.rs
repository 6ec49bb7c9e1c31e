use thiserror::Error;

/// Validation errors for domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid granularity '{value}', expected one of daily, weekly, monthly")]
    InvalidGranularity { value: String },

    #[error("invalid date '{value}', expected YYYY-MM-DD or MM/DD/YYYY")]
    InvalidDate { value: String },

    #[error("invalid price '{value}'")]
    InvalidPrice { value: String },
    #[error("price '{value}' exceeds the storable range")]
    PriceOutOfRange { value: String },
    #[error("invalid volume '{value}'")]
    InvalidVolume { value: String },
    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("bar high must be >= low")]
    InvalidBarRange,
    #[error("bar open/close must be within high/low range")]
    InvalidBarBounds,
}

/// Errors raised while reading domain values out of the warehouse.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Warehouse(#[from] ohlcview_warehouse::WarehouseError),
}
