use std::fmt::{Display, Formatter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 10;

/// Ticker identifying one instrument, always upper-case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a ticker to upper-case.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        let Some(first) = normalized.chars().next() else {
            return Err(ValidationError::EmptySymbol);
        };

        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        if !first.is_ascii_alphabetic() {
            return Err(ValidationError::SymbolInvalidStart { ch: first });
        }

        if let Some((index, ch)) = normalized
            .chars()
            .enumerate()
            .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '.' || *ch == '-'))
        {
            return Err(ValidationError::SymbolInvalidChar { ch, index });
        }

        Ok(Self(normalized))
    }

    /// Derive the ticker from a price file name: `aapl.csv` becomes `AAPL`.
    pub fn from_file_stem(path: &Path) -> Result<Self, ValidationError> {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        Self::parse(stem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_cases_and_trims() {
        let parsed = Symbol::parse(" msft ").expect("symbol should parse");
        assert_eq!(parsed.as_str(), "MSFT");
    }

    #[test]
    fn derives_symbol_from_csv_file_name() {
        let parsed = Symbol::from_file_stem(Path::new("/data/StocksData/brk.b.csv")).expect("stem");
        assert_eq!(parsed.as_str(), "BRK.B");
    }

    #[test]
    fn rejects_leading_digit_and_punctuation() {
        let err = Symbol::parse("1ABC").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolInvalidStart { ch: '1' }));

        let err = Symbol::parse("AB'C").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolInvalidChar { index: 2, .. }));
    }

    #[test]
    fn rejects_overlong_tickers() {
        let err = Symbol::parse("ABCDEFGHIJK").expect_err("must fail");
        assert_eq!(err, ValidationError::SymbolTooLong { len: 11, max: 10 });
    }
}
