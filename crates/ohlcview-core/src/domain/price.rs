use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::ValidationError;

/// Largest price a `DECIMAL(10,2)` column can hold, in cents.
const MAX_CENTS: i64 = 9_999_999_999;

/// Non-negative monetary amount with two decimal places, stored as whole
/// cents so comparisons and maxima are exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Self = Self(0);

    pub fn from_cents(cents: i64) -> Result<Self, ValidationError> {
        if cents < 0 {
            return Err(ValidationError::NegativeValue { field: "price" });
        }
        if cents > MAX_CENTS {
            return Err(ValidationError::PriceOutOfRange {
                value: cents.to_string(),
            });
        }
        Ok(Self(cents))
    }

    /// Round a float to the nearest cent.
    pub fn from_f64(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "price" });
        }
        if value < 0.0 {
            return Err(ValidationError::NegativeValue { field: "price" });
        }
        let cents = (value * 100.0).round();
        if cents > MAX_CENTS as f64 {
            return Err(ValidationError::PriceOutOfRange {
                value: value.to_string(),
            });
        }
        Ok(Self(cents as i64))
    }

    /// Parse text such as `182.01`, `$182.01` or `$ 7`. Extra fraction
    /// digits round half away from zero to the cent.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidPrice {
            value: input.to_owned(),
        };

        let trimmed = input.trim();
        if trimmed.starts_with('-') {
            return Err(ValidationError::NegativeValue { field: "price" });
        }
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed).trim_start();
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return Err(invalid());
        }

        let out_of_range = || ValidationError::PriceOutOfRange {
            value: input.to_owned(),
        };
        let whole: i64 = whole.parse().map_err(|_| out_of_range())?;

        let fraction = fraction.as_bytes();
        let digit = |index: usize| fraction.get(index).map_or(0, |byte| i64::from(byte - b'0'));
        let mut cents = digit(0) * 10 + digit(1);
        if digit(2) >= 5 {
            cents += 1;
        }

        let total = whole
            .checked_mul(100)
            .and_then(|value| value.checked_add(cents))
            .ok_or_else(out_of_range)?;
        if total > MAX_CENTS {
            return Err(out_of_range());
        }
        Ok(Self(total))
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Price {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dollar_prefixed_text() {
        assert_eq!(Price::parse("$182.01").expect("price").cents(), 18_201);
        assert_eq!(Price::parse(" $ 7 ").expect("price").cents(), 700);
        assert_eq!(Price::parse("0.5").expect("price").cents(), 50);
    }

    #[test]
    fn rounds_extra_fraction_digits() {
        assert_eq!(Price::parse("10.125").expect("price").cents(), 1_013);
        assert_eq!(Price::parse("10.1249").expect("price").cents(), 1_012);
        assert_eq!(Price::parse("9.999").expect("price").cents(), 1_000);
    }

    #[test]
    fn rejects_garbage_and_negative_values() {
        assert!(matches!(
            Price::parse("abc"),
            Err(ValidationError::InvalidPrice { .. })
        ));
        assert!(matches!(
            Price::parse("1.2.3"),
            Err(ValidationError::InvalidPrice { .. })
        ));
        assert!(matches!(
            Price::parse("-4.00"),
            Err(ValidationError::NegativeValue { .. })
        ));
        assert!(matches!(
            Price::parse("100000000.00"),
            Err(ValidationError::PriceOutOfRange { .. })
        ));
    }

    #[test]
    fn float_conversion_rounds_to_the_cent() {
        let price = Price::from_f64(11.1).expect("price");
        assert_eq!(price.cents(), 1_110);
        assert_eq!(price.to_string(), "11.10");
        assert!((price.as_f64() - 11.1).abs() < f64::EPSILON);
        assert!(Price::from_f64(f64::NAN).is_err());
    }

    #[test]
    fn serializes_as_json_number() {
        let json = serde_json::to_string(&Price::parse("12.34").expect("price")).expect("json");
        assert_eq!(json, "12.34");
    }
}
