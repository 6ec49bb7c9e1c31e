use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::ValidationError;

/// Length of the period a chart bar covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub const ALL: [Self; 3] = [Self::Daily, Self::Weekly, Self::Monthly];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// First calendar day of the period containing `date`: the date itself,
    /// the Monday of its ISO week, or the 1st of its month.
    pub fn period_start(self, date: Date) -> Date {
        match self {
            Self::Daily => date,
            Self::Weekly => {
                let back = i64::from(date.weekday().number_days_from_monday());
                date.checked_sub(Duration::days(back)).unwrap_or(Date::MIN)
            }
            Self::Monthly => date.replace_day(1).unwrap_or(date),
        }
    }

    /// Pick a granularity that keeps a `start..=end` chart readable:
    /// monthly beyond a year, weekly beyond two months, daily otherwise.
    pub fn for_range(start: Date, end: Date) -> Self {
        let days = (end - start).whole_days();
        if days > 365 {
            Self::Monthly
        } else if days > 60 {
            Self::Weekly
        } else {
            Self::Daily
        }
    }
}

impl Display for Granularity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = ValidationError;

    /// Names are matched exactly; `"Weekly"` is rejected.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|granularity| granularity.as_str() == value)
            .ok_or_else(|| ValidationError::InvalidGranularity {
                value: value.to_owned(),
            })
    }
}
