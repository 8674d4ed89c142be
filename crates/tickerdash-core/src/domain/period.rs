use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{DateRange, ValidationError};

/// Chart look-back window offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    ThreeYears,
    FiveYears,
    TenYears,
}

impl Period {
    /// Selection list in display order.
    pub const ALL: [Self; 7] = [
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
        Self::ThreeYears,
        Self::FiveYears,
        Self::TenYears,
    ];

    pub const fn days(self) -> i64 {
        match self {
            Self::OneMonth => 30,
            Self::ThreeMonths => 90,
            Self::SixMonths => 180,
            Self::OneYear => 365,
            Self::ThreeYears => 365 * 3,
            Self::FiveYears => 365 * 5,
            Self::TenYears => 365 * 10,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::OneMonth => "1 month",
            Self::ThreeMonths => "3 months",
            Self::SixMonths => "6 months",
            Self::OneYear => "1 year",
            Self::ThreeYears => "3 years",
            Self::FiveYears => "5 years",
            Self::TenYears => "10 years",
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::ThreeYears => "3y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
        }
    }

    const fn legacy_label(self) -> &'static str {
        match self {
            Self::OneMonth => "1 mês",
            Self::ThreeMonths => "3 meses",
            Self::SixMonths => "6 meses",
            Self::OneYear => "1 ano",
            Self::ThreeYears => "3 anos",
            Self::FiveYears => "5 anos",
            Self::TenYears => "10 anos",
        }
    }

    /// Accepts the display label, the short code or the Portuguese label.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let needle = input.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|period| {
                needle == period.label() || needle == period.code() || needle == period.legacy_label()
            })
            .ok_or_else(|| ValidationError::InvalidPeriod {
                value: input.to_owned(),
            })
    }

    /// `[today - days, today]`.
    pub fn range(self, today: Date) -> Result<DateRange, ValidationError> {
        DateRange::trailing(today, self.days())
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn every_period_maps_to_documented_day_count() {
        let expected = [30, 90, 180, 365, 1095, 1825, 3650];
        for (period, days) in Period::ALL.into_iter().zip(expected) {
            assert_eq!(period.days(), days, "{period}");
        }
    }

    #[test]
    fn parses_labels_codes_and_legacy_labels() {
        assert_eq!(Period::parse("1 month"), Ok(Period::OneMonth));
        assert_eq!(Period::parse("3Y"), Ok(Period::ThreeYears));
        assert_eq!(Period::parse("6 meses"), Ok(Period::SixMonths));
        assert_eq!(Period::parse("1 Mês"), Ok(Period::OneMonth));
        assert!(matches!(
            Period::parse("2 weeks"),
            Err(ValidationError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn one_month_range_ends_today() {
        let range = Period::OneMonth.range(date!(2024 - 06 - 15)).expect("range");
        assert_eq!(range.start(), date!(2024 - 05 - 16));
        assert_eq!(range.end(), date!(2024 - 06 - 15));
    }

    #[test]
    fn default_selection_is_first_entry() {
        assert_eq!(Period::default(), Period::ALL[0]);
    }
}
