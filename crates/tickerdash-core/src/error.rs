use thiserror::Error;

/// Validation and contract errors exposed by `tickerdash-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid provider '{value}', expected one of yahoo, fixture")]
    InvalidSource { value: String },

    #[error(
        "invalid period '{value}', expected one of 1 month, 3 months, 6 months, 1 year, 3 years, 5 years, 10 years"
    )]
    InvalidPeriod { value: String },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("date range start {start} is after end {end}")]
    InvertedDateRange { start: String, end: String },
    #[error("date arithmetic overflowed while computing a range of {days} days")]
    DateOutOfRange { days: i64 },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
}
