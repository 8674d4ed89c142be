//! # Domain Models
//!
//! Canonical domain types for tickerdash.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Normalized ticker |
//! | [`PricePoint`] | Daily close |
//! | [`PriceHistory`] | Ordered daily closes for one symbol |
//! | [`SnapshotRow`] | Summary table row (price, day and 12-month change) |
//! | [`SeriesPoint`] | Long-format chart row |
//! | [`DateRange`] | Inclusive calendar range |
//! | [`Period`] | Chart look-back window |
//!
//! Constructors validate their invariants; see [`crate::ValidationError`].

mod date_range;
mod models;
mod period;
mod symbol;

pub use date_range::{format_date, iso_date, parse_date, today_utc, DateRange};
pub use models::{
    default_tickers, PriceHistory, PricePoint, SeriesPoint, SnapshotRow, DEFAULT_SELECTION,
    DEFAULT_TICKERS,
};
pub use period::Period;
pub use symbol::Symbol;
