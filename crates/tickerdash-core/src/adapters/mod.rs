//! Price source adapters.
//!
//! | Adapter | Use |
//! |---------|-----|
//! | [`YahooAdapter`] | Yahoo Finance v8 chart endpoint over HTTP |
//! | [`FixtureSource`] | Deterministic in-memory data for `--mock` runs and tests |

mod fixture;
mod yahoo;

pub use fixture::FixtureSource;
pub use yahoo::YahooAdapter;
