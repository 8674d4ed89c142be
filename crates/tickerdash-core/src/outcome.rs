use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::data_source::SourceError;
use crate::Symbol;

/// What happened to one requested ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickerStatus {
    Loaded { points: usize },
    NoData,
    InsufficientHistory { points: usize },
    InvalidBasePrice,
    Failed { code: String, message: String },
}

impl TickerStatus {
    pub fn failed(error: &SourceError) -> Self {
        Self::Failed {
            code: error.code().to_owned(),
            message: error.message().to_owned(),
        }
    }

    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl Display for TickerStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loaded { points } => write!(f, "loaded {points} price points"),
            Self::NoData => f.write_str("no data returned"),
            Self::InsufficientHistory { points } => {
                write!(f, "only {points} price point(s), need at least 2")
            }
            Self::InvalidBasePrice => f.write_str("base price is zero, change is undefined"),
            Self::Failed { code, message } => write!(f, "{message} ({code})"),
        }
    }
}

/// Per-ticker result record, one per distinct requested ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerOutcome {
    pub ticker: Symbol,
    #[serde(flatten)]
    pub status: TickerStatus,
}

impl TickerOutcome {
    pub fn new(ticker: Symbol, status: TickerStatus) -> Self {
        Self { ticker, status }
    }

    /// User-facing warning line for this ticker.
    pub fn warning(&self) -> String {
        format!("could not load data for {}: {}", self.ticker, self.status)
    }
}

/// Input tickers with duplicates removed, first occurrence kept.
pub(crate) fn distinct(tickers: &[Symbol]) -> Vec<&Symbol> {
    let mut seen = HashSet::with_capacity(tickers.len());
    tickers.iter().filter(|symbol| seen.insert(*symbol)).collect()
}
