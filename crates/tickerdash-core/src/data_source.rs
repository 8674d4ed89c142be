//! Price source trait and request/response types.
//!
//! This module defines the adapter contract (`PriceSource`) that every
//! provider implementation follows. The snapshot and series loaders only ever
//! talk to a `&dyn PriceSource`, so tests and the `--mock` mode can swap the
//! network adapter for a deterministic one.
//!
//! # Contract
//!
//! | Outcome | Meaning |
//! |---------|---------|
//! | `Ok(history)` with points | Daily closes inside the requested range |
//! | `Ok(history)` without points | Provider knows nothing for this range (delisted, holiday-only range) |
//! | `Err(SourceError)` | Transport, rate-limit or payload failure |
//!
//! Implementations must not retry internally; retry policy belongs to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use tickerdash_core::{DateRange, HistoryRequest, PriceSource, Symbol, YahooAdapter};
//!
//! async fn last_close(adapter: &YahooAdapter) -> Option<f64> {
//!     let range = DateRange::parse("2024-01-01", "2024-03-31").ok()?;
//!     let request = HistoryRequest::new(Symbol::parse("AAPL").ok()?, range);
//!     adapter.history(request).await.ok()?.last_close()
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{DateRange, PriceHistory, ProviderId, Symbol};

/// Health state reported by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Runtime source health snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
    pub rate_available: bool,
}

impl HealthStatus {
    pub const fn new(state: HealthState, rate_available: bool) -> Self {
        Self {
            state,
            rate_available,
        }
    }

    pub const fn healthy() -> Self {
        Self::new(HealthState::Healthy, true)
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Upstream,
    Internal,
}

/// Structured source error carried into per-ticker outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    /// Provider answered, but the payload could not be understood.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Upstream,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Upstream => "source.upstream",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for a daily close history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    pub range: DateRange,
}

impl HistoryRequest {
    pub fn new(symbol: Symbol, range: DateRange) -> Self {
        Self { symbol, range }
    }
}

/// Boxed future returned by [`PriceSource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Price source adapter contract.
///
/// Implementations must be `Send + Sync`; the dashboard shares one instance
/// behind an `Arc`.
pub trait PriceSource: Send + Sync {
    /// Returns the provider identifier recorded in output metadata.
    fn id(&self) -> ProviderId;

    /// Fetches daily closes for `req.symbol` inside `req.range`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the provider is unreachable, rate limited,
    /// or answers with a payload that cannot be parsed. "No data" is not an
    /// error: it is an empty [`PriceHistory`].
    fn history<'a>(&'a self, req: HistoryRequest)
        -> SourceFuture<'a, Result<PriceHistory, SourceError>>;

    /// Returns the current health status of this source.
    fn health<'a>(&'a self) -> SourceFuture<'a, HealthStatus>;
}
