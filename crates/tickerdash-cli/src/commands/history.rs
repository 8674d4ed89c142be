use serde::Serialize;
use tickerdash_core::{today_utc, DateRange, Period, SeriesReport};

use crate::cli::HistoryArgs;
use crate::envelope::EnvelopeError;
use crate::error::CliError;

use super::{selection_or_default, CommandResult, Context, Payload};

pub const NO_SERIES_DATA: &str = "no data available for the requested tickers in the chosen range";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    pub range: DateRange,
    #[serde(flatten)]
    pub report: SeriesReport,
}

pub async fn run(args: &HistoryArgs, context: &Context) -> Result<CommandResult, CliError> {
    let tickers = selection_or_default(&args.symbols)?;

    let (period, range) = match (&args.from, &args.to) {
        (Some(from), Some(to)) => (None, DateRange::parse(from, to)?),
        _ => (Some(args.period), args.period.range(today_utc())?),
    };

    let series = context.dashboard.series(&tickers, range, context.mode).await;
    let warnings = series.value.missing_warning();
    let empty = series.value.is_empty();
    let any_failed = series
        .value
        .outcomes
        .iter()
        .any(|outcome| outcome.status.is_failed());

    let data = HistoryData {
        period,
        range,
        report: series.value,
    };
    let mut result = CommandResult::ok(Payload::History(data))
        .with_warnings(warnings)
        .with_cache_hit(series.cache_hit);
    if empty {
        result = result
            .with_error(EnvelopeError::new("series.no_data", NO_SERIES_DATA).with_retryable(any_failed));
    }
    Ok(result)
}
