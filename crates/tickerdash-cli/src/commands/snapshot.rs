use tickerdash_core::today_utc;

use crate::cli::SnapshotArgs;
use crate::envelope::EnvelopeError;
use crate::error::CliError;

use super::{CommandResult, Context, Payload};

pub const NO_SNAPSHOT_DATA: &str = "no data available for the requested tickers";

pub async fn run(args: &SnapshotArgs, context: &Context) -> Result<CommandResult, CliError> {
    let tickers = context.tickers_or_default(&args.symbols)?;

    let snapshot = context
        .dashboard
        .snapshot(&tickers, today_utc(), context.mode)
        .await;
    let warnings = snapshot.value.warnings();
    let empty = snapshot.value.is_empty();
    let any_failed = snapshot
        .value
        .outcomes
        .iter()
        .any(|outcome| outcome.status.is_failed());

    let mut result = CommandResult::ok(Payload::Snapshot(snapshot.value))
        .with_warnings(warnings)
        .with_cache_hit(snapshot.cache_hit);
    if empty {
        result = result
            .with_error(EnvelopeError::new("snapshot.no_data", NO_SNAPSHOT_DATA).with_retryable(any_failed));
    }
    Ok(result)
}
