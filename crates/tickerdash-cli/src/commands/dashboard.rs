use tickerdash_core::{today_utc, DashboardRequest, ViewError};

use crate::cli::DashboardArgs;
use crate::envelope::EnvelopeError;
use crate::error::CliError;

use super::{selection_or_default, CommandResult, Context, Payload};

pub async fn run(args: &DashboardArgs, context: &Context) -> Result<CommandResult, CliError> {
    let selection = match &args.select {
        Some(raw) if raw.is_empty() => Vec::new(),
        Some(raw) => selection_or_default(raw)?,
        None => selection_or_default(&[])?,
    };

    let request = DashboardRequest::new(
        context.tickers.clone(),
        selection,
        args.period,
        today_utc(),
    );
    let view = context.dashboard.render(&request, context.mode).await;

    let errors = view
        .errors
        .iter()
        .map(|error| EnvelopeError::new(error_code(error), error.to_string()))
        .collect::<Vec<_>>();
    let warnings = view.warnings.clone();
    let cache_hit = view.cache_hit;

    let mut result = CommandResult::ok(Payload::Dashboard(Box::new(view)))
        .with_warnings(warnings)
        .with_cache_hit(cache_hit);
    for error in errors {
        result = result.with_error(error);
    }
    Ok(result)
}

fn error_code(error: &ViewError) -> &'static str {
    match error {
        ViewError::NoSelection => "dashboard.no_selection",
        ViewError::NoSeriesData => "series.no_data",
        ViewError::InvalidRange { .. } => "dashboard.invalid_range",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    #[test]
    fn view_errors_map_to_stable_codes() {
        assert_eq!(error_code(&ViewError::NoSelection), "dashboard.no_selection");
        assert_eq!(error_code(&ViewError::NoSeriesData), "series.no_data");
        let invalid = ViewError::InvalidRange {
            message: String::from("date arithmetic overflowed"),
        };
        assert_eq!(error_code(&invalid), "dashboard.invalid_range");
    }

    #[tokio::test]
    async fn empty_selection_becomes_a_no_selection_error() {
        let cli = Cli::try_parse_from(["tickerdash", "--mock", "dashboard", "--select"])
            .expect("parses");
        let context = Context::from_cli(&cli).expect("context");
        let Command::Dashboard(args) = &cli.command else {
            panic!("expected dashboard command");
        };

        let result = run(args, &context).await.expect("runs");

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "dashboard.no_selection");
        assert_eq!(result.errors[0].message, "no tickers selected");
    }
}
