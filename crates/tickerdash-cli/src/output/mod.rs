mod chart;
mod table;

use std::io::{self, Write};

use tickerdash_core::{DashboardView, SeriesReport};

use crate::cli::OutputFormat;
use crate::commands::{HistoryData, Payload, PeriodInfo};
use crate::envelope::Envelope;
use crate::error::CliError;

pub fn render(envelope: &Envelope<Payload>, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_envelope(&mut out, envelope, format, pretty)?;
    out.flush()?;
    Ok(())
}

pub fn write_envelope<W: Write>(
    out: &mut W,
    envelope: &Envelope<Payload>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Ndjson => {
            let payload = serde_json::to_string(envelope)?;
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => write_table(out, envelope)?,
    }

    Ok(())
}

fn write_table<W: Write>(out: &mut W, envelope: &Envelope<Payload>) -> io::Result<()> {
    match &envelope.data {
        Payload::Snapshot(report) => {
            writeln!(out, "Summary")?;
            write_lines(out, table::render_snapshot(report))?;
        }
        Payload::History(data) => write_history(out, data)?,
        Payload::Dashboard(view) => write_dashboard(out, view)?,
        Payload::Periods(periods) => write_periods(out, periods)?,
    }

    if !envelope.meta.warnings.is_empty() {
        writeln!(out)?;
        writeln!(out, "warnings:")?;
        for warning in &envelope.meta.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }

    if !envelope.errors.is_empty() {
        writeln!(out)?;
        writeln!(out, "errors:")?;
        for error in &envelope.errors {
            writeln!(out, "  - {}: {}", error.code, error.message)?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "source: {}  latency_ms: {}  cache_hit: {}  generated_at: {}",
        envelope.meta.source, envelope.meta.latency_ms, envelope.meta.cache_hit, envelope.meta.generated_at
    )
}

fn write_history<W: Write>(out: &mut W, data: &HistoryData) -> io::Result<()> {
    match data.period {
        Some(period) => writeln!(out, "Price history, {period} ({})", data.range)?,
        None => writeln!(out, "Price history ({})", data.range)?,
    }
    write_chart(out, &data.report)
}

fn write_dashboard<W: Write>(out: &mut W, view: &DashboardView) -> io::Result<()> {
    writeln!(out, "Summary")?;
    write_lines(out, table::render_snapshot(&view.snapshot))?;
    writeln!(out)?;

    match view.range {
        Some(range) => writeln!(out, "Price history, {} ({range})", view.period)?,
        None => writeln!(out, "Price history, {}", view.period)?,
    }
    if let Some(series) = &view.series {
        write_chart(out, series)?;
    }
    Ok(())
}

fn write_chart<W: Write>(out: &mut W, report: &SeriesReport) -> io::Result<()> {
    write_lines(out, chart::render_series(report, chart::DEFAULT_WIDTH))
}

fn write_periods<W: Write>(out: &mut W, periods: &[PeriodInfo]) -> io::Result<()> {
    writeln!(out, "{:<10}  {:<5}  {:>5}", "Period", "Code", "Days")?;
    for info in periods {
        writeln!(out, "{:<10}  {:<5}  {:>5}", info.label, info.code, info.days)?;
    }
    Ok(())
}

fn write_lines<W: Write>(out: &mut W, lines: Vec<String>) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EnvelopeError;
    use crate::metadata::Metadata;
    use tickerdash_core::{ProviderId, SnapshotReport};

    fn envelope(data: Payload, errors: Vec<EnvelopeError>) -> Envelope<Payload> {
        let mut metadata = Metadata::new(ProviderId::Fixture, 3, false);
        metadata.push_warning("could not load data for ITUB4.SA: only 1 price point(s), need at least 2");
        Envelope::with_errors(metadata.into_envelope_meta(), data, errors)
    }

    fn rendered(envelope: &Envelope<Payload>, format: OutputFormat) -> String {
        let mut buffer = Vec::new();
        write_envelope(&mut buffer, envelope, format, false).expect("renders");
        String::from_utf8(buffer).expect("utf8")
    }

    #[test]
    fn ndjson_is_a_single_line() {
        let envelope = envelope(Payload::Periods(Vec::new()), Vec::new());
        let output = rendered(&envelope, OutputFormat::Ndjson);
        assert_eq!(output.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&output).expect("json");
        assert_eq!(value["meta"]["source"], "fixture");
        assert_eq!(value["data"], serde_json::json!([]));
    }

    #[test]
    fn table_lists_warnings_and_errors() {
        let report = SnapshotReport {
            rows: Vec::new(),
            outcomes: Vec::new(),
        };
        let envelope = envelope(
            Payload::Snapshot(report),
            vec![EnvelopeError::new("snapshot.no_data", "no data available for the requested tickers")],
        );

        let output = rendered(&envelope, OutputFormat::Table);
        assert!(output.starts_with("Summary\nTicker"));
        assert!(output.contains("warnings:\n  - could not load data for ITUB4.SA"));
        assert!(output.contains("errors:\n  - snapshot.no_data: no data available"));
        assert!(output.contains("source: fixture"));
    }
}
