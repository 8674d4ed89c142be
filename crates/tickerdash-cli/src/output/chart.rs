//! Text line chart: one sparkline row per ticker.

use tickerdash_core::{format_date, SeriesPoint, SeriesReport};

const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
pub const DEFAULT_WIDTH: usize = 60;

/// Down-sample `values` to at most `width` buckets by averaging.
fn resample(values: &[f64], width: usize) -> Vec<f64> {
    if width == 0 || values.len() <= width {
        return values.to_vec();
    }
    (0..width)
        .map(|bucket| {
            let start = bucket * values.len() / width;
            let end = ((bucket + 1) * values.len() / width).max(start + 1);
            let slice = &values[start..end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

pub fn sparkline(values: &[f64], width: usize) -> String {
    let values = resample(values, width);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    values
        .iter()
        .map(|value| {
            if span <= f64::EPSILON {
                return LEVELS[LEVELS.len() / 2];
            }
            let scaled = ((value - min) / span * (LEVELS.len() - 1) as f64).round() as usize;
            LEVELS[scaled.min(LEVELS.len() - 1)]
        })
        .collect()
}

/// Chart lines for every ticker in the report, in report order.
pub fn render_series(report: &SeriesReport, width: usize) -> Vec<String> {
    let tickers = report.tickers();
    let label_width = tickers
        .iter()
        .map(|ticker| ticker.as_str().len())
        .max()
        .unwrap_or(0);

    tickers
        .into_iter()
        .filter_map(|ticker| {
            let points: Vec<&SeriesPoint> = report.points_for(ticker).collect();
            let (first, last) = (points.first()?, points.last()?);
            let closes: Vec<f64> = points.iter().map(|point| point.close).collect();
            let low = closes.iter().copied().fold(f64::INFINITY, f64::min);
            let high = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some(format!(
                "{:<label_width$}  {}  {} .. {}  {:.2} -> {:.2}  (low {:.2}, high {:.2})",
                ticker.as_str(),
                sparkline(&closes, width),
                format_date(first.date),
                format_date(last.date),
                first.close,
                last.close,
                low,
                high,
            ))
        })
        .collect()
}
