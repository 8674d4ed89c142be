use tickerdash_core::{SnapshotReport, SnapshotRow};

const HEADERS: [&str; 4] = ["Ticker", "Price", "Day %", "12M %"];

fn cells(row: &SnapshotRow) -> [String; 4] {
    [
        row.ticker.to_string(),
        format!("{:.2}", row.current_price),
        format!("{:+.2}", row.day_change_pct),
        format!("{:+.2}", row.year_change_pct),
    ]
}

/// Summary table as aligned lines; ticker left-aligned, numbers right-aligned.
pub fn render_snapshot(report: &SnapshotReport) -> Vec<String> {
    let rows: Vec<[String; 4]> = report.rows.iter().map(cells).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |values: [&str; 4]| -> String {
        format!(
            "{:<w0$}  {:>w1$}  {:>w2$}  {:>w3$}",
            values[0],
            values[1],
            values[2],
            values[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
        )
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_line(HEADERS));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &rows {
        lines.push(format_line([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
        ]));
    }
    lines
}
