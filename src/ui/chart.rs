//! Line chart of one metric's ring buffer.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use crate::app::App;
use crate::data::{MetricKind, SERIES_CAPACITY};

/// Render the chart for `kind` with its reference lines and fixed y range.
///
/// The update is immediate; the widget is rebuilt from the buffer each frame.
pub fn render(frame: &mut Frame, app: &App, kind: MetricKind, area: Rect) {
    let buffer = app.dashboard.charts().series(kind);
    let points = buffer.map(|b| b.chart_data()).unwrap_or_default();
    let x_max = (SERIES_CAPACITY - 1) as f64;

    let lines: Vec<(Vec<(f64, f64)>, Style)> = kind
        .reference_lines()
        .iter()
        .map(|(y, band)| {
            (
                vec![(0.0, *y), (x_max, *y)],
                Style::default().fg(app.theme.band_color(*band)).add_modifier(Modifier::DIM),
            )
        })
        .collect();

    let mut datasets: Vec<Dataset> = lines
        .iter()
        .map(|(data, style)| {
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(*style)
                .data(data)
        })
        .collect();

    datasets.push(
        Dataset::default()
            .name(format!("{} ({})", kind.label(), kind.unit()))
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.highlight))
            .data(&points),
    );

    let first = buffer.and_then(|b| b.first_label()).unwrap_or("");
    let last = buffer.and_then(|b| b.last_label()).unwrap_or("");
    let [low, high] = kind.chart_bounds();

    let title = format!(
        " {} [{}/{}] [m:metric c:clear] ",
        kind.label(),
        points.len(),
        SERIES_CAPACITY
    );

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels([Span::raw(first.to_string()), Span::raw(last.to_string())])
                .style(Style::default().add_modifier(Modifier::DIM)),
        )
        .y_axis(
            Axis::default()
                .bounds([low, high])
                .labels([
                    Span::raw(kind.format_value(low)),
                    Span::raw(kind.format_value((low + high) / 2.0)),
                    Span::raw(kind.format_value(high)),
                ])
                .style(Style::default().add_modifier(Modifier::DIM)),
        );

    frame.render_widget(chart, area);
}
