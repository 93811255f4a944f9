//! History view rendering.
//!
//! Shows the most recent records, newest first. Missing fields render as a
//! placeholder; load failures and empty responses get a single message row.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::{Band, TableState as HistoryState};

/// Render the History view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let history = app.dashboard.history();

    let header = Row::new(vec![
        Cell::from("User"),
        Cell::from("HR (BPM)"),
        Cell::from("Latitude"),
        Cell::from("Longitude"),
        Cell::from("Timestamp"),
    ])
    .height(1)
    .style(app.theme.header);

    let message_row = |text: String, style: Style| Row::new(vec![Cell::from(text).style(style)]);

    let rows: Vec<Row> = match history.state() {
        HistoryState::Loading => vec![message_row(
            "Loading...".to_string(),
            Style::default().add_modifier(Modifier::DIM),
        )],
        HistoryState::Failed(err) => vec![message_row(
            format!("Error loading data: {}", err),
            app.theme.band_style(Band::Critical),
        )],
        HistoryState::Rows(records) if records.is_empty() => vec![message_row(
            "No data available".to_string(),
            Style::default().add_modifier(Modifier::DIM),
        )],
        HistoryState::Rows(records) => records
            .iter()
            .map(|record| Row::new(record.cells().into_iter().map(Cell::from).collect::<Vec<_>>()))
            .collect(),
    };

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Min(19),
    ];

    let refreshed = history
        .refreshed_at()
        .map(|t| format!(" refreshed {}", t.format("%H:%M:%S")))
        .unwrap_or_default();

    let count = history.records().len();
    let position_info = if count > 0 {
        format!(" [{}/{}]", app.selected_history_index + 1, count)
    } else {
        String::new()
    };

    let title = format!(
        " Recent records (last {}){}{} ",
        history.capacity(),
        refreshed,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if count > 0 {
        state.select(Some(app.selected_history_index.min(count - 1)));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
