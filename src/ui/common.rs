//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, alert banner
//! and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_age;
use crate::data::Band;
use crate::transport::ConnectionState;

/// Render the header bar with the connection overview.
///
/// Displays: connection indicator and text, readings received, dropped frames.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let connection = app.dashboard.connection();

    let status_style = match connection.state {
        ConnectionState::Connected => app.theme.band_style(Band::Normal),
        ConnectionState::Connecting => app.theme.band_style(Band::Warning),
        ConnectionState::Disconnected { .. } => app.theme.band_style(Band::Critical),
    };

    let dropped = app.dashboard.dropped_count();

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        Span::styled("VITALWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(connection.describe(), status_style),
        Span::raw(" │ "),
        Span::styled(
            format!("{}", app.dashboard.reading_count()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" readings │ "),
        if dropped > 0 {
            Span::styled(format!("{}", dropped), Style::default().fg(app.theme.warning))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" dropped"),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Live "),
        Line::from(" 2:Map "),
        Line::from(" 3:History "),
    ];

    let selected = match app.current_view {
        View::Live => 0,
        View::Map => 1,
        View::History => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: source, time since the last reading, available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.current_view {
        View::Live => "m:metric c:clear e:export r:reconnect ?:help q:quit",
        View::Map => "+/-:zoom p:popup r:reconnect ?:help q:quit",
        View::History => "↑↓:select r:reconnect ?:help q:quit",
    };

    let status = if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit", err)
    } else if let Some(at) = app.dashboard.last_reading_at() {
        format!(
            " {} | Last reading {} ago | {}",
            app.source_description(),
            format_age(at.elapsed()),
            controls
        )
    } else if let Some(err) = app.dashboard.latest_error() {
        format!(" {} | No data: {} | {}", app.source_description(), err, controls)
    } else {
        format!(" {} | Waiting for data... | {}", app.source_description(), controls)
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the current alert as a banner across the top of `area`.
pub fn render_alert(frame: &mut Frame, app: &App, area: Rect) {
    let Some(alert) = app.dashboard.alerts().current() else {
        return;
    };

    let style = app.theme.band_style(alert.severity);
    let banner = Rect::new(area.x, area.y, area.width, 3.min(area.height));

    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", alert.severity.symbol()),
            style.add_modifier(Modifier::REVERSED),
        ),
        Span::raw(" "),
        Span::styled(alert.message.clone(), style),
    ]))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(" Alert [x:dismiss] ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(style),
    );

    frame.render_widget(Clear, banner);
    frame.render_widget(paragraph, banner);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  Tab/1-3     Switch views"),
        Line::from("  ↑/↓ j/k     Select history row"),
        Line::from(""),
        section(" Live"),
        Line::from("  m         Cycle charted metric"),
        Line::from("  c         Clear charts"),
        Line::from("  e         Export charts to JSON"),
        Line::from(""),
        section(" Map"),
        Line::from("  +/-       Zoom in/out"),
        Line::from("  p         Toggle position popup"),
        Line::from(""),
        section(" General"),
        Line::from("  x/Esc     Dismiss alert"),
        Line::from("  r         Reconnect now"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);
    let help_area = super::centered(area, 42, 24);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
