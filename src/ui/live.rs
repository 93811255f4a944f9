//! Live view rendering.
//!
//! A row of cards (one per vital plus the location card) above the chart of
//! the selected metric.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{Band, MetricKind};

/// Render the Live view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let [cards, chart] = Layout::vertical([Constraint::Length(5), Constraint::Min(6)]).areas(area);

    let slots = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(2),
    ])
    .split(cards);

    for (kind, slot) in MetricKind::ALL.iter().zip(slots.iter()) {
        render_vital_card(frame, app, *kind, *slot);
    }
    render_location_card(frame, app, slots[3]);

    super::chart::render(frame, app, app.selected_metric, chart);
}

fn render_vital_card(frame: &mut Frame, app: &App, kind: MetricKind, area: Rect) {
    let metric = app.dashboard.vital(kind);
    let band = metric.map(|m| m.band).unwrap_or_default();
    let has_value = metric.and_then(|m| m.value).is_some();
    let status = if has_value { metric.map(|m| m.status).unwrap_or("") } else { "" };

    let value_style = if has_value {
        app.theme.band_style(band).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let border_style = if kind == app.selected_metric {
        Style::default().fg(app.theme.highlight)
    } else if band == Band::Normal {
        Style::default().fg(app.theme.border)
    } else {
        app.theme.band_style(band)
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(app.dashboard.card_text(kind), value_style),
            Span::raw(" "),
            Span::styled(kind.unit(), Style::default().add_modifier(Modifier::DIM)),
        ]),
        Line::from(Span::styled(status, app.theme.band_style(band))),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(format!(" {} ", kind.label()))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(border_style),
    );

    frame.render_widget(paragraph, area);
}

fn render_location_card(frame: &mut Frame, app: &App, area: Rect) {
    let (lat, lon, status) = app.dashboard.location_text();
    let status_style = if status == "Located" {
        app.theme.band_style(Band::Normal)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(vec![Span::raw("Lat "), Span::styled(lat, bold)]),
        Line::from(vec![Span::raw("Lon "), Span::styled(lon, bold)]),
        Line::from(Span::styled(status, status_style)),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Location ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(paragraph, area);
}
