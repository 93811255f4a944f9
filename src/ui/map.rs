//! Map view rendering.
//!
//! World coastlines on a canvas, the single position marker, and the popup
//! with the coordinates and time of the latest fix.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution, Points},
        Block, Borders, Clear, Paragraph,
    },
    Frame,
};

use crate::app::App;

/// Render the Map view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let map = app.dashboard.map();
    let view = *map.view();
    let marker = map.marker();
    let land = app.theme.land;
    let pin = app.theme.critical;

    let title = match marker {
        Some(_) => format!(" Position [zoom {}] [+/-:zoom p:popup] ", view.zoom),
        None => format!(" Position [zoom {}] waiting for GPS fix ", view.zoom),
    };

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .marker(Marker::Braille)
        .x_bounds(view.x_bounds())
        .y_bounds(view.y_bounds())
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: land,
                resolution: MapResolution::High,
            });
            if let Some((lat, lon)) = marker {
                ctx.layer();
                ctx.draw(&Points {
                    coords: &[(lon, lat)],
                    color: pin,
                });
                ctx.print(lon, lat, Span::styled("●", Style::default().fg(pin)));
            }
        });

    frame.render_widget(canvas, area);

    if let Some(popup) = map.popup() {
        let lines = vec![
            Line::from(Span::styled("Current location", app.theme.header)),
            Line::from(format!("Lat: {:.6}", popup.latitude)),
            Line::from(format!("Lon: {:.6}", popup.longitude)),
            Line::from(Span::styled(
                format!("Updated {}", popup.updated.format("%H:%M:%S")),
                Style::default().add_modifier(Modifier::DIM),
            )),
        ];

        let width = 24u16.min(area.width.saturating_sub(2));
        let height = 6u16.min(area.height.saturating_sub(2));
        let popup_area = Rect::new(
            area.x + area.width.saturating_sub(width + 1),
            area.y + 1,
            width,
            height,
        );

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.highlight)),
        );

        frame.render_widget(Clear, popup_area);
        frame.render_widget(paragraph, popup_area);
    }
}
