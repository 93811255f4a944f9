//! Colors for the vitals dashboard.
//!
//! Vital cards, chart reference lines and the alert banner are colored by
//! their classification band. The palette follows the terminal background.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::Band;

/// Palette shared by every view.
///
/// [`Theme::auto_detect()`] picks [`Theme::dark()`] or [`Theme::light()`]
/// from the terminal's background luminance.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent for the chart trace and overlay borders.
    pub highlight: Color,
    /// Vitals outside the normal range but not yet alarming.
    pub warning: Color,
    /// Vitals that raise the alert banner. Also the map pin.
    pub critical: Color,
    /// Vitals within range.
    pub normal: Color,
    /// Map coastlines.
    pub land: Color,
    pub border: Color,
    /// History table header and popup heading.
    pub header: Style,
    /// Selected history row.
    pub selected: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub border_type: BorderType,
}

impl Theme {
    /// Palette for dark backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            normal: Color::Green,
            land: Color::DarkGray,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Palette for light backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            normal: Color::Green,
            land: Color::Gray,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Falls back to the dark palette when the terminal does not answer.
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Critical values are also bold so they stand out on the cards.
    pub fn band_style(&self, band: Band) -> Style {
        match band {
            Band::Normal => Style::default().fg(self.normal),
            Band::Warning => Style::default().fg(self.warning),
            Band::Critical => Style::default().fg(self.critical).add_modifier(Modifier::BOLD),
        }
    }

    pub fn band_color(&self, band: Band) -> Color {
        match band {
            Band::Normal => self.normal,
            Band::Warning => self.warning,
            Band::Critical => self.critical,
        }
    }
}
