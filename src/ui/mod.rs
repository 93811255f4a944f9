//! Terminal UI rendering using ratatui.
//!
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`live`]: vital cards, location card and the chart of the selected metric
//! - [`chart`]: line chart fed from a metric's ring buffer
//! - [`map`]: world map canvas with the position marker and its popup
//! - [`history`]: table of the most recent backend records
//! - [`common`]: shared components (header, tabs, status bar, alert banner, help)
//! - [`theme`]: light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (live/map/history::render)           │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - common::render_alert
//!    - common::render_help
//! ```

pub mod chart;
pub mod common;
pub mod history;
pub mod live;
pub mod map;
pub mod theme;

pub use theme::Theme;

use ratatui::layout::Rect;

/// A `width` x `height` rectangle centered in `area`, clamped to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}
