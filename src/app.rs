//! Application state and navigation logic.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use serde_json::Value;

use crate::data::{Dashboard, MetricKind};
use crate::source::DataSource;
use crate::ui::Theme;

/// Default path for in-app exports.
pub const DEFAULT_EXPORT_PATH: &str = "vitalwatch_export.json";

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Vital cards and the chart of the selected metric.
    Live,
    /// The position marker.
    Map,
    /// Recent records from the backend.
    History,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Live => View::Map,
            View::Map => View::History,
            View::History => View::Live,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Live => View::History,
            View::Map => View::Live,
            View::History => View::Map,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Live => "Live",
            View::Map => "Map",
            View::History => "History",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub dashboard: Dashboard,
    pub load_error: Option<String>,

    // Navigation state
    pub selected_metric: MetricKind,
    pub selected_history_index: usize,

    // UI
    pub theme: Theme,
    pub export_path: PathBuf,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App with the given data source and dashboard.
    pub fn new(source: Box<dyn DataSource>, dashboard: Dashboard) -> Self {
        Self::with_theme(source, dashboard, Theme::auto_detect())
    }

    pub fn with_theme(source: Box<dyn DataSource>, dashboard: Dashboard, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Live,
            show_help: false,
            source,
            dashboard,
            load_error: None,
            selected_metric: MetricKind::HeartRate,
            selected_history_index: 0,
            theme,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Drain every waiting event from the source into the dashboard.
    ///
    /// Returns the number of events applied.
    pub fn reload_data(&mut self) -> usize {
        let mut applied = 0;
        while let Some(feed) = self.source.poll() {
            self.dashboard.apply(feed, Instant::now(), Local::now());
            applied += 1;
        }

        self.load_error = self.source.error().map(str::to_string);

        let rows = self.dashboard.history().records().len();
        if self.selected_history_index >= rows {
            self.selected_history_index = rows.saturating_sub(1);
        }
        applied
    }

    /// Advance timers (alert auto-dismiss).
    pub fn tick(&mut self) {
        self.dashboard.tick(Instant::now());
    }

    /// Switch to the next view (cycles through Live → Map → History).
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Chart the next metric.
    pub fn cycle_metric(&mut self) {
        self.selected_metric = self.selected_metric.next();
    }

    /// Move the history selection down by one row.
    pub fn select_next(&mut self) {
        let rows = self.dashboard.history().records().len();
        if rows > 0 {
            self.selected_history_index = (self.selected_history_index + 1).min(rows - 1);
        }
    }

    /// Move the history selection up by one row.
    pub fn select_prev(&mut self) {
        self.selected_history_index = self.selected_history_index.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected_history_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_history_index = self.dashboard.history().records().len().saturating_sub(1);
    }

    /// Ask the source to reconnect now.
    pub fn reconnect(&mut self) {
        self.source.request_reconnect();
        self.set_status_message("Reconnect requested".to_string());
    }

    pub fn clear_charts(&mut self) {
        self.dashboard.clear_charts();
        self.set_status_message("Charts cleared".to_string());
    }

    pub fn dismiss_alert(&mut self) {
        self.dashboard.dismiss_alert();
    }

    pub fn zoom_in(&mut self) {
        self.dashboard.map_mut().zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.dashboard.map_mut().zoom_out();
    }

    pub fn toggle_popup(&mut self) {
        self.dashboard.map_mut().toggle_popup();
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export chart data and the latest reading to a file.
    pub fn export_charts(&self, path: &Path) -> Result<()> {
        write_json(path, &self.dashboard.export(Local::now()))
    }
}

/// Write `value` as pretty JSON to `path`.
pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Reading, TableState};
    use crate::source::{ChannelSource, Feed, FetchTarget};
    use crate::transport::{ConnectionState, ConnectionStatus};
    use tokio::sync::mpsc;

    fn test_app() -> (mpsc::Sender<Feed>, App) {
        let (tx, source) = ChannelSource::create("test");
        let app = App::with_theme(Box::new(source), Dashboard::default(), Theme::dark());
        (tx, app)
    }

    fn hr(value: f64) -> Feed {
        Feed::Reading(Reading {
            heart_rate: Some(value),
            ..Default::default()
        })
    }

    #[test]
    fn test_view_cycles() {
        let (_tx, mut app) = test_app();
        assert_eq!(app.current_view, View::Live);
        app.next_view();
        assert_eq!(app.current_view, View::Map);
        app.next_view();
        app.next_view();
        assert_eq!(app.current_view, View::Live);
        app.prev_view();
        assert_eq!(app.current_view, View::History);
        assert_eq!(View::History.label(), "History");
    }

    #[test]
    fn test_reload_drains_in_order() {
        let (tx, mut app) = test_app();
        tx.try_send(Feed::Connection(ConnectionStatus {
            state: ConnectionState::Connected,
            retry_count: 0,
            max_retries: 10,
        }))
        .unwrap();
        tx.try_send(hr(70.0)).unwrap();
        tx.try_send(hr(75.0)).unwrap();

        assert_eq!(app.reload_data(), 3);
        assert_eq!(app.reload_data(), 0);
        assert!(app.dashboard.connection().is_connected());
        assert_eq!(app.dashboard.latest().unwrap().heart_rate, Some(75.0));

        let series = app.dashboard.charts().series(MetricKind::HeartRate).unwrap();
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![70.0, 75.0]);
    }

    #[test]
    fn test_closed_source_sets_load_error() {
        let (tx, mut app) = test_app();
        drop(tx);
        app.reload_data();
        assert_eq!(app.load_error.as_deref(), Some("Channel closed"));
    }

    #[test]
    fn test_history_selection_clamps() {
        let (tx, mut app) = test_app();
        let records = (0..3)
            .map(|i| {
                crate::data::HistoricalRecord::from_value(&serde_json::json!({ "idUsuario": i }))
            })
            .collect();
        tx.try_send(Feed::History(records)).unwrap();
        app.reload_data();

        app.select_last();
        assert_eq!(app.selected_history_index, 2);
        app.select_next();
        assert_eq!(app.selected_history_index, 2);
        app.select_first();
        app.select_prev();
        assert_eq!(app.selected_history_index, 0);

        // A failed refresh empties the table and the selection follows.
        app.selected_history_index = 2;
        tx.try_send(Feed::FetchFailed {
            target: FetchTarget::History,
            message: "HTTP status 503".to_string(),
        })
        .unwrap();
        app.reload_data();
        assert!(matches!(app.dashboard.history().state(), TableState::Failed(_)));
        assert_eq!(app.selected_history_index, 0);
    }

    #[test]
    fn test_alert_dismiss_and_metric_cycle() {
        let (tx, mut app) = test_app();
        tx.try_send(hr(140.0)).unwrap();
        app.reload_data();
        assert!(app.dashboard.alerts().current().is_some());

        app.dismiss_alert();
        assert!(app.dashboard.alerts().current().is_none());

        app.cycle_metric();
        assert_eq!(app.selected_metric, MetricKind::Spo2);
    }

    #[test]
    fn test_export_charts() {
        let (tx, mut app) = test_app();
        tx.try_send(hr(88.0)).unwrap();
        app.reload_data();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        app.export_charts(&path).unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["charts"]["HeartRate"]["data"], serde_json::json!([88.0]));
    }

    #[test]
    fn test_status_message_expires() {
        let (_tx, mut app) = test_app();
        app.clear_charts();
        assert_eq!(app.get_status_message(), Some("Charts cleared"));

        app.status_message = Some(("old".to_string(), Instant::now() - Duration::from_secs(4)));
        assert!(app.get_status_message().is_none());
    }
}
