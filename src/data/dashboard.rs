//! The coordinating dashboard state.
//!
//! [`Dashboard`] owns every sink and is the only thing that mutates them.
//! Feed events are applied one at a time in arrival order.

use std::time::Instant;

use chrono::{DateTime, Local};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::alert::{AlertSink, Tone, DEFAULT_DISMISS_AFTER};
use super::classify::{classify, Band, ClassifiedMetric, MetricKind};
use super::history::{HistoryTable, DEFAULT_TABLE_ROWS, PLACEHOLDER};
use super::position::{MapSink, MapUpdate};
use super::reading::Reading;
use super::series::{ChartSink, SeriesPoint};
use crate::config::Settings;
use crate::source::{Feed, FetchTarget};
use crate::transport::{ConnectionState, ConnectionStatus};

/// Card text shown while the first connection attempt is still running.
pub const CONNECTING_PLACEHOLDER: &str = "...";

/// The value of `kind` carried by `reading`, if any.
pub fn metric_value(reading: &Reading, kind: MetricKind) -> Option<f64> {
    match kind {
        MetricKind::HeartRate => reading.heart_rate,
        MetricKind::Spo2 => reading.spo2,
        MetricKind::Temperature => reading.skin_temperature,
    }
}

/// All live dashboard state.
#[derive(Debug)]
pub struct Dashboard {
    connection: ConnectionStatus,
    latest: Option<Reading>,
    vitals: Vec<ClassifiedMetric>,
    charts: ChartSink,
    map: MapSink,
    alerts: AlertSink,
    history: HistoryTable,
    last_reading_at: Option<Instant>,
    readings: u64,
    dropped: u64,
    last_drop: Option<String>,
    latest_error: Option<String>,
}

impl Dashboard {
    /// Build a dashboard around the given sinks.
    pub fn new(charts: ChartSink, map: MapSink, alerts: AlertSink, history: HistoryTable) -> Self {
        Self {
            connection: ConnectionStatus::default(),
            latest: None,
            vitals: MetricKind::ALL.iter().map(|k| classify(*k, None)).collect(),
            charts,
            map,
            alerts,
            history,
            last_reading_at: None,
            readings: 0,
            dropped: 0,
            last_drop: None,
            latest_error: None,
        }
    }

    /// Build a dashboard from loaded settings. `tone` plays on every alert.
    pub fn from_settings(settings: &Settings, tone: Option<Box<dyn Tone>>) -> Self {
        let mut dashboard = Self::new(
            ChartSink::new(),
            MapSink::new(
                (settings.map.center_lat, settings.map.center_lon),
                settings.map.initial_zoom,
                settings.map.fix_zoom,
            ),
            AlertSink::new(settings.alerts.dismiss_after, tone),
            HistoryTable::new(settings.history.rows),
        );
        dashboard.connection.max_retries = settings.transport.max_retries;
        dashboard
    }

    /// Apply one feed event.
    pub fn apply(&mut self, feed: Feed, now: Instant, wall: DateTime<Local>) {
        match feed {
            Feed::Connection(status) => {
                if status.state != self.connection.state {
                    info!("connection: {}", status.describe());
                }
                self.connection = status;
            }
            Feed::Reading(reading) => self.ingest(reading, now, wall),
            Feed::Latest(reading) => {
                self.latest_error = None;
                self.ingest(reading, now, wall);
            }
            Feed::History(records) => self.history.render(records, wall),
            Feed::FetchFailed { target, message } => match target {
                FetchTarget::Latest => self.latest_error = Some(message),
                FetchTarget::History => self.history.fail(message),
            },
            Feed::Dropped(reason) => {
                self.dropped += 1;
                self.last_drop = Some(reason);
            }
        }
    }

    /// Fan one reading out to every sink.
    ///
    /// Absent metrics reset their card to the placeholder and add no chart
    /// point. All critical messages of one reading share a single banner.
    pub fn ingest(&mut self, reading: Reading, now: Instant, wall: DateTime<Local>) {
        let label = reading
            .timestamp
            .map(|t| t.with_timezone(&Local))
            .unwrap_or(wall)
            .format("%H:%M:%S")
            .to_string();

        let mut critical = Vec::new();
        self.vitals.clear();
        for kind in MetricKind::ALL {
            let metric = classify(kind, metric_value(&reading, kind));
            if let Some(value) = metric.value.filter(|v| v.is_finite()) {
                self.charts.push(kind, SeriesPoint::new(label.clone(), value));
            }
            if metric.band == Band::Critical {
                critical.extend(metric.message.clone());
            }
            self.vitals.push(metric);
        }

        if !critical.is_empty() {
            self.alerts.raise(critical.join(" | "), Band::Critical, now);
        }

        if self.map.update_position(reading.gps.as_ref(), wall) == MapUpdate::Placed {
            debug!("first position fix");
        }

        self.latest = Some(reading);
        self.last_reading_at = Some(now);
        self.readings += 1;
    }

    /// Advance timers.
    pub fn tick(&mut self, now: Instant) {
        self.alerts.tick(now);
    }

    /// Card text for a metric.
    pub fn card_text(&self, kind: MetricKind) -> String {
        let connecting =
            self.latest.is_none() && self.connection.state == ConnectionState::Connecting;
        match self.vital(kind).and_then(|m| m.value).filter(|v| v.is_finite()) {
            Some(value) => kind.format_value(value),
            None if connecting => CONNECTING_PLACEHOLDER.to_string(),
            None => PLACEHOLDER.to_string(),
        }
    }

    pub fn vital(&self, kind: MetricKind) -> Option<&ClassifiedMetric> {
        self.vitals.iter().find(|m| m.kind == kind)
    }

    /// Latest fix as `(lat, lon)` text to 6 decimals, plus a status label.
    pub fn location_text(&self) -> (String, String, &'static str) {
        let fix = self.latest.as_ref().and_then(|r| r.gps.as_ref()).and_then(|g| g.fix());
        match fix {
            Some((lat, lon)) => (format!("{:.6}", lat), format!("{:.6}", lon), "Located"),
            None => (PLACEHOLDER.to_string(), PLACEHOLDER.to_string(), "Unknown"),
        }
    }

    pub fn clear_charts(&mut self) {
        self.charts.clear_all();
    }

    pub fn dismiss_alert(&mut self) {
        self.alerts.dismiss();
    }

    /// Chart data and the latest reading as one JSON document.
    pub fn export(&self, wall: DateTime<Local>) -> Value {
        json!({
            "exported_at": wall.to_rfc3339(),
            "connection": self.connection,
            "latest": self.latest,
            "charts": self.charts.export(),
        })
    }

    pub fn connection(&self) -> &ConnectionStatus {
        &self.connection
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.latest.as_ref()
    }

    pub fn latest_error(&self) -> Option<&str> {
        self.latest_error.as_deref()
    }

    pub fn charts(&self) -> &ChartSink {
        &self.charts
    }

    pub fn map(&self) -> &MapSink {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapSink {
        &mut self.map
    }

    pub fn alerts(&self) -> &AlertSink {
        &self.alerts
    }

    pub fn history(&self) -> &HistoryTable {
        &self.history
    }

    pub fn last_reading_at(&self) -> Option<Instant> {
        self.last_reading_at
    }

    pub fn reading_count(&self) -> u64 {
        self.readings
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    pub fn last_drop(&self) -> Option<&str> {
        self.last_drop.as_deref()
    }
}

impl Default for Dashboard {
    /// Silent dashboard centered on Arequipa with the stock limits.
    fn default() -> Self {
        Self::new(
            ChartSink::new(),
            MapSink::new((-16.3989, -71.537), 14, 15),
            AlertSink::new(DEFAULT_DISMISS_AFTER, None),
            HistoryTable::new(DEFAULT_TABLE_ROWS),
        )
    }
}
