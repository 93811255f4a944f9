//! Historical records fetched from the backend and the table that shows them.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use serde_json::Value;

use super::reading::{
    number_field, resolve_gps, timestamp_field, Gps, HEART_RATE_KEYS, SPO2_KEYS, TEMPERATURE_KEYS,
};

/// Default number of rows shown in the history table.
pub const DEFAULT_TABLE_ROWS: usize = 10;

/// Placeholder for a missing field.
pub const PLACEHOLDER: &str = "--";

/// A record as returned by the history endpoint. Every field is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HistoricalRecord {
    pub user_id: Option<String>,
    pub heart_rate: Option<f64>,
    pub spo2: Option<f64>,
    pub skin_temperature: Option<f64>,
    pub gps: Option<Gps>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl HistoricalRecord {
    /// Read a record from loosely shaped JSON. Non-objects yield an empty record.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let user_id = ["idUsuario", "id_usuario", "userId", "user_id"]
            .iter()
            .filter_map(|key| object.get(*key))
            .find_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        Self {
            user_id,
            heart_rate: number_field(object, HEART_RATE_KEYS),
            spo2: number_field(object, SPO2_KEYS),
            skin_temperature: number_field(object, TEMPERATURE_KEYS),
            gps: resolve_gps(object).map(|(gps, _)| gps),
            timestamp: timestamp_field(object),
        }
    }

    /// Display cells: user, heart rate, latitude, longitude, timestamp.
    pub fn cells(&self) -> [String; 5] {
        let coord = |c: Option<f64>| c.map(|v| format!("{:.4}", v));
        [
            self.user_id.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
            self.heart_rate.map(|v| format!("{:.0}", v)).unwrap_or_else(|| PLACEHOLDER.to_string()),
            coord(self.gps.and_then(|g| g.latitude)).unwrap_or_else(|| PLACEHOLDER.to_string()),
            coord(self.gps.and_then(|g| g.longitude)).unwrap_or_else(|| PLACEHOLDER.to_string()),
            self.timestamp
                .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        ]
    }
}

/// Extract records from the history endpoint's response.
///
/// Accepts a bare array, `{"records": [...]}` or `{"data": [...]}`.
/// Anything else yields no records.
pub fn parse_records(body: &Value) -> Vec<HistoricalRecord> {
    let items = match body {
        Value::Array(items) => Some(items),
        Value::Object(object) => ["records", "data"]
            .iter()
            .find_map(|key| object.get(*key).and_then(|v| v.as_array())),
        _ => None,
    };

    items
        .map(|items| items.iter().map(HistoricalRecord::from_value).collect())
        .unwrap_or_default()
}

/// What the history table currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum TableState {
    /// Nothing fetched yet.
    Loading,
    /// The last fetch failed.
    Failed(String),
    /// Newest first, at most `rows` entries. May be empty.
    Rows(Vec<HistoricalRecord>),
}

/// Keeps the most recent records for display.
#[derive(Debug, Clone)]
pub struct HistoryTable {
    rows: usize,
    state: TableState,
    refreshed_at: Option<DateTime<Local>>,
}

impl HistoryTable {
    pub fn new(rows: usize) -> Self {
        Self {
            rows: rows.max(1),
            state: TableState::Loading,
            refreshed_at: None,
        }
    }

    /// Show the most recent records, newest first.
    ///
    /// Records are ordered by timestamp when every record has one; otherwise
    /// arrival order is taken as chronological.
    pub fn render(&mut self, mut records: Vec<HistoricalRecord>, now: DateTime<Local>) {
        if records.iter().all(|r| r.timestamp.is_some()) {
            records.sort_by_key(|r| r.timestamp);
        }

        let skip = records.len().saturating_sub(self.rows);
        let mut newest: Vec<HistoricalRecord> = records.into_iter().skip(skip).collect();
        newest.reverse();

        self.state = TableState::Rows(newest);
        self.refreshed_at = Some(now);
    }

    /// Record a failed fetch. Rows from an earlier success are replaced.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.state = TableState::Failed(message.into());
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn records(&self) -> &[HistoricalRecord] {
        match &self.state {
            TableState::Rows(rows) => rows,
            _ => &[],
        }
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Local>> {
        self.refreshed_at
    }

    pub fn capacity(&self) -> usize {
        self.rows
    }
}
