//! Bounded time series feeding the live charts.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use super::classify::MetricKind;

/// Maximum number of points kept per chart series.
pub const SERIES_CAPACITY: usize = 20;

/// A single chart point: a time label and a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Fixed-capacity FIFO of chart points, oldest first.
#[derive(Debug, Clone, Default)]
pub struct SeriesBuffer {
    points: VecDeque<SeriesPoint>,
}

impl SeriesBuffer {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(SERIES_CAPACITY + 1),
        }
    }

    /// Append a point, evicting the oldest once over capacity.
    pub fn push(&mut self, point: SeriesPoint) {
        self.points.push_back(point);
        if self.points.len() > SERIES_CAPACITY {
            self.points.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesPoint> {
        self.points.iter()
    }

    pub fn first_label(&self) -> Option<&str> {
        self.points.front().map(|p| p.label.as_str())
    }

    pub fn last_label(&self) -> Option<&str> {
        self.points.back().map(|p| p.label.as_str())
    }

    /// `(index, value)` pairs ready for a line chart.
    pub fn chart_data(&self) -> Vec<(f64, f64)> {
        self.points.iter().enumerate().map(|(i, p)| (i as f64, p.value)).collect()
    }
}

/// Owns one [`SeriesBuffer`] per metric. Rendering happens in the UI layer.
#[derive(Debug, Clone, Default)]
pub struct ChartSink {
    series: BTreeMap<MetricKind, SeriesBuffer>,
}

impl ChartSink {
    pub fn new() -> Self {
        Self {
            series: MetricKind::ALL.iter().map(|k| (*k, SeriesBuffer::new())).collect(),
        }
    }

    pub fn push(&mut self, kind: MetricKind, point: SeriesPoint) {
        self.series.entry(kind).or_default().push(point);
    }

    /// Empty one series without removing it.
    pub fn clear(&mut self, kind: MetricKind) {
        if let Some(buffer) = self.series.get_mut(&kind) {
            buffer.clear();
        }
    }

    pub fn clear_all(&mut self) {
        for buffer in self.series.values_mut() {
            buffer.clear();
        }
    }

    pub fn series(&self, kind: MetricKind) -> Option<&SeriesBuffer> {
        self.series.get(&kind)
    }

    /// Labels and values per metric, for export.
    pub fn export(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .series
            .iter()
            .map(|(kind, buffer)| {
                let labels: Vec<&str> = buffer.iter().map(|p| p.label.as_str()).collect();
                let values: Vec<f64> = buffer.iter().map(|p| p.value).collect();
                (
                    format!("{:?}", kind),
                    serde_json::json!({ "labels": labels, "data": values }),
                )
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_most_recent_twenty() {
        let mut sink = ChartSink::new();
        for i in 0..25 {
            sink.push(MetricKind::HeartRate, SeriesPoint::new(format!("t{}", i), i as f64));
        }

        let series = sink.series(MetricKind::HeartRate).unwrap();
        assert_eq!(series.len(), SERIES_CAPACITY);
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let expected: Vec<f64> = (5..25).map(|i| i as f64).collect();
        assert_eq!(values, expected);
        assert_eq!(series.first_label(), Some("t5"));
        assert_eq!(series.last_label(), Some("t24"));
    }

    #[test]
    fn test_clear_keeps_series() {
        let mut sink = ChartSink::new();
        sink.push(MetricKind::Spo2, SeriesPoint::new("a", 98.0));
        sink.push(MetricKind::HeartRate, SeriesPoint::new("a", 70.0));
        sink.clear(MetricKind::Spo2);

        assert!(sink.series(MetricKind::Spo2).unwrap().is_empty());
        assert_eq!(sink.series(MetricKind::HeartRate).unwrap().len(), 1);

        sink.push(MetricKind::Spo2, SeriesPoint::new("b", 97.0));
        assert_eq!(sink.series(MetricKind::Spo2).unwrap().len(), 1);
    }

    #[test]
    fn test_clear_all() {
        let mut sink = ChartSink::new();
        sink.push(MetricKind::Temperature, SeriesPoint::new("a", 36.5));
        sink.clear_all();
        assert!(MetricKind::ALL.iter().all(|k| sink.series(*k).unwrap().is_empty()));
    }

    #[test]
    fn test_chart_data_indices() {
        let mut buffer = SeriesBuffer::new();
        buffer.push(SeriesPoint::new("a", 1.0));
        buffer.push(SeriesPoint::new("b", 2.0));
        assert_eq!(buffer.chart_data(), vec![(0.0, 1.0), (1.0, 2.0)]);
    }

    #[test]
    fn test_export_shape() {
        let mut sink = ChartSink::new();
        sink.push(MetricKind::HeartRate, SeriesPoint::new("10:00:00", 72.0));
        let export = sink.export();
        assert_eq!(export["HeartRate"]["labels"][0], "10:00:00");
        assert_eq!(export["HeartRate"]["data"][0], 72.0);
        assert_eq!(export["Spo2"]["data"].as_array().unwrap().len(), 0);
    }
}
