//! Threshold classification of vital signs against fixed medical ranges.

use serde::Serialize;

/// The vital signs tracked by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MetricKind {
    HeartRate,
    Spo2,
    Temperature,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] =
        [MetricKind::HeartRate, MetricKind::Spo2, MetricKind::Temperature];

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::HeartRate => "Heart Rate",
            MetricKind::Spo2 => "SpO₂",
            MetricKind::Temperature => "Skin Temp",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::HeartRate => "BPM",
            MetricKind::Spo2 => "%",
            MetricKind::Temperature => "°C",
        }
    }

    /// Fixed y-axis range used when charting this metric.
    pub fn chart_bounds(&self) -> [f64; 2] {
        match self {
            MetricKind::HeartRate => [40.0, 140.0],
            MetricKind::Spo2 => [85.0, 100.0],
            MetricKind::Temperature => [34.0, 40.0],
        }
    }

    /// Band boundaries drawn as reference lines on the chart.
    pub fn reference_lines(&self) -> &'static [(f64, Band)] {
        match self {
            MetricKind::HeartRate => {
                &[(60.0, Band::Warning), (100.0, Band::Warning), (130.0, Band::Critical)]
            }
            MetricKind::Spo2 => &[(97.0, Band::Warning), (93.0, Band::Critical)],
            MetricKind::Temperature => {
                &[(36.0, Band::Warning), (37.5, Band::Warning), (38.0, Band::Critical)]
            }
        }
    }

    /// Cycle to the next metric.
    pub fn next(self) -> Self {
        match self {
            MetricKind::HeartRate => MetricKind::Spo2,
            MetricKind::Spo2 => MetricKind::Temperature,
            MetricKind::Temperature => MetricKind::HeartRate,
        }
    }

    fn decimals(&self) -> usize {
        match self {
            MetricKind::HeartRate => 0,
            MetricKind::Spo2 | MetricKind::Temperature => 1,
        }
    }

    /// Format a value with the precision used on this metric's card.
    pub fn format_value(&self, value: f64) -> String {
        format!("{:.*}", self.decimals(), value)
    }
}

/// Severity band for a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub enum Band {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl Band {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Band::Normal => "OK",
            Band::Warning => "WARN",
            Band::Critical => "CRIT",
        }
    }
}

/// A metric value annotated with its band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedMetric {
    pub kind: MetricKind,
    /// `None` when the reading carried no value for this metric.
    pub value: Option<f64>,
    pub band: Band,
    /// Short status label for the metric card.
    pub status: &'static str,
    /// Alert text, present only for critical values.
    pub message: Option<String>,
}

/// Classify a metric value. Never fails: absent or non-finite values are
/// left in the normal band without an alert.
pub fn classify(kind: MetricKind, value: Option<f64>) -> ClassifiedMetric {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return ClassifiedMetric {
            kind,
            value,
            band: Band::Normal,
            status: "Normal",
            message: None,
        };
    };

    let (band, status) = match kind {
        MetricKind::HeartRate => {
            if v > 130.0 {
                (Band::Critical, "Stress alert")
            } else if v > 100.0 {
                (Band::Warning, "Elevated")
            } else if v < 60.0 {
                (Band::Warning, "Low")
            } else {
                (Band::Normal, "Normal")
            }
        }
        MetricKind::Spo2 => {
            if v < 93.0 {
                (Band::Critical, "Low oxygenation")
            } else if v < 97.0 {
                (Band::Warning, "Moderate")
            } else {
                (Band::Normal, "Normal")
            }
        }
        MetricKind::Temperature => {
            if v > 38.0 {
                (Band::Critical, "Heat stroke risk")
            } else if v > 37.5 {
                (Band::Warning, "Fever")
            } else if v < 36.0 {
                (Band::Warning, "Hypothermia")
            } else {
                (Band::Normal, "Normal")
            }
        }
    };

    let message = (band == Band::Critical).then(|| {
        let shown = kind.format_value(v);
        match kind {
            MetricKind::HeartRate => format!("High stress detected: {} BPM", shown),
            MetricKind::Spo2 => format!("Low oxygenation: {}%", shown),
            MetricKind::Temperature => format!("Possible heat stroke: {}°C", shown),
        }
    });

    ClassifiedMetric {
        kind,
        value,
        band,
        status,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(kind: MetricKind, value: f64) -> Band {
        classify(kind, Some(value)).band
    }

    #[test]
    fn test_heart_rate_bands() {
        assert_eq!(band(MetricKind::HeartRate, 131.0), Band::Critical);
        assert_eq!(band(MetricKind::HeartRate, 130.0), Band::Warning);
        assert_eq!(band(MetricKind::HeartRate, 101.0), Band::Warning);
        assert_eq!(band(MetricKind::HeartRate, 100.0), Band::Normal);
        assert_eq!(band(MetricKind::HeartRate, 80.0), Band::Normal);
        assert_eq!(band(MetricKind::HeartRate, 60.0), Band::Normal);
        assert_eq!(band(MetricKind::HeartRate, 59.0), Band::Warning);
    }

    #[test]
    fn test_spo2_bands() {
        assert_eq!(band(MetricKind::Spo2, 92.9), Band::Critical);
        assert_eq!(band(MetricKind::Spo2, 93.0), Band::Warning);
        assert_eq!(band(MetricKind::Spo2, 96.9), Band::Warning);
        assert_eq!(band(MetricKind::Spo2, 97.0), Band::Normal);
    }

    #[test]
    fn test_temperature_bands() {
        assert_eq!(band(MetricKind::Temperature, 38.1), Band::Critical);
        assert_eq!(band(MetricKind::Temperature, 38.0), Band::Warning);
        assert_eq!(band(MetricKind::Temperature, 37.6), Band::Warning);
        assert_eq!(band(MetricKind::Temperature, 37.5), Band::Normal);
        assert_eq!(band(MetricKind::Temperature, 36.0), Band::Normal);
        assert_eq!(band(MetricKind::Temperature, 35.9), Band::Warning);
    }

    #[test]
    fn test_absent_value_is_normal_without_message() {
        for kind in MetricKind::ALL {
            let classified = classify(kind, None);
            assert_eq!(classified.band, Band::Normal);
            assert!(classified.value.is_none());
            assert!(classified.message.is_none());
        }
        assert_eq!(classify(MetricKind::Spo2, Some(f64::NAN)).band, Band::Normal);
    }

    #[test]
    fn test_only_critical_carries_message() {
        let critical = classify(MetricKind::HeartRate, Some(142.0));
        assert_eq!(critical.message.as_deref(), Some("High stress detected: 142 BPM"));
        assert_eq!(critical.status, "Stress alert");

        let warning = classify(MetricKind::HeartRate, Some(55.0));
        assert_eq!(warning.status, "Low");
        assert!(warning.message.is_none());

        let temp = classify(MetricKind::Temperature, Some(38.4));
        assert_eq!(temp.message.as_deref(), Some("Possible heat stroke: 38.4°C"));
    }

    #[test]
    fn test_metric_cycle() {
        let mut kind = MetricKind::HeartRate;
        for _ in 0..3 {
            kind = kind.next();
        }
        assert_eq!(kind, MetricKind::HeartRate);
    }
}
