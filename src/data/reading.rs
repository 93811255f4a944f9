//! Reading normalization.
//!
//! The backend has shipped several payload shapes over time: the canonical
//! object, the same object wrapped once under `data`, and a legacy shape with
//! GPS coordinates as flat scalar fields. [`parse_payload`] recognizes each of
//! them and reports which one it saw; [`normalize`] is the best-effort view
//! used by the sinks.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

pub(crate) const HEART_RATE_KEYS: &[&str] =
    &["frecuenciaCardiaca", "frecuencia_cardiaca", "heartRate", "heart_rate", "bpm"];
pub(crate) const SPO2_KEYS: &[&str] = &["spo2", "SpO2", "spO2"];
pub(crate) const TEMPERATURE_KEYS: &[&str] = &[
    "temperaturaPiel",
    "temperatura_piel",
    "skinTemperature",
    "skin_temperature",
    "temperatura",
    "temperature",
];
const LATITUDE_KEYS: &[&str] = &["lat", "latitude", "latitud"];
const LONGITUDE_KEYS: &[&str] = &["lon", "lng", "longitude", "longitud"];
const TIMESTAMP_KEYS: &[&str] = &["timestamp", "fecha", "time"];

/// A GPS position. Either coordinate may be missing in a partial fix.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Gps {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Gps {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Returns `(latitude, longitude)` when both coordinates are present.
    pub fn fix(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    fn is_empty(&self) -> bool {
        self.latitude.is_none() && self.longitude.is_none()
    }
}

/// One normalized snapshot of sensor values.
///
/// Absent fields stay `None` so "no reading yet" is distinguishable from a
/// zero reading.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Reading {
    pub heart_rate: Option<f64>,
    pub spo2: Option<f64>,
    pub skin_temperature: Option<f64>,
    pub gps: Option<Gps>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Reading {
    /// True when no vital or position field is present.
    pub fn is_empty(&self) -> bool {
        self.heart_rate.is_none()
            && self.spo2.is_none()
            && self.skin_temperature.is_none()
            && self.gps.is_none()
    }
}

/// Outcome of recognizing an incoming payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Vitals with a nested `gps` object (or no position at all).
    Canonical(Reading),
    /// GPS arrived as flat `lat`/`lon` style fields and was nested here.
    Legacy(Reading),
    /// Nothing recognizable, including payloads wrapped more than once.
    Unrecognized(Value),
}

impl Payload {
    /// The recognized reading, if any.
    pub fn reading(&self) -> Option<&Reading> {
        match self {
            Payload::Canonical(reading) | Payload::Legacy(reading) => Some(reading),
            Payload::Unrecognized(_) => None,
        }
    }

    pub fn into_reading(self) -> Option<Reading> {
        match self {
            Payload::Canonical(reading) | Payload::Legacy(reading) => Some(reading),
            Payload::Unrecognized(_) => None,
        }
    }
}

/// Recognize a raw JSON payload.
///
/// A payload wrapped under `data` is unwrapped exactly once; a doubly
/// wrapped payload is reported as [`Payload::Unrecognized`].
pub fn parse_payload(raw: &Value) -> Payload {
    if let Some(payload) = recognize(raw) {
        return payload;
    }

    raw.get("data")
        .and_then(recognize)
        .unwrap_or_else(|| Payload::Unrecognized(raw.clone()))
}

/// Best-effort normalization: unrecognized payloads yield an empty reading.
pub fn normalize(raw: &Value) -> Reading {
    parse_payload(raw).into_reading().unwrap_or_default()
}

/// Decode one text frame from the streaming endpoint.
pub fn decode_frame(text: &str) -> Result<Payload, serde_json::Error> {
    let value: Value = serde_json::from_str(text.trim())?;
    Ok(parse_payload(&value))
}

fn recognize(raw: &Value) -> Option<Payload> {
    let object = raw.as_object()?;

    let gps = resolve_gps(object);

    let reading = Reading {
        heart_rate: number_field(object, HEART_RATE_KEYS),
        spo2: number_field(object, SPO2_KEYS),
        skin_temperature: number_field(object, TEMPERATURE_KEYS),
        gps: gps.map(|(gps, _)| gps),
        timestamp: timestamp_field(object),
    };

    if reading.is_empty() {
        return None;
    }

    match gps {
        Some((_, GpsShape::Flat)) => Some(Payload::Legacy(reading)),
        _ => Some(Payload::Canonical(reading)),
    }
}

/// Where a position was found in the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GpsShape {
    Nested,
    Flat,
}

/// The nested `gps` object wins when it holds a coordinate; otherwise the
/// flat `lat`/`lon` style fields are tried.
pub(crate) fn resolve_gps(object: &Map<String, Value>) -> Option<(Gps, GpsShape)> {
    let nested = object
        .get("gps")
        .and_then(|gps| gps.as_object())
        .map(gps_from_fields)
        .filter(|gps| !gps.is_empty());
    if let Some(gps) = nested {
        return Some((gps, GpsShape::Nested));
    }

    Some(gps_from_fields(object))
        .filter(|gps| !gps.is_empty())
        .map(|gps| (gps, GpsShape::Flat))
}

fn gps_from_fields(object: &Map<String, Value>) -> Gps {
    Gps {
        latitude: number_field(object, LATITUDE_KEYS),
        longitude: number_field(object, LONGITUDE_KEYS),
    }
}

/// First key in `keys` holding something numeric. Numeric strings count.
pub(crate) fn number_field(object: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().filter_map(|key| object.get(*key)).find_map(coerce_number)
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

pub(crate) fn timestamp_field(object: &Map<String, Value>) -> Option<DateTime<Utc>> {
    TIMESTAMP_KEYS.iter().filter_map(|key| object.get(*key)).find_map(parse_timestamp)
}

/// Accepts RFC 3339, naive ISO-8601 (taken as local wall-clock time) and
/// epoch seconds/millis.
pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(local_to_utc)
        }
        Value::Number(n) => {
            let raw = n.as_i64()?;
            // Anything past 1e11 is assumed to be milliseconds
            if raw.abs() >= 100_000_000_000 {
                DateTime::from_timestamp_millis(raw)
            } else {
                DateTime::from_timestamp(raw, 0)
            }
        }
        _ => None,
    }
}

/// A wall-clock time in a DST gap has no local instant and falls back to UTC.
fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_payload() {
        let raw = json!({
            "frecuenciaCardiaca": 82,
            "spo2": 98.5,
            "gps": { "lat": -16.4, "lon": -71.53 },
            "timestamp": "2024-05-01T10:00:00Z"
        });

        let payload = parse_payload(&raw);
        let Payload::Canonical(reading) = payload else {
            panic!("expected canonical payload, got {:?}", payload);
        };
        assert_eq!(reading.heart_rate, Some(82.0));
        assert_eq!(reading.spo2, Some(98.5));
        assert_eq!(reading.skin_temperature, None);
        assert_eq!(reading.gps, Some(Gps::new(-16.4, -71.53)));
        assert!(reading.timestamp.is_some());
    }

    #[test]
    fn test_flat_gps_is_nested() {
        for raw in [
            json!({ "frecuenciaCardiaca": 70, "lat": 1.5, "lon": 2.5 }),
            json!({ "lat": 1.5, "lng": 2.5 }),
            json!({ "latitude": 1.5, "longitude": 2.5 }),
        ] {
            let payload = parse_payload(&raw);
            assert!(matches!(payload, Payload::Legacy(_)), "{:?}", raw);
            let reading = payload.into_reading().unwrap();
            assert_eq!(reading.gps.and_then(|g| g.fix()), Some((1.5, 2.5)));
        }
    }

    #[test]
    fn test_wrapped_once_matches_inner() {
        let inner = json!({ "frecuenciaCardiaca": 101, "lat": 3.0, "lon": 4.0 });
        let wrapped = json!({ "data": inner.clone() });
        assert_eq!(normalize(&wrapped), normalize(&inner));
        assert_eq!(normalize(&wrapped).heart_rate, Some(101.0));
    }

    #[test]
    fn test_doubly_wrapped_is_unrecognized() {
        let raw = json!({ "data": { "data": { "frecuenciaCardiaca": 90 } } });
        assert!(matches!(parse_payload(&raw), Payload::Unrecognized(_)));
        assert_eq!(normalize(&raw), Reading::default());
    }

    #[test]
    fn test_missing_fields_stay_absent() {
        let reading = normalize(&json!({ "spo2": 0 }));
        assert_eq!(reading.spo2, Some(0.0));
        assert_eq!(reading.heart_rate, None);
        assert_eq!(reading.gps, None);
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let reading = normalize(&json!({ "heartRate": " 77 ", "temperature": "36.6" }));
        assert_eq!(reading.heart_rate, Some(77.0));
        assert_eq!(reading.skin_temperature, Some(36.6));

        let reading = normalize(&json!({ "heartRate": "fast", "spo2": 97 }));
        assert_eq!(reading.heart_rate, None);
    }

    #[test]
    fn test_partial_gps_keeps_known_coordinate() {
        let reading = normalize(&json!({ "gps": { "latitude": 10.0 } }));
        let gps = reading.gps.unwrap();
        assert_eq!(gps.latitude, Some(10.0));
        assert_eq!(gps.fix(), None);
    }

    #[test]
    fn test_unrecognized_shapes() {
        assert!(matches!(parse_payload(&json!([1, 2, 3])), Payload::Unrecognized(_)));
        assert!(matches!(parse_payload(&json!({ "hello": "world" })), Payload::Unrecognized(_)));
        assert!(matches!(parse_payload(&json!(null)), Payload::Unrecognized(_)));
    }

    #[test]
    fn test_decode_frame() {
        let payload = decode_frame(r#"{"data":{"spo2":95}}"#).unwrap();
        assert_eq!(payload.reading().and_then(|r| r.spo2), Some(95.0));
        assert!(decode_frame("not json").is_err());
    }

    #[test]
    fn test_timestamp_formats() {
        let rfc = parse_timestamp(&json!("2024-05-01T10:00:00+02:00")).unwrap();
        assert_eq!(rfc.to_rfc3339(), "2024-05-01T08:00:00+00:00");

        let naive = parse_timestamp(&json!("2024-05-01T10:00:00.250")).unwrap();
        assert_eq!(naive.timestamp_millis() % 1000, 250);

        let spaced = parse_timestamp(&json!("2024-05-01 10:00:00")).unwrap();
        assert_eq!(spaced.timestamp(), naive.timestamp());

        let secs = parse_timestamp(&json!(1_714_557_600)).unwrap();
        let millis = parse_timestamp(&json!(1_714_557_600_000i64)).unwrap();
        assert_eq!(secs, millis);

        assert!(parse_timestamp(&json!("yesterday")).is_none());
    }

    #[test]
    fn test_naive_timestamp_is_local_wall_clock() {
        let parsed = parse_timestamp(&json!("2024-05-01T10:00:00")).unwrap();
        let expected =
            NaiveDateTime::parse_from_str("2024-05-01 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(parsed.with_timezone(&Local).naive_local(), expected);

        // An explicit offset is still honored
        let zulu = parse_timestamp(&json!("2024-05-01T10:00:00Z")).unwrap();
        assert_eq!(zulu.naive_utc(), expected);
    }

    #[test]
    fn test_empty_nested_gps_falls_back_to_flat() {
        let raw = json!({ "gps": {}, "lat": 1.0, "lon": 2.0, "frecuenciaCardiaca": 80 });
        let payload = parse_payload(&raw);
        assert!(matches!(payload, Payload::Legacy(_)), "{:?}", payload);
        assert_eq!(normalize(&raw).gps.and_then(|g| g.fix()), Some((1.0, 2.0)));
    }
}
