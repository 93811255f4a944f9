//! # vitalwatch
//!
//! A terminal dashboard and library for live vital-sign telemetry.
//!
//! Readings (heart rate, SpO₂, skin temperature and GPS) arrive over a
//! WebSocket stream and from a small HTTP API. Each reading is normalized,
//! classified against fixed medical ranges, and fanned out to the sinks that
//! back the display: bounded chart series, a single map marker, a transient
//! alert banner and a table of recent records.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(dashboard)    │(rendering)   │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── LiveSource | StreamSource | ChannelSource   │
//! │  │ (input) │        │                                       │
//! │  └─────────┘        ├── transport (WebSocket + reconnect)   │
//! │                     └── api (HTTP polling)                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: application state, view navigation and user actions
//! - **[`source`]**: the [`DataSource`] trait and its implementations
//! - **[`transport`]**: the streaming connection and its reconnect state machine
//! - **[`api`]**: the request/response client and periodic history refresh
//! - **[`data`]**: normalization, classification and the sinks, coordinated by
//!   [`Dashboard`]
//! - **[`config`]**: layered [`Settings`] with development/production endpoints
//! - **[`ui`]**: terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the production backend
//! vitalwatch
//!
//! # Watch a local backend
//! vitalwatch --env development
//!
//! # Replay newline-delimited JSON frames
//! cat frames.jsonl | vitalwatch --stdin
//! ```
//!
//! ### As a library with channel source
//!
//! ```
//! use std::time::Instant;
//! use chrono::Local;
//! use vitalwatch::{ChannelSource, Dashboard, DataSource, Feed, Reading};
//!
//! let (tx, mut source) = ChannelSource::create("embedded");
//! tx.try_send(Feed::Reading(Reading {
//!     heart_rate: Some(72.0),
//!     ..Default::default()
//! }))
//! .unwrap();
//!
//! let mut dashboard = Dashboard::default();
//! while let Some(feed) = source.poll() {
//!     dashboard.apply(feed, Instant::now(), Local::now());
//! }
//! assert_eq!(dashboard.card_text(vitalwatch::MetricKind::HeartRate), "72");
//! ```
//!
//! ### As a library with stream source
//!
//! ```no_run
//! use std::io::Cursor;
//! use vitalwatch::{App, Dashboard, StreamSource};
//!
//! # tokio_test::block_on(async {
//! let frames = b"{\"frecuenciaCardiaca\": 80}\n";
//! let source = StreamSource::spawn(Cursor::new(frames.to_vec()), "replay");
//! let app = App::new(Box::new(source), Dashboard::default());
//! # });
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod source;
pub mod transport;
pub mod ui;

// Re-export main types for convenience
pub use api::ApiClient;
pub use app::App;
pub use config::{EnvironmentName, Settings};
pub use data::{
    classify, normalize, parse_payload, Band, ClassifiedMetric, Dashboard, HistoricalRecord,
    MetricKind, Payload, Reading,
};
pub use error::ApiError;
pub use source::{ChannelSource, DataSource, Feed, FetchTarget, LiveSource, StreamSource};
pub use transport::{ConnectionState, ConnectionStatus, RetryPolicy};
