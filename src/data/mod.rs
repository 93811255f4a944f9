//! Data models and processing for vital-sign telemetry.
//!
//! ## Submodules
//!
//! - [`reading`]: payload recognition and normalization ([`Reading`], [`Payload`])
//! - [`classify`]: threshold bands per metric ([`classify()`], [`Band`])
//! - [`series`]: bounded chart series ([`ChartSink`])
//! - [`position`]: the single map marker ([`MapSink`])
//! - [`alert`]: transient banner with auto-dismiss ([`AlertSink`])
//! - [`history`]: the recent-records table ([`HistoryTable`])
//! - [`dashboard`]: the state that owns all of the above ([`Dashboard`])
//! - [`duration`]: parsing and formatting of duration strings
//!
//! ## Data Flow
//!
//! ```text
//! JSON frame / HTTP body
//!        │
//!        ▼
//! parse_payload() ──▶ Reading
//!        │
//!        ▼
//! Dashboard::ingest()
//!        │
//!        ├──▶ classify() ──▶ cards, AlertSink
//!        ├──▶ ChartSink
//!        └──▶ MapSink
//! ```

pub mod alert;
pub mod classify;
pub mod dashboard;
pub mod duration;
pub mod history;
pub mod position;
pub mod reading;
pub mod series;

pub use alert::{Alert, AlertSink, TerminalBell, Tone};
pub use classify::{classify, Band, ClassifiedMetric, MetricKind};
pub use dashboard::Dashboard;
pub use history::{parse_records, HistoricalRecord, HistoryTable, TableState};
pub use position::{MapSink, MapUpdate, MapView, Popup};
pub use reading::{decode_frame, normalize, parse_payload, Gps, Payload, Reading};
pub use series::{ChartSink, SeriesBuffer, SeriesPoint, SERIES_CAPACITY};
