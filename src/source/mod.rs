//! Data source abstraction for receiving telemetry.
//!
//! Every source produces [`Feed`] events: connection updates, readings from
//! the stream, the latest reading and history from the HTTP endpoints, and
//! notices about dropped frames or failed fetches. The TUI drains them in
//! arrival order once per frame.

mod channel;
mod live;
mod stream;

pub use channel::ChannelSource;
pub use live::LiveSource;
pub use stream::StreamSource;

use std::fmt::{self, Debug};

use crate::data::{HistoricalRecord, Reading};
use crate::transport::ConnectionStatus;

/// Which request/response endpoint a fetch targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTarget {
    Latest,
    History,
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchTarget::Latest => write!(f, "latest reading"),
            FetchTarget::History => write!(f, "history"),
        }
    }
}

/// One event delivered to the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum Feed {
    /// The streaming connection changed state.
    Connection(ConnectionStatus),
    /// A reading arrived over the stream.
    Reading(Reading),
    /// The latest reading from the request/response endpoint.
    Latest(Reading),
    /// A fresh batch of historical records.
    History(Vec<HistoricalRecord>),
    /// A request/response fetch failed.
    FetchFailed { target: FetchTarget, message: String },
    /// A stream frame could not be decoded and was dropped.
    Dropped(String),
}

/// Trait for receiving telemetry from various sources.
///
/// # Example
///
/// ```
/// use vitalwatch::{ChannelSource, DataSource, Feed, Reading};
///
/// let (tx, mut source) = ChannelSource::create("test");
/// tx.try_send(Feed::Reading(Reading::default())).unwrap();
/// assert!(matches!(source.poll(), Some(Feed::Reading(_))));
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the next event.
    ///
    /// Returns `Some(feed)` if an event is waiting, `None` otherwise.
    /// This method must not block.
    fn poll(&mut self) -> Option<Feed>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// The last source-level error, if any.
    fn error(&self) -> Option<&str>;

    /// Ask the source to reconnect right away. Sources without a connection
    /// ignore this.
    fn request_reconnect(&mut self) {}
}
