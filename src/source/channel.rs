//! Channel-based data source.
//!
//! Receives feed events via a tokio mpsc channel. Useful for embedding the
//! dashboard next to another producer, and for tests.

use tokio::sync::mpsc;

use super::{DataSource, Feed};

/// Capacity of channels created by [`ChannelSource::create`].
const CHANNEL_CAPACITY: usize = 256;

/// A data source that receives feed events via a channel.
///
/// # Example
///
/// ```
/// use vitalwatch::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("simulator");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<Feed>,
    description: String,
    last_error: Option<String>,
}

impl ChannelSource {
    /// Wrap an existing receiver.
    pub fn new(receiver: mpsc::Receiver<Feed>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            last_error: None,
        }
    }

    /// Create a channel pair: a sender for producers and the source for the TUI.
    pub fn create(source_description: &str) -> (mpsc::Sender<Feed>, Self) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Feed> {
        match self.receiver.try_recv() {
            Ok(feed) => Some(feed),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.last_error = Some("Channel closed".to_string());
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Reading;

    #[test]
    fn test_channel_source_preserves_order() {
        let (tx, mut source) = ChannelSource::create("test");
        assert!(source.poll().is_none());

        for bpm in [70.0, 71.0, 72.0] {
            let reading = Reading {
                heart_rate: Some(bpm),
                ..Default::default()
            };
            tx.try_send(Feed::Reading(reading)).unwrap();
        }

        let received: Vec<f64> = std::iter::from_fn(|| source.poll())
            .filter_map(|feed| match feed {
                Feed::Reading(r) => r.heart_rate,
                _ => None,
            })
            .collect();
        assert_eq!(received, vec![70.0, 71.0, 72.0]);
        assert_eq!(source.description(), "channel: test");
    }

    #[test]
    fn test_channel_source_reports_closed() {
        let (tx, mut source) = ChannelSource::create("test");
        drop(tx);
        assert!(source.poll().is_none());
        assert_eq!(source.error(), Some("Channel closed"));
    }
}
