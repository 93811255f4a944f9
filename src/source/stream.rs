//! Stream-based data source.
//!
//! Reads newline-delimited JSON frames from an async byte stream, such as a
//! recorded session piped through stdin or a raw TCP feed.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

use super::{DataSource, Feed};
use crate::transport::frame_to_feed;

/// A data source that decodes readings from an async stream.
///
/// Each non-empty line is one frame and goes through the same decoder as the
/// streaming connection; undecodable lines become [`Feed::Dropped`].
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use vitalwatch::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"{\"frecuenciaCardiaca\": 72}\n";
/// let source = StreamSource::spawn(Cursor::new(data.to_vec()), "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<Feed>,
    description: String,
    last_error: Option<String>,
}

impl StreamSource {
    /// Spawn a background task that reads frames from the given reader.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = Vec::new();

            loop {
                line.clear();
                match reader.read_until(b'\n', &mut line).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let feed = match std::str::from_utf8(&line) {
                            Ok(text) if text.trim().is_empty() => continue,
                            Ok(text) => frame_to_feed(text),
                            Err(e) => Feed::Dropped(format!("Invalid UTF-8 frame: {}", e)),
                        };
                        if tx.send(feed).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("stream read error: {}", e);
                        let _ = tx.send(Feed::Dropped(format!("Read error: {}", e))).await;
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            last_error: None,
        }
    }
}

impl DataSource for StreamSource {
    fn poll(&mut self) -> Option<Feed> {
        match self.receiver.try_recv() {
            Ok(feed) => Some(feed),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.last_error = Some("Stream closed".to_string());
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
