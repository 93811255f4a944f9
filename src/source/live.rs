//! Live backend source: the streaming connection plus the HTTP poller.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{DataSource, Feed};
use crate::api::{self, ApiClient};
use crate::transport::{self, Command, RetryPolicy};

/// Feeds the dashboard from a running backend.
///
/// Spawns two tasks on the current tokio runtime, both writing to one
/// channel: the WebSocket transport and the periodic HTTP refresh. Both are
/// aborted when the source is dropped.
#[derive(Debug)]
pub struct LiveSource {
    receiver: mpsc::Receiver<Feed>,
    commands: mpsc::Sender<Command>,
    description: String,
    last_error: Option<String>,
    tasks: Vec<JoinHandle<()>>,
}

impl LiveSource {
    /// Start streaming from `ws_url` and polling `client`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        ws_url: &str,
        policy: RetryPolicy,
        client: ApiClient,
        history_refresh: Duration,
    ) -> Self {
        let (feed_tx, feed_rx) = mpsc::channel(256);
        let (command_tx, command_rx) = mpsc::channel(4);

        let transport_task =
            tokio::spawn(transport::run(ws_url.to_string(), policy, feed_tx.clone(), command_rx));
        let poll_task = tokio::spawn(api::poll(client, history_refresh, feed_tx));

        Self {
            receiver: feed_rx,
            commands: command_tx,
            description: format!("live: {}", ws_url),
            last_error: None,
            tasks: vec![transport_task, poll_task],
        }
    }
}

impl DataSource for LiveSource {
    fn poll(&mut self) -> Option<Feed> {
        match self.receiver.try_recv() {
            Ok(feed) => Some(feed),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.last_error = Some("Backend tasks stopped".to_string());
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

    fn request_reconnect(&mut self) {
        // A full queue already holds a pending reconnect request.
        if let Err(e) = self.commands.try_send(Command::Reconnect) {
            debug!("reconnect request not queued: {}", e);
        }
    }
}

impl Drop for LiveSource {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ConnectionState;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_live_source_reports_both_tasks() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(&format!("http://{}/api", addr)).unwrap();
        let policy = RetryPolicy {
            max_retries: 0,
            delay: Duration::from_millis(10),
        };
        let url = format!("ws://{}/ws", addr);
        let mut source = LiveSource::spawn(&url, policy, client, Duration::from_secs(30));
        assert!(source.description().starts_with("live: ws://"));

        let mut saw_exhausted = false;
        let mut saw_fetch_failure = false;
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while !(saw_exhausted && saw_fetch_failure) && tokio::time::Instant::now() < deadline {
            match source.poll() {
                Some(Feed::Connection(status)) => {
                    saw_exhausted |=
                        status.state == ConnectionState::Disconnected { exhausted: true };
                }
                Some(Feed::FetchFailed { .. }) => saw_fetch_failure = true,
                Some(_) => {}
                None => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }

        assert!(saw_exhausted);
        assert!(saw_fetch_failure);
        source.request_reconnect();
    }
}
