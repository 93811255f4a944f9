//! Client for the backend's request/response endpoints.
//!
//! - `GET {base}/sensores/ultimo`: the latest reading
//! - `GET {base}/sensores`: historical records
//!
//! [`poll`] runs the periodic refresh and reports every outcome as a
//! [`Feed`] event; failures are logged and never stop the loop.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::data::{parse_payload, parse_records, HistoricalRecord, Payload, Reading};
use crate::error::ApiError;
use crate::source::{Feed, FetchTarget};

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch and normalize the latest reading.
    pub async fn fetch_latest(&self) -> Result<Reading, ApiError> {
        let body = self.get_json("sensores/ultimo").await?;
        match parse_payload(&body) {
            Payload::Canonical(reading) | Payload::Legacy(reading) => Ok(reading),
            Payload::Unrecognized(_) => {
                Err(ApiError::Parse("unrecognized reading payload".to_string()))
            }
        }
    }

    /// Fetch historical records in the order the backend returns them.
    pub async fn fetch_history(&self) -> Result<Vec<HistoricalRecord>, ApiError> {
        let body = self.get_json("sensores").await?;
        Ok(parse_records(&body))
    }

    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::Status(response.status().as_u16()));
        }

        response.json::<Value>().await.map_err(|e| ApiError::Parse(e.to_string()))
    }
}

/// Fetch the latest reading once, then refresh history every `interval`.
///
/// Returns when the feed receiver is dropped.
pub async fn poll(client: ApiClient, interval: Duration, feed: mpsc::Sender<Feed>) {
    let latest = match client.fetch_latest().await {
        Ok(reading) => Feed::Latest(reading),
        Err(e) => {
            warn!("failed to fetch latest reading: {}", e);
            Feed::FetchFailed {
                target: FetchTarget::Latest,
                message: e.to_string(),
            }
        }
    };
    if feed.send(latest).await.is_err() {
        return;
    }

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let event = match client.fetch_history().await {
            Ok(records) => {
                debug!("fetched {} historical records", records.len());
                Feed::History(records)
            }
            Err(e) => {
                warn!("failed to load historical data: {}", e);
                Feed::FetchFailed {
                    target: FetchTarget::History,
                    message: e.to_string(),
                }
            }
        };

        if feed.send(event).await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response per accepted connection.
    async fn serve(responses: Vec<(&'static str, String)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let reply = format!(
                    concat!(
                        "HTTP/1.1 {}\r\n",
                        "content-type: application/json\r\n",
                        "content-length: {}\r\n",
                        "connection: close\r\n\r\n{}"
                    ),
                    status,
                    body.len(),
                    body
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}/api/", addr)
    }

    #[tokio::test]
    async fn test_fetch_latest_normalizes() {
        let base = serve(vec![(
            "200 OK",
            r#"{"data":{"frecuenciaCardiaca":99,"lat":1.0,"lon":2.0}}"#.to_string(),
        )])
        .await;
        let client = ApiClient::new(&base).unwrap();
        assert!(client.base_url().ends_with("/api"));

        let reading = client.fetch_latest().await.unwrap();
        assert_eq!(reading.heart_rate, Some(99.0));
        assert_eq!(reading.gps.and_then(|g| g.fix()), Some((1.0, 2.0)));
    }

    #[tokio::test]
    async fn test_fetch_history_and_status_errors() {
        let base = serve(vec![
            ("200 OK", r#"{"records":[{"idUsuario":"a"},{"idUsuario":"b"}]}"#.to_string()),
            ("500 Internal Server Error", "{}".to_string()),
        ])
        .await;
        let client = ApiClient::new(&base).unwrap();

        let records = client.fetch_history().await.unwrap();
        assert_eq!(records.len(), 2);

        let err = client.fetch_history().await.unwrap_err();
        assert!(matches!(err, ApiError::Status(500)), "{:?}", err);
    }

    #[tokio::test]
    async fn test_poll_reports_failures_without_stopping() {
        // Nothing listens on this port once the listener is dropped.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/api", listener.local_addr().unwrap());
        drop(listener);

        let client = ApiClient::new(&base).unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        let handle = tokio::spawn(poll(client, Duration::from_millis(20), tx));

        let first = rx.recv().await.unwrap();
        assert!(matches!(
            first,
            Feed::FetchFailed {
                target: FetchTarget::Latest,
                ..
            }
        ));
        for _ in 0..2 {
            let next = rx.recv().await.unwrap();
            assert!(matches!(
                next,
                Feed::FetchFailed {
                    target: FetchTarget::History,
                    ..
                }
            ));
        }

        drop(rx);
        handle.abort();
    }
}
