//! Async WebSocket driver.

use std::time::Instant;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::frame_to_feed;
use super::machine::{ReconnectMachine, RetryPolicy, Schedule};
use crate::source::Feed;

/// Requests from the UI to the transport task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reconnect now, replacing any pending reconnect timer.
    Reconnect,
}

/// How a connected session ended.
enum Session {
    Closed,
    Shutdown,
}

/// Run the streaming connection until the feed or command channel closes.
///
/// Every state transition is published as [`Feed::Connection`]; decoded
/// frames are forwarded in arrival order.
pub async fn run(
    url: String,
    policy: RetryPolicy,
    feed: mpsc::Sender<Feed>,
    mut commands: mpsc::Receiver<Command>,
) {
    let mut machine = ReconnectMachine::new(policy);

    loop {
        machine.begin_attempt();
        if !publish(&feed, &machine).await {
            return;
        }

        info!("connecting to {}", url);
        match tokio_tungstenite::connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                info!("connected to {}", url);
                machine.on_open();
                if !publish(&feed, &machine).await {
                    return;
                }

                let (_write, read) = stream.split();
                if let Session::Shutdown = read_frames(read, &feed, &mut commands).await {
                    return;
                }
                info!("connection to {} closed", url);
            }
            Err(e) => warn!("connection to {} failed: {}", url, e),
        }

        match machine.on_disconnect(Instant::now()) {
            Schedule::Scheduled { attempt, delay } => {
                info!("reconnecting in {:?} ({}/{})", delay, attempt, policy.max_retries);
            }
            Schedule::Exhausted => {
                warn!("maximum reconnect attempts reached; waiting for manual reconnect");
            }
            Schedule::AlreadyPending => {}
        }
        if !publish(&feed, &machine).await {
            return;
        }

        // Sleep on the single timer slot, or until the user forces a reconnect.
        loop {
            match machine.pending_deadline() {
                Some(deadline) => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {
                            if machine.fire_if_due(Instant::now()) {
                                break;
                            }
                        }
                        command = commands.recv() => match command {
                            Some(Command::Reconnect) => {
                                machine.reconnect_now();
                                break;
                            }
                            None => return,
                        },
                    }
                }
                None => match commands.recv().await {
                    Some(Command::Reconnect) => {
                        machine.reconnect_now();
                        break;
                    }
                    None => return,
                },
            }
        }
    }
}

async fn read_frames<S>(
    mut read: S,
    feed: &mpsc::Sender<Feed>,
    commands: &mut mpsc::Receiver<Command>,
) -> Session
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        tokio::select! {
            frame = read.next() => {
                let event = match frame {
                    Some(Ok(Message::Text(text))) => frame_to_feed(text.as_str()),
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => frame_to_feed(text),
                        Err(e) => Feed::Dropped(format!("Invalid UTF-8 frame: {}", e)),
                    },
                    Some(Ok(Message::Close(_))) | None => return Session::Closed,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!("websocket error: {}", e);
                        return Session::Closed;
                    }
                };
                if feed.send(event).await.is_err() {
                    return Session::Shutdown;
                }
            }
            command = commands.recv() => match command {
                Some(Command::Reconnect) => debug!("already connected; ignoring reconnect"),
                None => return Session::Shutdown,
            },
        }
    }
}

async fn publish(feed: &mpsc::Sender<Feed>, machine: &ReconnectMachine) -> bool {
    feed.send(Feed::Connection(machine.status())).await.is_ok()
}
