//! Streaming transport: the WebSocket connection and its reconnect policy.
//!
//! - [`machine`]: the pure reconnect state machine ([`ReconnectMachine`])
//! - [`socket`]: the async driver that connects, decodes frames and sleeps
//!   on the machine's single reconnect timer

pub mod machine;
pub mod socket;

pub use machine::{ConnectionState, ConnectionStatus, ReconnectMachine, RetryPolicy, Schedule};
pub use socket::{run, Command};

use tracing::debug;

use crate::data::{decode_frame, Payload};
use crate::source::Feed;

/// Decode one text frame into a feed event.
///
/// Malformed or unrecognized frames are dropped (and logged); they never
/// affect the connection state.
pub fn frame_to_feed(text: &str) -> Feed {
    match decode_frame(text) {
        Ok(Payload::Canonical(reading)) | Ok(Payload::Legacy(reading)) => Feed::Reading(reading),
        Ok(Payload::Unrecognized(value)) => {
            debug!("dropping unrecognized frame: {}", value);
            Feed::Dropped("Unrecognized payload".to_string())
        }
        Err(e) => {
            debug!("dropping undecodable frame ({}): {}", e, text.trim());
            Feed::Dropped(format!("Decode error: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_to_feed() {
        assert!(matches!(frame_to_feed(r#"{"spo2": 97}"#), Feed::Reading(_)));
        assert!(matches!(frame_to_feed(r#"{"foo": 1}"#), Feed::Dropped(_)));
        assert!(matches!(frame_to_feed("{"), Feed::Dropped(_)));
    }
}
