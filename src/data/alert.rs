//! Transient alert banner with auto-dismiss and an optional audible cue.

use std::fmt::Debug;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use tracing::debug;

use super::classify::Band;

/// Default time an alert stays visible.
pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(5);

/// Something that can emit a short audible cue.
pub trait Tone: Send + Debug {
    fn play(&mut self) -> io::Result<()>;
}

/// Rings the terminal bell.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl Tone for TerminalBell {
    fn play(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()
    }
}

/// The banner currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub message: String,
    pub severity: Band,
    pub raised_at: Instant,
    dismiss_at: Instant,
}

impl Alert {
    pub fn dismiss_at(&self) -> Instant {
        self.dismiss_at
    }
}

/// Holds at most one banner and its single auto-dismiss deadline.
///
/// Raising a new alert replaces both the banner and the deadline, so an
/// older alert's timer can never hide a newer banner.
#[derive(Debug)]
pub struct AlertSink {
    current: Option<Alert>,
    dismiss_after: Duration,
    tone: Option<Box<dyn Tone>>,
    raised: u64,
}

impl AlertSink {
    pub fn new(dismiss_after: Duration, tone: Option<Box<dyn Tone>>) -> Self {
        Self {
            current: None,
            dismiss_after,
            tone,
            raised: 0,
        }
    }

    /// Show a banner. The tone is best effort and never blocks the banner.
    pub fn raise(&mut self, message: impl Into<String>, severity: Band, now: Instant) {
        self.current = Some(Alert {
            message: message.into(),
            severity,
            raised_at: now,
            dismiss_at: now + self.dismiss_after,
        });
        self.raised += 1;

        if let Some(tone) = self.tone.as_mut() {
            if let Err(e) = tone.play() {
                debug!("alert tone unavailable: {}", e);
            }
        }
    }

    /// Explicit dismissal; cancels the pending auto-dismiss.
    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Expire the banner once its own deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|alert| now >= alert.dismiss_at) {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&Alert> {
        self.current.as_ref()
    }

    /// Total number of alerts raised this session.
    pub fn raised_count(&self) -> u64 {
        self.raised
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct BrokenSpeaker(Arc<AtomicUsize>);

    impl Tone for BrokenSpeaker {
        fn play(&mut self) -> io::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::new(io::ErrorKind::Unsupported, "no audio device"))
        }
    }

    #[test]
    fn test_auto_dismiss_after_deadline() {
        let mut alerts = AlertSink::new(DEFAULT_DISMISS_AFTER, None);
        let start = Instant::now();
        alerts.raise("High stress detected: 140 BPM", Band::Critical, start);

        alerts.tick(start + Duration::from_secs(4));
        assert!(alerts.current().is_some());

        alerts.tick(start + Duration::from_secs(5));
        assert!(alerts.current().is_none());
    }

    #[test]
    fn test_second_alert_outlives_first_timer() {
        let mut alerts = AlertSink::new(DEFAULT_DISMISS_AFTER, None);
        let start = Instant::now();
        alerts.raise("first", Band::Critical, start);
        alerts.raise("second", Band::Critical, start + Duration::from_secs(3));

        // The first alert's deadline passes; the second banner must stay.
        alerts.tick(start + Duration::from_secs(5));
        assert_eq!(alerts.current().map(|a| a.message.as_str()), Some("second"));

        alerts.tick(start + Duration::from_secs(8));
        assert!(alerts.current().is_none());
        assert_eq!(alerts.raised_count(), 2);
    }

    #[test]
    fn test_manual_dismiss() {
        let mut alerts = AlertSink::new(DEFAULT_DISMISS_AFTER, None);
        let start = Instant::now();
        alerts.raise("first", Band::Warning, start);
        alerts.dismiss();
        assert!(alerts.current().is_none());

        alerts.raise("second", Band::Critical, start + Duration::from_secs(4));
        alerts.tick(start + Duration::from_secs(6));
        assert_eq!(alerts.current().map(|a| a.message.as_str()), Some("second"));
    }

    #[test]
    fn test_tone_failure_does_not_block_banner() {
        let plays = Arc::new(AtomicUsize::new(0));
        let mut alerts =
            AlertSink::new(DEFAULT_DISMISS_AFTER, Some(Box::new(BrokenSpeaker(plays.clone()))));
        alerts.raise("Low oxygenation: 90.0%", Band::Critical, Instant::now());

        assert_eq!(plays.load(Ordering::SeqCst), 1);
        assert_eq!(alerts.current().map(|a| a.severity), Some(Band::Critical));
    }
}
