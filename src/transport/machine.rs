//! Reconnection state machine for the streaming connection.
//!
//! ```text
//!   Connecting ──open──▶ Connected
//!       ▲                   │ close / error
//!       │ timer fires       ▼
//!       └────────────── Disconnected ──retries spent──▶ Disconnected (exhausted)
//! ```
//!
//! The machine is pure: it never sleeps or does I/O. The socket driver asks
//! it what to do and sleeps until [`ReconnectMachine::pending_deadline`].

use std::time::{Duration, Instant};

use serde::Serialize;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    Connecting,
    Connected,
    /// `exhausted` means the retry budget is spent and no timer will follow.
    Disconnected { exhausted: bool },
}

/// Snapshot of the connection for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub retry_count: u32,
    pub max_retries: u32,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Human readable status line.
    pub fn describe(&self) -> String {
        match self.state {
            ConnectionState::Connecting if self.retry_count > 0 => {
                format!("Reconnecting... ({}/{})", self.retry_count, self.max_retries)
            }
            ConnectionState::Connecting => "Connecting...".to_string(),
            ConnectionState::Connected => "Connected".to_string(),
            ConnectionState::Disconnected { exhausted: true } => {
                "Disconnected (retries exhausted, press r)".to_string()
            }
            ConnectionState::Disconnected { exhausted: false } => {
                format!("Disconnected, retry {}/{} scheduled", self.retry_count, self.max_retries)
            }
        }
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            state: ConnectionState::Connecting,
            retry_count: 0,
            max_retries: RetryPolicy::default().max_retries,
        }
    }
}

/// Bounded retry with a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 10,
            delay: Duration::from_secs(3),
        }
    }
}

/// Result of reporting a lost connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// A new reconnect timer was armed.
    Scheduled { attempt: u32, delay: Duration },
    /// A timer is already armed; nothing new was scheduled.
    AlreadyPending,
    /// The retry budget is spent; no timer.
    Exhausted,
}

/// The single reconnect timer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReconnectTimer {
    deadline: Instant,
}

/// Owns the connection state, the retry counter and the reconnect timer.
#[derive(Debug, Clone)]
pub struct ReconnectMachine {
    policy: RetryPolicy,
    state: ConnectionState,
    retry_count: u32,
    timer: Option<ReconnectTimer>,
}

impl ReconnectMachine {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            state: ConnectionState::Connecting,
            retry_count: 0,
            timer: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus {
            state: self.state,
            retry_count: self.retry_count,
            max_retries: self.policy.max_retries,
        }
    }

    /// A connection attempt is starting.
    pub fn begin_attempt(&mut self) {
        self.timer = None;
        self.state = ConnectionState::Connecting;
    }

    /// The connection opened. The retry counter resets only here.
    pub fn on_open(&mut self) {
        self.timer = None;
        self.retry_count = 0;
        self.state = ConnectionState::Connected;
    }

    /// The connection closed or failed to open.
    pub fn on_disconnect(&mut self, now: Instant) -> Schedule {
        if self.timer.is_some() {
            return Schedule::AlreadyPending;
        }

        if self.retry_count >= self.policy.max_retries {
            self.state = ConnectionState::Disconnected { exhausted: true };
            return Schedule::Exhausted;
        }

        self.retry_count += 1;
        self.state = ConnectionState::Disconnected { exhausted: false };
        self.timer = Some(ReconnectTimer {
            deadline: now + self.policy.delay,
        });

        Schedule::Scheduled {
            attempt: self.retry_count,
            delay: self.policy.delay,
        }
    }

    /// When the armed reconnect timer fires, if any.
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.timer.map(|t| t.deadline)
    }

    /// Fire the timer if it is due. Returns true when a new attempt should start.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.timer {
            Some(timer) if now >= timer.deadline => {
                self.begin_attempt();
                true
            }
            _ => false,
        }
    }

    /// Manual reconnect: drops any armed timer and starts a new attempt.
    ///
    /// The retry counter is left alone, so a forced attempt after exhaustion
    /// that fails again schedules nothing.
    pub fn reconnect_now(&mut self) {
        self.begin_attempt();
    }
}
