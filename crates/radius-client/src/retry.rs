//! Retransmission policy

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the wait grows between retransmissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// Same timeout for every attempt
    #[default]
    Fixed,
    /// Timeout doubles per attempt, capped at `max_timeout_ms`
    Exponential,
}

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retransmissions after the first send
    #[serde(default = "default_max_retries")]
    pub max_retries: u8,
    /// Wait for a response to the first send, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub backoff: Backoff,
    /// Upper bound on any single wait under exponential backoff
    #[serde(default = "default_max_timeout_ms")]
    pub max_timeout_ms: u64,
}

fn default_max_retries() -> u8 {
    3
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_max_timeout_ms() -> u64 {
    30_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: default_max_retries(),
            timeout_ms: default_timeout_ms(),
            backoff: Backoff::default(),
            max_timeout_ms: default_max_timeout_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn fixed(timeout: Duration, max_retries: u8) -> Self {
        RetryPolicy {
            max_retries,
            timeout_ms: timeout.as_millis() as u64,
            backoff: Backoff::Fixed,
            max_timeout_ms: default_max_timeout_ms().max(timeout.as_millis() as u64),
        }
    }

    pub fn exponential(initial: Duration, max: Duration, max_retries: u8) -> Self {
        RetryPolicy {
            max_retries,
            timeout_ms: initial.as_millis() as u64,
            backoff: Backoff::Exponential,
            max_timeout_ms: max.as_millis() as u64,
        }
    }

    /// Total sends, including the first
    pub fn max_attempts(&self) -> u16 {
        u16::from(self.max_retries) + 1
    }

    /// Wait after the send numbered `attempt` (0 = first send)
    pub fn timeout_for_attempt(&self, attempt: u16) -> Duration {
        let millis = match self.backoff {
            Backoff::Fixed => self.timeout_ms,
            Backoff::Exponential => self
                .timeout_ms
                .saturating_mul(1u64 << attempt.min(32))
                .min(self.max_timeout_ms),
        };
        Duration::from_millis(millis)
    }
}
