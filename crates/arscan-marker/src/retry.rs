// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backoff schedule for marker fetch retries.

use std::time::Duration;

use arscan_config::model::FetchConfig;

/// How many times a failed fetch is retried and how long to wait in between.
///
/// The first retry waits `initial_delay`; each later one multiplies the
/// previous delay by `multiplier`, clamped to `max_delay`. A multiplier of
/// 1.0 gives a fixed delay.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(2000),
            max_delay: Duration::from_secs(30),
            multiplier: 1.5,
        }
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: config.retry_delay(),
            max_delay: config.max_retry_delay(),
            multiplier: config.backoff_multiplier,
        }
    }
}

impl RetryPolicy {
    /// Total attempts including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// The delay following `current`, clamped to `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        let next_ms = (current.as_millis() as f64 * self.multiplier) as u64;
        Duration::from_millis(next_ms).min(self.max_delay)
    }

    /// Every delay the policy would sleep, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        let mut delay = self.initial_delay.min(self.max_delay);
        let mut delays = Vec::with_capacity(self.max_retries as usize);
        for _ in 0..self.max_retries {
            delays.push(delay);
            delay = self.next_delay(delay);
        }
        delays
    }
}
