use std::time::Duration;
use tracing::debug;

use crate::app::ports::LogSink;
use crate::constants::{COOLDOWN_SECONDS, REQUEST_CEILING};
use crate::domain::{LogEntry, LogLevel};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThrottleLimits {
    /// Remote calls allowed before a forced cooldown
    pub request_ceiling: u32,
    /// Length of every cooldown, counted down a second at a time
    pub cooldown_seconds: u64,
}

impl Default for ThrottleLimits {
    fn default() -> Self {
        Self {
            request_ceiling: REQUEST_CEILING,
            cooldown_seconds: COOLDOWN_SECONDS,
        }
    }
}

/// Counts remote calls since the last cooldown. Owned by a single pipeline
/// run, so no locking.
#[derive(Debug)]
pub struct RequestThrottle {
    limits: ThrottleLimits,
    requests: u32,
}

impl RequestThrottle {
    pub fn new(limits: ThrottleLimits) -> Self {
        Self { limits, requests: 0 }
    }

    #[cfg(test)]
    pub fn requests(&self) -> u32 {
        self.requests
    }

    pub fn record_request(&mut self) {
        self.requests += 1;
    }

    pub fn reset(&mut self) {
        self.requests = 0;
    }

    /// Call before issuing a remote request. Waits out a cooldown when the
    /// ceiling has been reached and returns whether it did.
    pub async fn before_request(&mut self, log: &dyn LogSink) -> bool {
        if self.limits.request_ceiling == 0 || self.requests < self.limits.request_ceiling {
            return false;
        }
        log.emit(LogEntry::new(
            LogLevel::Info,
            format!(
                "⏳ Reached {} requests. Waiting {} seconds to avoid rate limiting...",
                self.requests, self.limits.cooldown_seconds
            ),
        ));
        self.cooldown(log).await;
        self.reset();
        true
    }

    /// Sleep for the configured cooldown, logging a countdown each second.
    pub async fn cooldown(&self, log: &dyn LogSink) {
        debug!(seconds = self.limits.cooldown_seconds, "Starting cooldown");
        for remaining in (1..=self.limits.cooldown_seconds).rev() {
            log.emit(LogEntry::new(
                LogLevel::Info,
                format!("⏳ Retrying in {} seconds...", remaining),
            ));
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        log.emit(LogEntry::new(LogLevel::Info, "🔄 Resuming requests..."));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[derive(Default)]
    struct CollectingLog(Mutex<Vec<LogEntry>>);

    impl LogSink for CollectingLog {
        fn emit(&self, entry: LogEntry) {
            self.0.lock().unwrap().push(entry);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_below_ceiling() {
        let log = CollectingLog::default();
        let mut throttle = RequestThrottle::new(ThrottleLimits::default());
        for _ in 0..59 {
            throttle.record_request();
        }
        let start = Instant::now();
        assert!(!throttle.before_request(&log).await);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(log.0.lock().unwrap().is_empty());
        assert_eq!(throttle.requests(), 59);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_at_ceiling_resets_counter() {
        let log = CollectingLog::default();
        let mut throttle = RequestThrottle::new(ThrottleLimits::default());
        for _ in 0..60 {
            throttle.record_request();
        }
        let start = Instant::now();
        assert!(throttle.before_request(&log).await);
        assert!(start.elapsed() >= Duration::from_secs(60));
        assert_eq!(throttle.requests(), 0);

        let entries = log.0.lock().unwrap();
        assert!(entries[0].message.contains("Reached 60 requests"));
        let countdown = entries
            .iter()
            .filter(|e| e.message.starts_with("⏳ Retrying in"))
            .count();
        assert_eq!(countdown, 60);
        assert_eq!(entries[1].message, "⏳ Retrying in 60 seconds...");
        assert_eq!(entries.last().unwrap().message, "🔄 Resuming requests...");
    }
}
