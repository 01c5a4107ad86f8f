use crate::error::IncompleteTransferError;
use crate::probe::{ThroughputResult, TransferProgress};
use std::time::{Duration, Instant};

/// Mebibits per second: `bytes * 8 / (seconds * 2^20)`. Zero when no time elapsed.
pub fn speed_mbps(bytes: u64, elapsed_seconds: f64) -> f64 {
    if elapsed_seconds <= 0.0 {
        return 0.0;
    }
    bytes as f64 * 8.0 / (elapsed_seconds * 1024.0 * 1024.0)
}

/// Counts bytes of one transfer and decides when progress is worth reporting.
#[derive(Clone, Debug)]
pub struct TransferMeter {
    started: Instant,
    report_interval: Duration,
    last_report: Instant,
    bytes: u64,
    expected: Option<u64>,
}

impl TransferMeter {
    pub fn new(started: Instant, report_interval: Duration) -> Self {
        Self {
            started,
            report_interval,
            last_report: started,
            bytes: 0,
            expected: None,
        }
    }

    pub fn set_expected(&mut self, expected: Option<u64>) {
        self.expected = expected;
    }

    pub fn expected_bytes(&self) -> Option<u64> {
        self.expected
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes
    }

    /// Adds a chunk. Returns a progress snapshot only once per reporting
    /// interval of wall time, however many chunks arrive in between.
    pub fn record(&mut self, len: u64, now: Instant) -> Option<TransferProgress> {
        self.bytes = self.bytes.saturating_add(len);
        if now.duration_since(self.last_report) < self.report_interval {
            return None;
        }
        self.last_report = now;
        Some(self.progress(now))
    }

    pub fn progress(&self, now: Instant) -> TransferProgress {
        let elapsed_seconds = now.duration_since(self.started).as_secs_f64();
        TransferProgress {
            bytes_received: self.bytes,
            expected_bytes: self.expected,
            elapsed_seconds,
            speed_mbps: speed_mbps(self.bytes, elapsed_seconds),
        }
    }

    pub fn finish(
        &self,
        target_id: &str,
        now: Instant,
    ) -> Result<ThroughputResult, IncompleteTransferError> {
        if let Some(expected) = self.expected
            && self.bytes < expected
        {
            return Err(IncompleteTransferError {
                received: self.bytes,
                expected,
            });
        }

        let elapsed_seconds = now.duration_since(self.started).as_secs_f64();
        Ok(ThroughputResult {
            target_id: target_id.to_string(),
            bytes_received: self.bytes,
            elapsed_seconds,
            speed_mbps: speed_mbps(self.bytes, elapsed_seconds),
        })
    }
}
