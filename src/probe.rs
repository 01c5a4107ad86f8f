use crate::error::NetworkError;
use std::time::SystemTime;

/// One successful latency probe.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundResult {
    pub target_index: usize,
    pub target_id: String,
    pub round: u64,
    pub latency_ms: u64,
    pub ts: SystemTime,
}

/// A retained latency and the round that measured it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Sample {
    pub round: u64,
    pub latency_ms: u64,
}

/// What a probe worker hands back for one round.
#[derive(Clone, Debug)]
pub struct ProbeReport {
    pub target_index: usize,
    pub round: u64,
    pub result: Result<RoundResult, NetworkError>,
    /// The worker's sample window after this round, oldest first.
    pub window: Vec<Sample>,
}

impl ProbeReport {
    pub fn latency_ms(&self) -> Option<u64> {
        self.result.as_ref().ok().map(|r| r.latency_ms)
    }

    pub fn error(&self) -> Option<&NetworkError> {
        self.result.as_ref().err()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ThroughputResult {
    pub target_id: String,
    pub bytes_received: u64,
    pub elapsed_seconds: f64,
    pub speed_mbps: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransferProgress {
    pub bytes_received: u64,
    pub expected_bytes: Option<u64>,
    pub elapsed_seconds: f64,
    pub speed_mbps: f64,
}

impl TransferProgress {
    /// Completed fraction in `0.0..=1.0`, unknown when the server sent no length.
    pub fn fraction(&self) -> Option<f64> {
        match self.expected_bytes {
            Some(0) => Some(1.0),
            Some(expected) => Some((self.bytes_received as f64 / expected as f64).min(1.0)),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(bytes: u64, expected: Option<u64>) -> TransferProgress {
        TransferProgress {
            bytes_received: bytes,
            expected_bytes: expected,
            elapsed_seconds: 1.0,
            speed_mbps: 0.0,
        }
    }

    #[test]
    fn fraction_requires_declared_length() {
        assert_eq!(progress(50, Some(200)).fraction(), Some(0.25));
        assert_eq!(progress(50, None).fraction(), None);
    }

    #[test]
    fn fraction_is_capped_at_one() {
        assert_eq!(progress(300, Some(200)).fraction(), Some(1.0));
        assert_eq!(progress(0, Some(0)).fraction(), Some(1.0));
    }
}
