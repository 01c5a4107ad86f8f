use crate::probe::Sample;
use std::collections::VecDeque;

/// Rolling latency history for one target, oldest first. Failed rounds
/// record nothing, so each sample keeps the round it came from.
#[derive(Clone, Debug)]
pub struct SampleWindow {
    capacity: usize,
    samples: VecDeque<Sample>,
}

impl SampleWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, round: u64, latency_ms: u64) {
        self.samples.push_back(Sample { round, latency_ms });
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<u64> {
        self.samples.back().map(|sample| sample.latency_ms)
    }

    pub fn latencies(&self) -> impl Iterator<Item = u64> + '_ {
        self.samples.iter().map(|sample| sample.latency_ms)
    }

    pub fn to_vec(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }
}
