use super::{LatencyProbe, SampleWindow};
use crate::common::time::{Clock, SystemClock};
use crate::config::Target;
use crate::error::{NetworkError, NetworkErrorKind};
use crate::probe::{ProbeReport, RoundResult, Sample};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Extra time a round waits past the probe timeout before giving up on a worker.
pub const ROUND_GRACE: Duration = Duration::from_secs(2);

#[derive(Clone, Debug)]
enum WorkerCommand {
    Probe { round: u64, timeout: Duration },
    Stop,
}

struct Lane {
    sender: Sender<WorkerCommand>,
    join: Option<JoinHandle<()>>,
    window: Vec<Sample>,
}

/// Fans a round out to one worker thread per target and joins on the reports.
pub struct LatencySampler {
    targets: Vec<Target>,
    lanes: Vec<Lane>,
    report_rx: Receiver<ProbeReport>,
}

impl LatencySampler {
    pub fn spawn<F>(targets: &[Target], window_size: usize, make_probe: F) -> Self
    where
        F: FnMut(&Target) -> Box<dyn LatencyProbe>,
    {
        Self::spawn_with_clock(targets, window_size, Arc::new(SystemClock), make_probe)
    }

    pub fn spawn_with_clock<F>(
        targets: &[Target],
        window_size: usize,
        clock: Arc<dyn Clock>,
        mut make_probe: F,
    ) -> Self
    where
        F: FnMut(&Target) -> Box<dyn LatencyProbe>,
    {
        let (report_tx, report_rx) = crossbeam_channel::unbounded();
        let lanes = targets
            .iter()
            .enumerate()
            .map(|(index, target)| {
                let (tx, rx) = crossbeam_channel::unbounded();
                let worker = Worker {
                    index,
                    target: target.clone(),
                    probe: make_probe(target),
                    window: SampleWindow::new(window_size),
                    clock: Arc::clone(&clock),
                };
                let report_tx = report_tx.clone();
                let join = thread::Builder::new()
                    .name(format!("probe-{index}"))
                    .spawn(move || worker.run(rx, report_tx))
                    .ok();
                if join.is_none() {
                    warn!(target_title = %target.id, "failed to spawn probe worker");
                }
                Lane {
                    sender: tx,
                    join,
                    window: Vec::new(),
                }
            })
            .collect();

        Self {
            targets: targets.to_vec(),
            lanes,
            report_rx,
        }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Latest window snapshot per target, in target order.
    pub fn windows(&self) -> impl Iterator<Item = &[Sample]> {
        self.lanes.iter().map(|lane| lane.window.as_slice())
    }

    /// Probes every target concurrently and returns once each has reported,
    /// ordered by target index.
    pub fn run_round(&mut self, round: u64, timeout: Duration) -> Vec<ProbeReport> {
        let mut slots: Vec<Option<ProbeReport>> = vec![None; self.lanes.len()];
        let mut pending = 0usize;

        for (index, lane) in self.lanes.iter().enumerate() {
            let sent = lane.join.is_some()
                && lane
                    .sender
                    .send(WorkerCommand::Probe { round, timeout })
                    .is_ok();
            if sent {
                pending += 1;
            } else {
                slots[index] = Some(self.missing_report(index, round, "probe worker is not running"));
            }
        }

        let deadline = Instant::now() + timeout + ROUND_GRACE;
        while pending > 0 {
            match self.report_rx.recv_deadline(deadline) {
                Ok(report) if report.round == round && slots[report.target_index].is_none() => {
                    let index = report.target_index;
                    slots[index] = Some(report);
                    pending -= 1;
                }
                Ok(stale) => {
                    debug!(round = stale.round, current = round, "discarding stale report");
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let mut reports = Vec::with_capacity(slots.len());
        for (index, slot) in slots.into_iter().enumerate() {
            let report = match slot {
                Some(report) => report,
                None => self.missing_report(index, round, "no report before the round deadline"),
            };
            self.lanes[index].window.clone_from(&report.window);
            reports.push(report);
        }
        reports
    }

    fn missing_report(&self, index: usize, round: u64, reason: &str) -> ProbeReport {
        let kind = if self.lanes[index].join.is_some() {
            NetworkErrorKind::Timeout
        } else {
            NetworkErrorKind::Other
        };
        ProbeReport {
            target_index: index,
            round,
            result: Err(NetworkError::new(kind, reason)),
            window: self.lanes[index].window.clone(),
        }
    }

    pub fn shutdown(&mut self) {
        for lane in &self.lanes {
            let _ = lane.sender.send(WorkerCommand::Stop);
        }
        for lane in self.lanes.iter_mut() {
            if let Some(join) = lane.join.take() {
                let _ = join.join();
            }
        }
    }
}

impl Drop for LatencySampler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Worker {
    index: usize,
    target: Target,
    probe: Box<dyn LatencyProbe>,
    window: SampleWindow,
    clock: Arc<dyn Clock>,
}

impl Worker {
    fn run(mut self, control_rx: Receiver<WorkerCommand>, report_tx: Sender<ProbeReport>) {
        while let Ok(command) = control_rx.recv() {
            match command {
                WorkerCommand::Probe { round, timeout } => {
                    let report = self.probe_once(round, timeout);
                    if report_tx.send(report).is_err() {
                        break;
                    }
                }
                WorkerCommand::Stop => break,
            }
        }
    }

    fn probe_once(&mut self, round: u64, timeout: Duration) -> ProbeReport {
        let ts = self.clock.now();
        let result = match self.probe.probe(&self.target, timeout) {
            Ok(latency_ms) => {
                self.window.record(round, latency_ms);
                debug!(target_title = %self.target.id, round, latency_ms, "probe ok");
                Ok(RoundResult {
                    target_index: self.index,
                    target_id: self.target.id.clone(),
                    round,
                    latency_ms,
                    ts,
                })
            }
            Err(err) => {
                warn!(target_title = %self.target.id, round, error = %err, "probe failed");
                Err(err)
            }
        };

        ProbeReport {
            target_index: self.index,
            round,
            result,
            window: self.window.to_vec(),
        }
    }
}
