use crate::config::MonitorConfig;
use crate::error::NetworkError;
use crate::features::metrics::aggregate::{project, window_stats};
use crate::features::metrics::{ChartState, RoundSpan, SeriesInput, WindowStats};
use crate::features::sampler::LatencySampler;
use crate::features::throughput::{self, BulkDownload, ThroughputOutcome, TransferBoard};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Cloneable cancellation token shared by the loop, the key listener and
/// anything else that may ask the monitor to wind down.
#[derive(Clone, Debug)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = crossbeam_channel::bounded(1);
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            wake_tx,
            wake_rx,
        }
    }

    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            let _ = self.wake_tx.try_send(());
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Sleeps up to `timeout`; returns `true` when woken by a stop.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.is_stopped() {
            return true;
        }
        match self.wake_rx.recv_timeout(timeout) {
            Ok(()) => {
                // Leave the token for any other waiter.
                let _ = self.wake_tx.try_send(());
                true
            }
            Err(_) => self.is_stopped(),
        }
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoopState {
    Running,
    Stopping,
    Done,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoopEvent {
    StopRequested,
    RoundCapReached,
    RoundCompleted,
}

impl LoopState {
    pub fn next(self, event: LoopEvent) -> LoopState {
        match (self, event) {
            (LoopState::Running, LoopEvent::StopRequested | LoopEvent::RoundCapReached) => {
                LoopState::Stopping
            }
            (LoopState::Stopping, LoopEvent::RoundCompleted) => LoopState::Done,
            (state, _) => state,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RoundProgress {
    pub round: u64,
    pub max_rounds: Option<u64>,
    pub state: LoopState,
}

impl RoundProgress {
    /// Completed share of a bounded run; `None` when unbounded.
    pub fn fraction(&self) -> Option<f64> {
        match self.max_rounds {
            Some(0) => Some(1.0),
            Some(max) => Some((self.round as f64 / max as f64).min(1.0)),
            None => None,
        }
    }
}

/// Where the monitor sends each frame.
pub trait FrameSink {
    fn show_chart(&mut self, chart: &ChartState, progress: &RoundProgress);
    fn show_transfer(&mut self, board: &TransferBoard);
}

#[derive(Clone, Debug)]
pub struct TargetSummary {
    pub title: String,
    pub stats: WindowStats,
    pub throughput: Option<ThroughputOutcome>,
}

#[derive(Clone, Debug)]
pub struct MonitorSummary {
    pub rounds: u64,
    pub targets: Vec<TargetSummary>,
}

/// Drives rounds until the cap or a stop request, rendering after each.
pub struct Monitor {
    config: MonitorConfig,
    sampler: LatencySampler,
    downloader: Option<Box<dyn BulkDownload>>,
    last_errors: Vec<Option<NetworkError>>,
    throughput: Vec<Option<ThroughputOutcome>>,
    rounds: u64,
}

impl Monitor {
    pub fn new(sampler: LatencySampler, config: MonitorConfig) -> Self {
        let count = sampler.targets().len();
        Self {
            config,
            sampler,
            downloader: None,
            last_errors: vec![None; count],
            throughput: vec![None; count],
            rounds: 0,
        }
    }

    pub fn with_downloader(mut self, downloader: Box<dyn BulkDownload>) -> Self {
        self.downloader = Some(downloader);
        self
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    pub fn run(&mut self, stop: &StopSignal, sink: &mut dyn FrameSink) -> MonitorSummary {
        let mut state = LoopState::Running;
        info!(
            targets = self.sampler.targets().len(),
            max_rounds = ?self.config.max_rounds,
            "monitor started"
        );
        sink.show_chart(&self.chart_state(), &self.progress(state));

        while state != LoopState::Done {
            state = match state {
                LoopState::Running => self.tick(stop, sink),
                LoopState::Stopping => state.next(LoopEvent::RoundCompleted),
                LoopState::Done => state,
            };
        }

        sink.show_chart(&self.chart_state(), &self.progress(state));
        info!(rounds = self.rounds, "monitor finished");
        self.summary()
    }

    fn tick(&mut self, stop: &StopSignal, sink: &mut dyn FrameSink) -> LoopState {
        let state = LoopState::Running;
        if stop.is_stopped() {
            return state.next(LoopEvent::StopRequested);
        }
        if self.cap_reached() {
            return state.next(LoopEvent::RoundCapReached);
        }

        let round = self.rounds + 1;
        let reports = self.sampler.run_round(round, self.config.probe_timeout);
        for report in reports {
            self.last_errors[report.target_index] = report.error().cloned();
        }
        self.rounds = round;
        debug!(round, "round complete");

        if self
            .config
            .throughput_every
            .is_some_and(|every| every > 0 && round % every == 0)
        {
            self.run_throughput(sink);
        }

        let state = if self.cap_reached() {
            state.next(LoopEvent::RoundCapReached)
        } else if stop.is_stopped() {
            state.next(LoopEvent::StopRequested)
        } else {
            state
        };
        sink.show_chart(&self.chart_state(), &self.progress(state));

        if state == LoopState::Running && stop.wait_timeout(self.config.interval) {
            return state.next(LoopEvent::StopRequested);
        }
        state
    }

    /// Runs one download pass over every target; no-op without a downloader.
    pub fn run_throughput(&mut self, sink: &mut dyn FrameSink) -> Vec<ThroughputOutcome> {
        let Some(downloader) = self.downloader.as_mut() else {
            return Vec::new();
        };
        info!("throughput pass started");
        let outcomes = throughput::run_pass(
            self.sampler.targets(),
            &mut **downloader,
            self.config.download.size_hint,
            |board| sink.show_transfer(board),
        );
        for (slot, outcome) in self.throughput.iter_mut().zip(&outcomes) {
            *slot = Some(outcome.clone());
        }
        outcomes
    }

    pub fn chart_state(&self) -> ChartState {
        let inputs: Vec<SeriesInput<'_>> = self
            .sampler
            .targets()
            .iter()
            .zip(self.sampler.windows())
            .enumerate()
            .map(|(index, (target, samples))| SeriesInput {
                target,
                samples,
                last_error: self.last_errors[index].as_ref(),
                throughput: self.throughput[index].as_ref(),
            })
            .collect();
        project(
            &inputs,
            RoundSpan::new(self.rounds, self.config.window_size),
            &self.config.aggregate,
            &self.config.chart,
        )
    }

    pub fn summary(&self) -> MonitorSummary {
        let sentinel = self.config.aggregate.sentinel_ms;
        let targets = self
            .sampler
            .targets()
            .iter()
            .zip(self.sampler.windows())
            .zip(&self.throughput)
            .map(|((target, samples), throughput)| TargetSummary {
                title: target.id.clone(),
                stats: window_stats(samples.iter().map(|s| s.latency_ms), sentinel),
                throughput: throughput.clone(),
            })
            .collect();
        MonitorSummary {
            rounds: self.rounds,
            targets,
        }
    }

    fn cap_reached(&self) -> bool {
        self.config.max_rounds.is_some_and(|max| self.rounds >= max)
    }

    fn progress(&self, state: LoopState) -> RoundProgress {
        RoundProgress {
            round: self.rounds,
            max_rounds: self.config.max_rounds,
            state,
        }
    }
}
