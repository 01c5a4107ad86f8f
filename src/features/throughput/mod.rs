mod meter;

pub use meter::{TransferMeter, speed_mbps};

use crate::config::{ColorTag, Target};
use crate::error::ThroughputError;
use crate::probe::{ThroughputResult, TransferProgress};
use tracing::{info, warn};

pub type ThroughputOutcome = Result<ThroughputResult, ThroughputError>;

/// Downloads a bulk payload from one target, reporting progress as it goes.
pub trait BulkDownload {
    fn download(
        &mut self,
        target: &Target,
        size_hint: Option<u64>,
        on_progress: &mut dyn FnMut(&TransferProgress),
    ) -> ThroughputOutcome;
}

#[derive(Clone, Debug, PartialEq)]
pub enum TransferStatus {
    Pending,
    Running(TransferProgress),
    Completed(ThroughputResult),
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct TransferEntry {
    pub title: String,
    pub color: ColorTag,
    pub status: TransferStatus,
}

/// State of a download pass across all targets.
#[derive(Clone, Debug)]
pub struct TransferBoard {
    pub entries: Vec<TransferEntry>,
}

impl TransferBoard {
    pub fn new(targets: &[Target]) -> Self {
        Self {
            entries: targets
                .iter()
                .map(|target| TransferEntry {
                    title: target.id.clone(),
                    color: target.color,
                    status: TransferStatus::Pending,
                })
                .collect(),
        }
    }
}

/// Downloads from each target in turn. Transfers are sequential so they do
/// not compete for the same link.
pub fn run_pass(
    targets: &[Target],
    downloader: &mut dyn BulkDownload,
    size_hint: Option<u64>,
    mut on_update: impl FnMut(&TransferBoard),
) -> Vec<ThroughputOutcome> {
    let mut board = TransferBoard::new(targets);
    let mut outcomes = Vec::with_capacity(targets.len());
    on_update(&board);

    for (index, target) in targets.iter().enumerate() {
        board.entries[index].status = TransferStatus::Running(TransferProgress {
            bytes_received: 0,
            expected_bytes: size_hint,
            elapsed_seconds: 0.0,
            speed_mbps: 0.0,
        });
        on_update(&board);

        let outcome = downloader.download(target, size_hint, &mut |progress| {
            board.entries[index].status = TransferStatus::Running(progress.clone());
            on_update(&board);
        });

        board.entries[index].status = match &outcome {
            Ok(result) => {
                info!(
                    target_title = %target.id,
                    bytes = result.bytes_received,
                    seconds = result.elapsed_seconds,
                    mbps = result.speed_mbps,
                    "download complete"
                );
                TransferStatus::Completed(result.clone())
            }
            Err(err) => {
                warn!(target_title = %target.id, error = %err, "download failed");
                TransferStatus::Failed(err.to_string())
            }
        };
        on_update(&board);
        outcomes.push(outcome);
    }

    outcomes
}
