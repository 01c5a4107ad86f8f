pub use crate::features::throughput::{
    BulkDownload, ThroughputOutcome, TransferBoard, TransferEntry, TransferMeter, TransferStatus,
    run_pass, speed_mbps,
};
