//! curl-backed implementations of the latency probe and bulk download.

pub use crate::features::probe::engine::{HttpDownloader, HttpProbe};
