use super::helpers::{check_status, invalid_address, map_curl_error, parse_content_length};
use crate::common::net::endpoint_url;
use crate::config::{DownloadConfig, Target};
use crate::error::{IncompleteTransferError, NetworkErrorKind, ThroughputError};
use crate::features::throughput::{BulkDownload, TransferMeter};
use crate::probe::{ThroughputResult, TransferProgress};
use curl::Error as CurlError;
use curl::easy::{Easy2, Handler, WriteError};
use std::time::{Duration, Instant};
use tracing::debug;

struct DownloadSink<'a> {
    meter: TransferMeter,
    on_progress: &'a mut dyn FnMut(&TransferProgress),
}

impl Handler for DownloadSink<'_> {
    fn header(&mut self, data: &[u8]) -> bool {
        if data.starts_with(b"HTTP/") {
            self.meter.set_expected(None);
        } else if let Some(length) = parse_content_length(data) {
            self.meter.set_expected(Some(length));
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        if let Some(progress) = self.meter.record(data.len() as u64, Instant::now()) {
            (self.on_progress)(&progress);
        }
        Ok(data.len())
    }
}

/// Bulk download against `GET /data`.
pub struct HttpDownloader {
    config: DownloadConfig,
}

impl HttpDownloader {
    pub fn new(config: DownloadConfig) -> Self {
        Self { config }
    }

    fn configure(&self, easy: &mut Easy2<DownloadSink<'_>>, url: &str) -> Result<(), CurlError> {
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(false)?;
        easy.accept_encoding("identity")?;
        easy.low_speed_limit(1)?;
        easy.low_speed_time(self.config.stall_timeout.max(Duration::from_secs(1)))?;
        Ok(())
    }
}

impl BulkDownload for HttpDownloader {
    fn download(
        &mut self,
        target: &Target,
        size_hint: Option<u64>,
        on_progress: &mut dyn FnMut(&TransferProgress),
    ) -> Result<ThroughputResult, ThroughputError> {
        let mut url = endpoint_url(&target.address, "/data")
            .ok_or_else(|| invalid_address(&target.address))?;
        if let Some(size) = size_hint {
            url.query_pairs_mut().append_pair("size", &size.to_string());
        }

        let started = Instant::now();
        let mut easy = Easy2::new(DownloadSink {
            meter: TransferMeter::new(started, self.config.report_interval),
            on_progress,
        });
        self.configure(&mut easy, url.as_str())
            .map_err(|err| map_curl_error(&err))?;

        let outcome = easy.perform();
        let finished = Instant::now();
        let received = easy.get_ref().meter.bytes_received();
        let expected = easy.get_ref().meter.expected_bytes();
        debug!(target_title = %target.id, received, ?expected, "download finished");

        if let Err(err) = outcome {
            let network = map_curl_error(&err);
            if network.kind != NetworkErrorKind::Timeout
                && let Some(expected) = expected
                && received < expected
            {
                return Err(IncompleteTransferError { received, expected }.into());
            }
            return Err(network.into());
        }

        let status = easy.response_code().map_err(|err| map_curl_error(&err))?;
        check_status(status)?;
        Ok(easy.get_ref().meter.finish(&target.id, finished)?)
    }
}
