use super::helpers::{check_status, elapsed_ms, invalid_address, map_curl_error};
use crate::common::net::endpoint_url;
use crate::config::Target;
use crate::error::NetworkError;
use crate::features::sampler::LatencyProbe;
use curl::Error as CurlError;
use curl::easy::{Easy2, Handler, WriteError};
use std::time::{Duration, Instant};

/// Swallows the response body; the probe only cares that it was fully read.
#[derive(Default)]
struct DrainBody {
    bytes: u64,
}

impl Handler for DrainBody {
    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        self.bytes = self.bytes.saturating_add(data.len() as u64);
        Ok(data.len())
    }
}

/// Liveness probe against `GET /ping`, one libcurl handle per target.
pub struct HttpProbe {
    easy: Easy2<DrainBody>,
    reuse_connections: bool,
}

impl HttpProbe {
    pub fn new(reuse_connections: bool) -> Self {
        Self {
            easy: Easy2::new(DrainBody::default()),
            reuse_connections,
        }
    }

    fn configure(&mut self, url: &str, timeout: Duration) -> Result<(), CurlError> {
        self.easy.reset();
        self.easy.get_mut().bytes = 0;
        self.easy.url(url)?;
        self.easy.get(true)?;
        self.easy.follow_location(false)?;
        self.easy.timeout(timeout)?;
        self.easy.fresh_connect(!self.reuse_connections)?;
        self.easy.forbid_reuse(!self.reuse_connections)?;
        Ok(())
    }
}

impl LatencyProbe for HttpProbe {
    fn probe(&mut self, target: &Target, timeout: Duration) -> Result<u64, NetworkError> {
        let url = endpoint_url(&target.address, "/ping")
            .ok_or_else(|| invalid_address(&target.address))?;
        self.configure(url.as_str(), timeout)
            .map_err(|err| map_curl_error(&err))?;

        // perform() returns only after the body has been drained.
        let started = Instant::now();
        let outcome = self.easy.perform();
        let elapsed = started.elapsed();

        outcome.map_err(|err| map_curl_error(&err))?;
        let status = self
            .easy
            .response_code()
            .map_err(|err| map_curl_error(&err))?;
        check_status(status)?;
        Ok(elapsed_ms(elapsed))
    }
}
