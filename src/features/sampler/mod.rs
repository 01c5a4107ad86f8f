mod pool;
mod window;

pub use pool::{LatencySampler, ROUND_GRACE};
pub use window::SampleWindow;

use crate::config::Target;
use crate::error::NetworkError;
use std::time::Duration;

/// One timed request/response round trip against a target's liveness endpoint.
pub trait LatencyProbe: Send {
    fn probe(&mut self, target: &Target, timeout: Duration) -> Result<u64, NetworkError>;
}
