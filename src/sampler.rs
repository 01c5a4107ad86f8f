pub use crate::features::sampler::{LatencyProbe, LatencySampler, ROUND_GRACE, SampleWindow};
