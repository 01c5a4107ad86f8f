pub mod metrics;
pub mod probe;
pub mod registry;
pub mod render;
pub mod sampler;
pub mod throughput;
pub mod ui;
