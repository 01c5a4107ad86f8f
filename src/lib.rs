mod common;
mod features;

pub mod aggregate;
pub mod config;
pub mod data_model;
pub mod error;
pub mod logging;
pub mod probe;
pub mod probe_engine;
pub mod registry;
pub mod render;
pub mod runtime;
pub mod sampler;
pub mod server;
pub mod settings;
pub mod throughput;
pub mod ui;
