use crate::config::{MonitorConfig, ThroughputMode};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Explicit `--profile`; `None` falls back to the default lookup.
    pub profile: Option<PathBuf>,
    pub monitor: MonitorConfig,
    pub throughput: ThroughputMode,
    pub plain: bool,
    pub log_level: String,
    pub log_dir: Option<String>,
}
