use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Port used when a target address does not name one.
pub const DEFAULT_PROBE_PORT: u16 = 3000;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    #[default]
    Green,
    Red,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Orange,
    Gray,
}

impl ColorTag {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "green" => Some(ColorTag::Green),
            "red" => Some(ColorTag::Red),
            "yellow" => Some(ColorTag::Yellow),
            "blue" => Some(ColorTag::Blue),
            "magenta" => Some(ColorTag::Magenta),
            "cyan" => Some(ColorTag::Cyan),
            "white" => Some(ColorTag::White),
            "orange" => Some(ColorTag::Orange),
            "gray" | "grey" => Some(ColorTag::Gray),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorTag::Green => "green",
            ColorTag::Red => "red",
            ColorTag::Yellow => "yellow",
            ColorTag::Blue => "blue",
            ColorTag::Magenta => "magenta",
            ColorTag::Cyan => "cyan",
            ColorTag::White => "white",
            ColorTag::Orange => "orange",
            ColorTag::Gray => "gray",
        }
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A server under measurement. Built once by the registry and never mutated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Target {
    pub id: String,
    pub address: String,
    pub color: ColorTag,
}

impl Target {
    pub fn new(id: impl Into<String>, address: impl Into<String>, color: ColorTag) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            color,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BucketRounding {
    #[default]
    Nearest,
    Ceil,
    Floor,
}

impl BucketRounding {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            BucketRounding::Nearest => value.round(),
            BucketRounding::Ceil => value.ceil(),
            BucketRounding::Floor => value.floor(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChartConfig {
    pub height: u16,
    pub progress_width: u16,
    pub rounding: BucketRounding,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            height: 10,
            progress_width: 50,
            rounding: BucketRounding::Nearest,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AggregateConfig {
    /// Two values overlap when their difference is strictly below this.
    pub overlap_tolerance_ms: u64,
    /// Samples equal to this value are placeholders and never aggregated.
    pub sentinel_ms: Option<u64>,
    /// Targets with these colors are left out of scaling, bars and overlap.
    pub excluded_colors: Vec<ColorTag>,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            overlap_tolerance_ms: 2,
            sentinel_ms: None,
            excluded_colors: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DownloadConfig {
    pub size_hint: Option<u64>,
    pub report_interval: Duration,
    pub stall_timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            size_hint: None,
            report_interval: Duration::from_millis(100),
            stall_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ThroughputMode {
    #[default]
    Off,
    After,
    Only,
}

#[derive(Clone, Debug)]
pub struct MonitorConfig {
    pub interval: Duration,
    pub probe_timeout: Duration,
    pub window_size: usize,
    pub max_rounds: Option<u64>,
    pub reuse_connections: bool,
    pub throughput_every: Option<u64>,
    pub chart: ChartConfig,
    pub aggregate: AggregateConfig,
    pub download: DownloadConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            probe_timeout: Duration::from_secs(1),
            window_size: 30,
            max_rounds: Some(100),
            reuse_connections: false,
            throughput_every: None,
            chart: ChartConfig::default(),
            aggregate: AggregateConfig::default(),
            download: DownloadConfig::default(),
        }
    }
}
