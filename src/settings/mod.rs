use crate::config::{
    AggregateConfig, BucketRounding, ChartConfig, ColorTag, DownloadConfig, MonitorConfig,
    ThroughputMode,
};
use crate::data_model::settings::AppSettings;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub mod server;

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ThroughputArg {
    Off,
    After,
    Only,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum RoundingArg {
    Nearest,
    Ceil,
    Floor,
}

#[derive(Parser, Debug)]
#[command(name = "perfprobe")]
#[command(about = "Live multi-target HTTP latency chart with optional throughput runs", long_about = None)]
pub struct CliArgs {
    /// Target document (JSON list or single object)
    #[arg(short, long, value_name = "PATH")]
    profile: Option<PathBuf>,

    /// Rounds to run before stopping (0 = until stopped)
    #[arg(long, default_value_t = 100)]
    rounds: u64,

    /// Delay between rounds (ms)
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Per-probe timeout (ms), defaults to the interval
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Samples kept per target
    #[arg(long, default_value_t = 30)]
    window: usize,

    /// Chart height in rows
    #[arg(long, default_value_t = 10)]
    height: u16,

    /// Latencies closer than this (ms) are flagged as overlapping
    #[arg(long, default_value_t = 2)]
    overlap_tolerance_ms: u64,

    /// Leave targets with this color out of the chart (repeatable)
    #[arg(long, value_name = "COLOR")]
    exclude_color: Vec<String>,

    /// Latency value treated as a placeholder and never aggregated
    #[arg(long)]
    sentinel_ms: Option<u64>,

    /// Bar height rounding
    #[arg(long, value_enum, default_value = "nearest")]
    rounding: RoundingArg,

    /// Keep connections alive between probes
    #[arg(long)]
    reuse_connections: bool,

    /// Download throughput: off, after the latency run, or only
    #[arg(long, value_enum, default_value = "off")]
    throughput: ThroughputArg,

    /// Also run a throughput pass every N rounds
    #[arg(long, value_name = "ROUNDS")]
    throughput_every: Option<u64>,

    /// Bytes requested per download (server default when omitted)
    #[arg(long, value_name = "BYTES")]
    download_size: Option<u64>,

    /// Print plain text frames instead of the live chart
    #[arg(long)]
    plain: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory for daily-rotating log files
    #[arg(long, value_name = "DIR")]
    log_dir: Option<String>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{flag} must be greater than zero")]
    Zero { flag: &'static str },

    #[error("unknown color `{value}`")]
    UnknownColor { value: String },

    #[error("--default-size ({default}) exceeds --max-size ({max})")]
    DefaultAboveMax { default: u64, max: u64 },
}

pub fn load_from_cli() -> Result<AppSettings, SettingsError> {
    let args = CliArgs::parse();
    from_args(args)
}

pub fn from_args(args: CliArgs) -> Result<AppSettings, SettingsError> {
    require_positive(args.interval_ms, "--interval-ms")?;
    require_positive(args.window as u64, "--window")?;
    require_positive(u64::from(args.height), "--height")?;
    if let Some(timeout) = args.timeout_ms {
        require_positive(timeout, "--timeout-ms")?;
    }
    if let Some(every) = args.throughput_every {
        require_positive(every, "--throughput-every")?;
    }
    if let Some(size) = args.download_size {
        require_positive(size, "--download-size")?;
    }

    let excluded_colors = args
        .exclude_color
        .iter()
        .map(|value| {
            ColorTag::parse(value).ok_or_else(|| SettingsError::UnknownColor {
                value: value.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let interval = Duration::from_millis(args.interval_ms);
    let monitor = MonitorConfig {
        interval,
        probe_timeout: args.timeout_ms.map(Duration::from_millis).unwrap_or(interval),
        window_size: args.window,
        max_rounds: (args.rounds > 0).then_some(args.rounds),
        reuse_connections: args.reuse_connections,
        throughput_every: args.throughput_every,
        chart: ChartConfig {
            height: args.height,
            rounding: match args.rounding {
                RoundingArg::Nearest => BucketRounding::Nearest,
                RoundingArg::Ceil => BucketRounding::Ceil,
                RoundingArg::Floor => BucketRounding::Floor,
            },
            ..ChartConfig::default()
        },
        aggregate: AggregateConfig {
            overlap_tolerance_ms: args.overlap_tolerance_ms,
            sentinel_ms: args.sentinel_ms,
            excluded_colors,
        },
        download: DownloadConfig {
            size_hint: args.download_size,
            ..DownloadConfig::default()
        },
    };

    Ok(AppSettings {
        profile: args.profile,
        monitor,
        throughput: match args.throughput {
            ThroughputArg::Off => ThroughputMode::Off,
            ThroughputArg::After => ThroughputMode::After,
            ThroughputArg::Only => ThroughputMode::Only,
        },
        plain: args.plain,
        log_level: args.log_level,
        log_dir: args.log_dir,
    })
}

pub(crate) fn require_positive(value: u64, flag: &'static str) -> Result<(), SettingsError> {
    if value == 0 {
        return Err(SettingsError::Zero { flag });
    }
    Ok(())
}
