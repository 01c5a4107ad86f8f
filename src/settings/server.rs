use super::{SettingsError, require_positive};
use crate::config::DEFAULT_PROBE_PORT;
use crate::server::{DEFAULT_PAYLOAD_SIZE, MAX_PAYLOAD_SIZE, ServerConfig};
use clap::Parser;
use std::net::IpAddr;

#[derive(Parser, Debug)]
#[command(name = "perfprobe-server")]
#[command(about = "Endpoint for perfprobe latency and throughput runs", long_about = None)]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PROBE_PORT)]
    port: u16,

    /// Payload size when a request names none (bytes)
    #[arg(long, default_value_t = DEFAULT_PAYLOAD_SIZE)]
    default_size: u64,

    /// Largest payload served; bigger requests are clamped (bytes)
    #[arg(long, default_value_t = MAX_PAYLOAD_SIZE)]
    max_size: u64,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Directory for daily-rotating log files
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<String>,
}

pub fn server_config_from_args(args: &ServerArgs) -> Result<ServerConfig, SettingsError> {
    require_positive(args.default_size, "--default-size")?;
    require_positive(args.max_size, "--max-size")?;
    if args.default_size > args.max_size {
        return Err(SettingsError::DefaultAboveMax {
            default: args.default_size,
            max: args.max_size,
        });
    }
    Ok(ServerConfig {
        bind: args.bind,
        port: args.port,
        default_size: args.default_size,
        max_size: args.max_size,
    })
}
