//! Tracing subscriber setup shared by the client and the server.
//!
//! `RUST_LOG` overrides the level passed in. When a log directory is given,
//! records also go to a daily-rotating file named after `file_prefix`.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber. Call once at program start.
///
/// `console` is turned off by the client while the terminal UI owns the
/// screen; the file layer is unaffected.
pub fn init_logging(
    log_level: &str,
    log_dir: Option<&str>,
    file_prefix: &str,
    console: bool,
) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let console_layer = console.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(true)
    });

    let file_layer = log_dir.map(|dir| {
        let file_appender = tracing_appender::rolling::daily(dir, file_prefix);
        fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
}
