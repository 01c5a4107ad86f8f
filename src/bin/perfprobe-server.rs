use anyhow::Context;
use clap::Parser;
use perfprobe::logging::init_logging;
use perfprobe::server::serve;
use perfprobe::settings::server::{ServerArgs, server_config_from_args};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();
    let config = server_config_from_args(&args)?;
    init_logging(
        &args.log_level,
        args.log_dir.as_deref(),
        "perfprobe-server",
        true,
    )
    .context("failed to initialise logging")?;

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    serve(listener, &config, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("shutting down");
    })
    .await
    .context("server error")?;

    Ok(())
}
