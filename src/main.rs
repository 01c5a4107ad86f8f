use anyhow::Context;
use perfprobe::config::{Target, ThroughputMode};
use perfprobe::data_model::settings::AppSettings;
use perfprobe::logging::init_logging;
use perfprobe::probe_engine::{HttpDownloader, HttpProbe};
use perfprobe::registry::{self, resolve_profile_path};
use perfprobe::runtime::{FrameSink, LoopState, Monitor, RoundProgress, StopSignal};
use perfprobe::sampler::{LatencyProbe, LatencySampler};
use perfprobe::settings::load_from_cli;
use perfprobe::throughput;
use perfprobe::ui::{Display, spawn_key_listener};
use std::io::{self, IsTerminal};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let settings = load_from_cli()?;

    let owns_screen = !settings.plain && io::stdout().is_terminal();
    init_logging(
        &settings.log_level,
        settings.log_dir.as_deref(),
        "perfprobe",
        !owns_screen,
    )
    .context("failed to initialise logging")?;

    let profile = resolve_profile_path(settings.profile.clone());
    let targets = registry::load(&profile)
        .with_context(|| format!("failed to load targets from {}", profile.display()))?;
    info!(
        targets = targets.len(),
        profile = %profile.display(),
        "targets loaded"
    );

    let stop = StopSignal::new();
    let mut display = Display::open(settings.monitor.chart.clone(), settings.plain);
    let listener = if display.is_interactive() || io::stdin().is_terminal() {
        spawn_key_listener(stop.clone())
    } else {
        None
    };

    run(&settings, &targets, &stop, &mut display);

    stop.stop();
    if let Some(handle) = listener {
        let _ = handle.join();
    }
    if let Some(frame) = display.finish() {
        print!("{frame}");
    }
    Ok(())
}

fn run(settings: &AppSettings, targets: &[Target], stop: &StopSignal, display: &mut Display) {
    let config = &settings.monitor;

    if settings.throughput == ThroughputMode::Only {
        let mut downloader = HttpDownloader::new(config.download.clone());
        throughput::run_pass(targets, &mut downloader, config.download.size_hint, |board| {
            display.show_transfer(board)
        });
        return;
    }

    let reuse = config.reuse_connections;
    let sampler = LatencySampler::spawn(targets, config.window_size, |_| -> Box<dyn LatencyProbe> {
        Box::new(HttpProbe::new(reuse))
    });
    let mut monitor = Monitor::new(sampler, config.clone());
    if settings.throughput == ThroughputMode::After || config.throughput_every.is_some() {
        monitor = monitor.with_downloader(Box::new(HttpDownloader::new(config.download.clone())));
    }

    let summary = monitor.run(stop, display);
    for target in &summary.targets {
        info!(
            target_title = %target.title,
            samples = target.stats.count,
            mean_ms = target.stats.mean,
            "final window"
        );
    }

    if settings.throughput == ThroughputMode::After {
        monitor.run_throughput(display);
        display.show_chart(
            &monitor.chart_state(),
            &RoundProgress {
                round: monitor.rounds(),
                max_rounds: config.max_rounds,
                state: LoopState::Done,
            },
        );
    }
}
