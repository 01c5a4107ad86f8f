use perfprobe::config::{ColorTag, DownloadConfig, Target};
use perfprobe::error::{IncompleteTransferError, NetworkErrorKind, ThroughputError};
use perfprobe::probe_engine::{HttpDownloader, HttpProbe};
use perfprobe::sampler::LatencyProbe;
use perfprobe::server::{ServerConfig, serve};
use perfprobe::throughput::BulkDownload;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener as StdListener};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

struct LoopbackServer {
    addr: SocketAddr,
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl LoopbackServer {
    fn start() -> Self {
        let config = ServerConfig {
            default_size: 64 * 1024,
            max_size: 4 * 1024 * 1024,
            ..ServerConfig::default()
        };
        let (addr_tx, addr_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let join = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .expect("runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind");
                addr_tx
                    .send(listener.local_addr().expect("local addr"))
                    .expect("send addr");
                serve(listener, &config, async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("serve");
            });
        });

        let addr = addr_rx
            .recv_timeout(Duration::from_secs(10))
            .expect("server address");
        Self {
            addr,
            shutdown: Some(shutdown_tx),
            join: Some(join),
        }
    }

    fn target(&self) -> Target {
        Target::new("loopback", self.addr.to_string(), ColorTag::Cyan)
    }
}

impl Drop for LoopbackServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Answers a single request with `head` followed by `body_len` bytes, then
/// closes the connection.
fn canned_response(head: &'static str, body_len: usize) -> (Target, thread::JoinHandle<()>) {
    let listener = StdListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let join = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut request = [0u8; 1024];
        let _ = stream.read(&mut request);
        stream.write_all(head.as_bytes()).expect("head");
        stream.write_all(&vec![b'x'; body_len]).expect("body");
        stream.flush().expect("flush");
    });
    (Target::new("canned", addr.to_string(), ColorTag::Yellow), join)
}

fn closed_port() -> SocketAddr {
    let listener = StdListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("local addr")
}

#[test]
fn ping_measures_latency() {
    let server = LoopbackServer::start();
    let mut probe = HttpProbe::new(false);

    let first = probe
        .probe(&server.target(), Duration::from_secs(5))
        .expect("ping");
    let second = probe
        .probe(&server.target(), Duration::from_secs(5))
        .expect("ping again");
    assert!(first < 5_000);
    assert!(second < 5_000);
}

#[test]
fn reused_connections_still_probe() {
    let server = LoopbackServer::start();
    let mut probe = HttpProbe::new(true);
    for _ in 0..3 {
        probe
            .probe(&server.target(), Duration::from_secs(5))
            .expect("ping");
    }
}

#[test]
fn closed_port_is_refused() {
    let addr = closed_port();
    let target = Target::new("gone", addr.to_string(), ColorTag::Red);
    let err = HttpProbe::new(false)
        .probe(&target, Duration::from_secs(5))
        .expect_err("nothing listens there");
    assert_eq!(err.kind, NetworkErrorKind::ConnectionRefused);
}

#[test]
fn download_reports_progress_and_totals() {
    let server = LoopbackServer::start();
    let mut downloader = HttpDownloader::new(DownloadConfig {
        report_interval: Duration::ZERO,
        ..DownloadConfig::default()
    });
    let mut updates = 0usize;

    let result = downloader
        .download(&server.target(), Some(1024 * 1024), &mut |progress| {
            updates += 1;
            assert_eq!(progress.expected_bytes, Some(1024 * 1024));
        })
        .expect("download");

    assert_eq!(result.target_id, "loopback");
    assert_eq!(result.bytes_received, 1024 * 1024);
    assert!(result.speed_mbps > 0.0);
    assert!(updates > 0);
}

#[test]
fn download_uses_server_default_and_clamp() {
    let server = LoopbackServer::start();
    let mut downloader = HttpDownloader::new(DownloadConfig::default());

    let default = downloader
        .download(&server.target(), None, &mut |_| {})
        .expect("default download");
    assert_eq!(default.bytes_received, 64 * 1024);

    let clamped = downloader
        .download(&server.target(), Some(64 * 1024 * 1024), &mut |_| {})
        .expect("clamped download");
    assert_eq!(clamped.bytes_received, 4 * 1024 * 1024);
}

#[test]
fn download_from_closed_port_fails() {
    let addr = closed_port();
    let target = Target::new("gone", addr.to_string(), ColorTag::Red);
    let err = HttpDownloader::new(DownloadConfig::default())
        .download(&target, Some(1024), &mut |_| {})
        .expect_err("nothing listens there");
    match err {
        ThroughputError::Network(network) => {
            assert_eq!(network.kind, NetworkErrorKind::ConnectionRefused)
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn download_cut_short_of_content_length_is_incomplete() {
    let (target, server) = canned_response(
        "HTTP/1.1 200 OK\r\nContent-Length: 1000\r\nConnection: close\r\n\r\n",
        400,
    );
    let err = HttpDownloader::new(DownloadConfig::default())
        .download(&target, None, &mut |_| {})
        .expect_err("body ends early");
    server.join().expect("canned server");

    match err {
        ThroughputError::Incomplete(IncompleteTransferError { received, expected }) => {
            assert_eq!(received, 400);
            assert_eq!(expected, 1000);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn download_without_content_length_reports_bytes_only() {
    let (target, server) = canned_response(
        "HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n",
        5000,
    );
    let mut downloader = HttpDownloader::new(DownloadConfig {
        report_interval: Duration::ZERO,
        ..DownloadConfig::default()
    });
    let mut updates = 0usize;

    let result = downloader
        .download(&target, None, &mut |progress| {
            updates += 1;
            assert_eq!(progress.expected_bytes, None);
            assert_eq!(progress.fraction(), None);
        })
        .expect("download");
    server.join().expect("canned server");

    assert_eq!(result.bytes_received, 5000);
    assert!(updates > 0);
}
