//! HTTP endpoint the client measures against: a liveness route and a bulk
//! payload route streamed from one pre-generated random block.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use rand::RngCore;
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

pub const DEFAULT_PAYLOAD_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_PAYLOAD_SIZE: u64 = 1024 * 1024 * 1024;
const BLOCK_SIZE: usize = 64 * 1024;

const BANNER: &str = "perfprobe server\n\n\
GET /ping               liveness, answers `pong`\n\
GET /data?size=<bytes>  bulk payload for throughput runs\n";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub default_size: u64,
    pub max_size: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: crate::config::DEFAULT_PROBE_PORT,
            default_size: DEFAULT_PAYLOAD_SIZE,
            max_size: MAX_PAYLOAD_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SizeRequest {
    Default,
    Bytes(u64),
    Invalid(String),
}

/// Reads the `size` query value. Missing or non-numeric values fall back to
/// the server default; numbers at or below zero are rejected.
pub fn parse_size(raw: Option<&str>) -> SizeRequest {
    let Some(raw) = raw.map(str::trim) else {
        return SizeRequest::Default;
    };
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return SizeRequest::Default;
    }
    if negative {
        return SizeRequest::Invalid(format!("size must be a positive byte count, got {raw}"));
    }
    match digits.parse::<u64>() {
        Ok(0) => SizeRequest::Invalid("size must be a positive byte count, got 0".to_string()),
        Ok(size) => SizeRequest::Bytes(size),
        Err(_) => SizeRequest::Bytes(u64::MAX),
    }
}

#[derive(Clone)]
struct AppState {
    block: Bytes,
    default_size: u64,
    max_size: u64,
}

pub fn router(config: &ServerConfig) -> Router {
    let mut block = vec![0u8; BLOCK_SIZE];
    rand::thread_rng().fill_bytes(&mut block);

    let state = AppState {
        block: Bytes::from(block),
        default_size: config.default_size,
        max_size: config.max_size,
    };

    Router::new()
        .route("/", get(index))
        .route("/ping", get(ping))
        .route("/data", get(data))
        .fallback(not_found)
        .with_state(state)
}

/// Serves until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, config: &ServerConfig, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, default_size = config.default_size, max_size = config.max_size, "listening");
    }
    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn index() -> &'static str {
    BANNER
}

async fn ping() -> &'static str {
    debug!("ping");
    "pong"
}

async fn data(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let size = match parse_size(params.get("size").map(String::as_str)) {
        SizeRequest::Default => state.default_size,
        SizeRequest::Bytes(size) => size.min(state.max_size),
        SizeRequest::Invalid(reason) => {
            warn!(%reason, "rejected payload request");
            return (StatusCode::BAD_REQUEST, reason).into_response();
        }
    };
    info!(size, "serving payload");
    payload_response(state.block, size)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

fn payload_response(block: Bytes, size: u64) -> Response {
    let chunks = futures_util::stream::unfold(size, move |remaining| {
        let block = block.clone();
        async move {
            if remaining == 0 {
                return None;
            }
            let len = remaining.min(block.len() as u64) as usize;
            Some((Ok::<Bytes, Infallible>(block.slice(..len)), remaining - len as u64))
        }
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, size)
        .body(Body::from_stream(chunks))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests;
