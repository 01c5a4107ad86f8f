use crate::error::{NetworkError, NetworkErrorKind};
use curl::Error as CurlError;
use std::time::Duration;

pub(super) fn map_curl_error(err: &CurlError) -> NetworkError {
    let kind = if err.is_couldnt_resolve_host() || err.is_couldnt_resolve_proxy() {
        NetworkErrorKind::Dns
    } else if err.is_operation_timedout() {
        NetworkErrorKind::Timeout
    } else if err.is_couldnt_connect() {
        NetworkErrorKind::ConnectionRefused
    } else if err.is_http_returned_error() {
        NetworkErrorKind::HttpStatus
    } else {
        NetworkErrorKind::Other
    };

    NetworkError::new(kind, err.to_string())
}

pub(super) fn check_status(status: u32) -> Result<(), NetworkError> {
    match status {
        200..=299 => Ok(()),
        0 => Err(NetworkError::new(
            NetworkErrorKind::Other,
            "no HTTP response received",
        )),
        _ => Err(NetworkError::new(
            NetworkErrorKind::HttpStatus,
            format!("HTTP status {status}"),
        )),
    }
}

pub(super) fn invalid_address(address: &str) -> NetworkError {
    NetworkError::new(
        NetworkErrorKind::Other,
        format!("cannot build a URL from `{address}`"),
    )
}

pub(super) fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Parses a `Content-Length` header line as delivered by libcurl.
pub(super) fn parse_content_length(line: &[u8]) -> Option<u64> {
    let line = std::str::from_utf8(line).ok()?;
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse().ok()
}
