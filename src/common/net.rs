use crate::config::DEFAULT_PROBE_PORT;
use url::Url;

/// Builds `http://<address><path>`, filling in the default probe port when
/// the address does not carry one.
pub fn endpoint_url(address: &str, path: &str) -> Option<Url> {
    let trimmed = address.trim().trim_end_matches('/');
    let authority = trimmed.strip_prefix("http://").unwrap_or(trimmed);
    if authority.is_empty() || authority.contains('/') {
        return None;
    }

    let authority = if has_explicit_port(authority) {
        authority.to_string()
    } else if authority.contains(':') && !authority.starts_with('[') {
        format!("[{authority}]:{DEFAULT_PROBE_PORT}")
    } else {
        format!("{authority}:{DEFAULT_PROBE_PORT}")
    };

    let mut url = Url::parse(&format!("http://{authority}")).ok()?;
    url.host_str()?;
    url.set_path(path);
    Some(url)
}

fn has_explicit_port(authority: &str) -> bool {
    if let Some(rest) = authority.strip_prefix('[') {
        return rest
            .split_once("]:")
            .is_some_and(|(_, port)| port.parse::<u16>().is_ok());
    }
    match authority.split_once(':') {
        Some((_, port)) => port.parse::<u16>().is_ok(),
        None => false,
    }
}
