use crate::common::net::endpoint_url;
use crate::config::{ColorTag, Target};
use crate::error::ConfigError;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_PROFILE_FILE: &str = "parameters.json";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTarget {
    server_ip: Option<String>,
    title: Option<String>,
    color: Option<String>,
}

pub fn load(path: &Path) -> Result<Vec<Target>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let targets = parse(&content)?;
    debug!(path = %path.display(), count = targets.len(), "targets loaded");
    Ok(targets)
}

/// Accepts either a single target object or `{ "targets": [...] }`.
pub fn parse(document: &str) -> Result<Vec<Target>, ConfigError> {
    let root: Value = serde_json::from_str(document)?;
    let Value::Object(mut map) = root else {
        return Err(ConfigError::Malformed(
            "top level must be a JSON object".to_string(),
        ));
    };

    let entries = match map.remove("targets") {
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(ConfigError::Malformed(
                "`targets` must be an array".to_string(),
            ));
        }
        None => vec![Value::Object(map)],
    };

    if entries.is_empty() {
        return Err(ConfigError::NoTargets);
    }

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            if !entry.is_object() {
                return Err(ConfigError::Malformed(format!(
                    "target #{index} must be an object"
                )));
            }
            let raw: RawTarget = serde_json::from_value(entry)
                .map_err(|err| ConfigError::Malformed(format!("target #{index}: {err}")))?;
            validate(index, raw)
        })
        .collect()
}

fn validate(index: usize, raw: RawTarget) -> Result<Target, ConfigError> {
    let address = non_blank(raw.server_ip).ok_or(ConfigError::MissingField {
        index,
        field: "serverIp",
    })?;
    let title = non_blank(raw.title).ok_or(ConfigError::MissingField {
        index,
        field: "title",
    })?;

    if endpoint_url(&address, "/ping").is_none() {
        return Err(ConfigError::InvalidAddress { index, address });
    }

    let color = match raw.color.as_deref() {
        None => ColorTag::default(),
        Some(name) => ColorTag::parse(name).unwrap_or_else(|| {
            warn!(target_title = %title, color = name, "unknown color, using default");
            ColorTag::default()
        }),
    };

    Ok(Target::new(title, address, color))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Picks the configuration path: the explicit flag wins, then the well-known
/// file in the working directory, then the user config directory.
pub fn resolve_profile_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    let local = PathBuf::from(DEFAULT_PROFILE_FILE);
    if local.exists() {
        return local;
    }
    dirs::config_dir()
        .map(|dir| dir.join("perfprobe").join(DEFAULT_PROFILE_FILE))
        .filter(|path| path.exists())
        .unwrap_or(local)
}
