//! YAML config parser.
//!
//! # Example config file:
//! ```yaml
//! rpc_url: http://127.0.0.1:8545
//! private_key_env: APPROVECTL_PRIVATE_KEY
//! confirmations: 1
//! finalization_timeout_secs: 300
//! journal: true
//! ```

use crate::config::{Config, CONFIG_FILE_NAME};
use crate::utils::paths::find_walking_up;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Raw YAML representation before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    rpc_url: Option<String>,
    #[serde(default)]
    private_key_env: Option<String>,
    #[serde(default)]
    confirmations: Option<u64>,
    #[serde(default)]
    finalization_timeout_secs: Option<u64>,
    #[serde(default)]
    journal: Option<bool>,
}

/// Parse a config file from disk.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse a config from a YAML string.
pub fn parse_config_str(yaml: &str) -> Result<Config> {
    // An empty file (or one with only comments) is a valid, default config.
    let raw: RawConfig = if yaml.lines().all(|l| {
        let l = l.trim();
        l.is_empty() || l.starts_with('#')
    }) {
        RawConfig::default()
    } else {
        serde_yaml::from_str(yaml).context("Invalid YAML syntax in config")?
    };
    convert_raw_config(raw)
}

fn convert_raw_config(raw: RawConfig) -> Result<Config> {
    let defaults = Config::default();

    let rpc_url = match raw.rpc_url.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) => {
            let url = Url::parse(s).with_context(|| format!("rpc_url is not a valid URL: {}", s))?;
            if !matches!(url.scheme(), "http" | "https") {
                bail!("rpc_url must be http:// or https://, got {}://", url.scheme());
            }
            Some(url)
        }
    };

    let private_key_env = match raw.private_key_env {
        Some(var) if var.trim().is_empty() => bail!("private_key_env cannot be empty"),
        Some(var) => Some(var.trim().to_string()),
        None => None,
    };

    let confirmations = raw.confirmations.unwrap_or(defaults.confirmations);
    if confirmations == 0 {
        bail!("confirmations must be at least 1");
    }

    let finalization_timeout = match raw.finalization_timeout_secs {
        Some(0) => bail!("finalization_timeout_secs must be greater than 0 (omit it to wait forever)"),
        Some(secs) => Some(Duration::from_secs(secs)),
        None => None,
    };

    Ok(Config {
        rpc_url,
        private_key_env,
        confirmations,
        finalization_timeout,
        journal: raw.journal.unwrap_or(defaults.journal),
    })
}

/// Load the config: an explicit path if given, else the nearest
/// `.approvectl.yaml` above `start`, else defaults.
pub fn load(explicit: Option<&Path>, start: &Path) -> Result<Config> {
    if let Some(path) = explicit {
        return parse_config_file(path);
    }
    match find_walking_up(start, CONFIG_FILE_NAME) {
        Some(path) => {
            tracing::debug!("Using config {}", path.display());
            parse_config_file(&path)
        }
        None => Ok(Config::default()),
    }
}
