use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

// Admin client configuration sourced from environment variables, with an
// optional YAML override file for ops-friendly deployments.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    // Base URL of the schema service.
    pub base_url: String,
    // Interval between schema status polls.
    pub poll_interval_ms: u64,
    // Delay before the view reload that follows a successful mutation.
    pub reload_delay_ms: u64,
    // Slightly longer delay after upload so the success message stays readable.
    pub upload_reload_delay_ms: u64,
    // How long a stacking notice stays visible.
    pub notice_ttl_ms: u64,
    // Optional per-request timeout; unset means requests may wait indefinitely.
    pub request_timeout_ms: Option<u64>,
}

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;
const DEFAULT_RELOAD_DELAY_MS: u64 = 1_500;
const DEFAULT_UPLOAD_RELOAD_DELAY_MS: u64 = 2_000;
const DEFAULT_NOTICE_TTL_MS: u64 = 5_000;

#[derive(Debug, Deserialize, Default)]
struct AdminConfigOverride {
    base_url: Option<String>,
    poll_interval_ms: Option<u64>,
    reload_delay_ms: Option<u64>,
    upload_reload_delay_ms: Option<u64>,
    notice_ttl_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            reload_delay_ms: DEFAULT_RELOAD_DELAY_MS,
            upload_reload_delay_ms: DEFAULT_UPLOAD_RELOAD_DELAY_MS,
            notice_ttl_ms: DEFAULT_NOTICE_TTL_MS,
            request_timeout_ms: None,
        }
    }
}

impl AdminConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var("MOCKBOARD_BASE_URL")
            && !value.is_empty()
        {
            config.base_url = value;
        }
        if let Some(value) = read_u64_env("MOCKBOARD_POLL_INTERVAL_MS") {
            config.poll_interval_ms = value;
        }
        if let Some(value) = read_u64_env("MOCKBOARD_RELOAD_DELAY_MS") {
            config.reload_delay_ms = value;
        }
        if let Some(value) = read_u64_env("MOCKBOARD_UPLOAD_RELOAD_DELAY_MS") {
            config.upload_reload_delay_ms = value;
        }
        if let Some(value) = read_u64_env("MOCKBOARD_NOTICE_TTL_MS") {
            config.notice_ttl_ms = value;
        }
        if let Some(value) = read_u64_env("MOCKBOARD_REQUEST_TIMEOUT_MS") {
            config.request_timeout_ms = Some(value);
        }
        config
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env();
        if let Ok(path) = std::env::var("MOCKBOARD_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read MOCKBOARD_CONFIG: {path}"))?;
            apply_yaml(&mut config, &contents)?;
        }
        Ok(config)
    }
}

fn apply_yaml(config: &mut AdminConfig, contents: &str) -> Result<()> {
    let override_cfg: AdminConfigOverride =
        serde_yaml::from_str(contents).context("parse admin config yaml")?;
    if let Some(value) = override_cfg.base_url
        && !value.is_empty()
    {
        config.base_url = value;
    }
    if let Some(value) = override_cfg.poll_interval_ms
        && value > 0
    {
        config.poll_interval_ms = value;
    }
    if let Some(value) = override_cfg.reload_delay_ms
        && value > 0
    {
        config.reload_delay_ms = value;
    }
    if let Some(value) = override_cfg.upload_reload_delay_ms
        && value > 0
    {
        config.upload_reload_delay_ms = value;
    }
    if let Some(value) = override_cfg.notice_ttl_ms
        && value > 0
    {
        config.notice_ttl_ms = value;
    }
    if let Some(value) = override_cfg.request_timeout_ms
        && value > 0
    {
        config.request_timeout_ms = Some(value);
    }
    Ok(())
}

fn read_u64_env(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
}
