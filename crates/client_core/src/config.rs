use std::{
    collections::HashMap,
    fs,
    path::Path,
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "image_finder.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub access_key: String,
    pub api_base_url: String,
    pub default_query: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            access_key: String::new(),
            api_base_url: "https://api.unsplash.com".into(),
            default_query: "nature".into(),
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    pub fn has_access_key(&self) -> bool {
        !self.access_key.trim().is_empty()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Defaults, then `image_finder.toml` in the working directory if present, then environment.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
        match parse_file_config(&raw) {
            Ok(file_cfg) => apply_file_config(&mut settings, &file_cfg),
            Err(err) => tracing::warn!("ignoring unreadable {DEFAULT_CONFIG_FILE}: {err:#}"),
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

/// Like [`load_settings`] but with an explicit config file that must exist and parse.
pub fn load_settings_from(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    let file_cfg = parse_file_config(&raw)
        .with_context(|| format!("failed to parse config file '{}'", path.display()))?;

    let mut settings = Settings::default();
    apply_file_config(&mut settings, &file_cfg);
    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn parse_file_config(raw: &str) -> anyhow::Result<HashMap<String, toml::Value>> {
    Ok(toml::from_str::<HashMap<String, toml::Value>>(raw)?)
}

fn apply_file_config(settings: &mut Settings, file_cfg: &HashMap<String, toml::Value>) {
    if let Some(v) = file_cfg.get("access_key").and_then(toml::Value::as_str) {
        settings.access_key = v.to_string();
    }
    if let Some(v) = file_cfg.get("api_base_url").and_then(toml::Value::as_str) {
        settings.api_base_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("default_query").and_then(toml::Value::as_str) {
        settings.default_query = v.to_string();
    }
    if let Some(v) = file_cfg
        .get("request_timeout_secs")
        .and_then(toml::Value::as_integer)
    {
        settings.request_timeout_secs = u64::try_from(v).ok();
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("UNSPLASH_ACCESS_KEY") {
        settings.access_key = v;
    }
    if let Some(v) = lookup("APP__ACCESS_KEY") {
        settings.access_key = v;
    }

    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__DEFAULT_QUERY") {
        settings.default_query = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }
}
