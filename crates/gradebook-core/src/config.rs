//! Client configuration
//!
//! Priority: CLI flag > `GRADEBOOK_*` environment variable > default.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

pub const API_URL_ENV: &str = "GRADEBOOK_API_URL";
pub const TIMEOUT_ENV: &str = "GRADEBOOK_TIMEOUT_SECS";
pub const SESSION_PATH_ENV: &str = "GRADEBOOK_SESSION_PATH";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const SESSION_FILE: &str = "session.json";

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    Env,
    Flag,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfigSource::Default => "default",
            ConfigSource::Env => "env",
            ConfigSource::Flag => "flag",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigSources {
    pub api_url: ConfigSource,
    pub timeout_secs: ConfigSource,
    pub session_path: ConfigSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    pub session_path: PathBuf,
    pub sources: ConfigSources,
}

impl ClientConfig {
    /// Resolve from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let (api_url, api_source) = match var(API_URL_ENV) {
            Some(url) => (normalize_api_url(&url)?, ConfigSource::Env),
            None => (DEFAULT_API_URL.to_string(), ConfigSource::Default),
        };

        let (timeout_secs, timeout_source) = match var(TIMEOUT_ENV) {
            Some(raw) => (parse_timeout(&raw)?, ConfigSource::Env),
            None => (DEFAULT_TIMEOUT_SECS, ConfigSource::Default),
        };

        let (session_path, session_source) = match var(SESSION_PATH_ENV) {
            Some(path) => (expand_path(&path), ConfigSource::Env),
            None => (default_session_path()?, ConfigSource::Default),
        };

        Ok(Self {
            api_url,
            timeout_secs,
            session_path,
            sources: ConfigSources {
                api_url: api_source,
                timeout_secs: timeout_source,
                session_path: session_source,
            },
        })
    }

    pub fn with_api_url(mut self, url: &str) -> Result<Self> {
        self.api_url = normalize_api_url(url)?;
        self.sources.api_url = ConfigSource::Flag;
        Ok(self)
    }

    pub fn with_session_path(mut self, path: &str) -> Self {
        self.session_path = expand_path(path);
        self.sources.session_path = ConfigSource::Flag;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Default session file in the platform data directory
pub fn default_session_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("com", "gradebook", "Gradebook")
        .ok_or_else(|| Error::config("Could not determine project directories"))?;

    Ok(dirs.data_dir().join(SESSION_FILE))
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path.trim()).into_owned())
}

fn normalize_api_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::config(format!(
            "API URL must start with http:// or https://: {}",
            url
        )));
    }
    Ok(url.to_string())
}

fn parse_timeout(raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(Error::config(format!(
            "{} must be a positive number of seconds, got '{}'",
            TIMEOUT_ENV, raw
        ))),
    }
}
