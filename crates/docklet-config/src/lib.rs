//! Configuration for talking to a docklet control plane
//!
//! Values come from explicit overrides first, then `DOCKLET_*` environment
//! variables, then defaults. The bearer token may also live in a file under
//! the data directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use url::Url;

pub const API_URL_ENV: &str = "DOCKLET_API_URL";
pub const TOKEN_ENV: &str = "DOCKLET_TOKEN";
pub const DATA_DIR_ENV: &str = "DOCKLET_DATA_DIR";
pub const REQUEST_TIMEOUT_ENV: &str = "DOCKLET_REQUEST_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DATA_DIR_NAME: &str = ".docklet";
const TOKEN_FILE_NAME: &str = "token";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid API URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported API URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("Invalid request timeout '{0}', expected a positive number of seconds")]
    InvalidTimeout(String),

    #[error("Could not determine home directory, set DOCKLET_DATA_DIR")]
    NoHomeDir,

    #[error("Failed to read token file {path}: {source}")]
    TokenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Values that take precedence over the environment, usually CLI flags
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Base URL of the control plane API, e.g. `http://host:8080/api`
    pub api_url: Url,
    pub token: Option<String>,
    /// Per-call timeout handed to the HTTP client
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
}

impl OrchestratorConfig {
    /// Load from the environment only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(ConfigOverrides::default())
    }

    pub fn load(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let data_dir = match overrides
            .data_dir
            .or_else(|| env_value(DATA_DIR_ENV).map(PathBuf::from))
        {
            Some(dir) => dir,
            None => dirs::home_dir()
                .ok_or(ConfigError::NoHomeDir)?
                .join(DATA_DIR_NAME),
        };

        let raw_url = overrides
            .api_url
            .or_else(|| env_value(API_URL_ENV))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = parse_api_url(&raw_url)?;

        let request_timeout = match overrides.request_timeout_secs {
            Some(secs) => timeout_from_secs(secs, &secs.to_string())?,
            None => match env_value(REQUEST_TIMEOUT_ENV) {
                Some(raw) => parse_timeout(&raw)?,
                None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            },
        };

        let token = match overrides
            .token
            .or_else(|| env_value(TOKEN_ENV))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
        {
            Some(token) => Some(token),
            None => read_token_file(&data_dir)?,
        };

        debug!(
            "Loaded config: api_url={}, data_dir={}, timeout={:?}, token={}",
            api_url,
            data_dir.display(),
            request_timeout,
            if token.is_some() { "set" } else { "unset" }
        );

        Ok(Self {
            api_url,
            token,
            request_timeout,
            data_dir,
        })
    }

    /// Path of the token file under the data directory
    pub fn token_path(&self) -> PathBuf {
        self.data_dir.join(TOKEN_FILE_NAME)
    }

    /// API base URL without a trailing slash
    pub fn api_base(&self) -> String {
        self.api_url.as_str().trim_end_matches('/').to_string()
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl {
        value: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidTimeout(raw.to_string()))?;
    timeout_from_secs(secs, raw)
}

fn timeout_from_secs(secs: u64, raw: &str) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidTimeout(raw.to_string()));
    }
    Ok(Duration::from_secs(secs))
}

fn read_token_file(data_dir: &Path) -> Result<Option<String>, ConfigError> {
    let path = data_dir.join(TOKEN_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(&path).map_err(|source| ConfigError::TokenFile {
        path: path.clone(),
        source,
    })?;
    let token = contents.trim();
    Ok((!token.is_empty()).then(|| token.to_string()))
}
