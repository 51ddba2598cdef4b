//! Application configuration.
//!
//! Values come from the environment, optionally seeded from `config.env` and
//! `.env` by [`load_env_files`]. The resulting [`AppConfig`] is built once in [`crate::run`] and
//! handed to every component that needs it.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_API_URL: &str = "http://localhost:3000/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_OUTPUT_DIR: &str = "./reports";
const DEFAULT_TITLE: &str = "Student Report";
const DEFAULT_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";

/// Files that seed the environment, in load order.
const ENV_FILES: [&str; 2] = ["config.env", ".env"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Error)]
#[error("failed to load {}: {source}", .path.display())]
pub struct EnvFileError {
    pub path: PathBuf,
    #[source]
    pub source: dotenvy::Error,
}

/// Seed the process environment from `config.env` and `.env` in `dir`.
///
/// Missing files are skipped. Files that fail to load are returned so the
/// caller can report them once logging is up. Variables already present in
/// the environment win over file contents.
pub fn load_env_files(dir: &Path) -> Vec<EnvFileError> {
    ENV_FILES
        .iter()
        .map(|file| dir.join(file))
        .filter(|path| path.exists())
        .filter_map(|path| match dotenvy::from_filename(&path) {
            Ok(_) => None,
            Err(source) => Some(EnvFileError { path, source }),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Connection settings for the upstream student API.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub auth_token: String,
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Call [`load_env_files`] first to pick up `config.env` and `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Empty values count as unset, so `PORT=` falls back to the default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match get("NODEJS_API_TIMEOUT") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid {
                    key: "NODEJS_API_TIMEOUT",
                    value,
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let format = match get("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("json") => LogFormat::Json,
            Some("text") => LogFormat::Text,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        Ok(AppConfig {
            server: ServerConfig {
                host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
            },
            upstream: UpstreamConfig {
                base_url: get("NODEJS_API_URL")
                    .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                timeout: Duration::from_secs(timeout_secs),
                auth_token: lookup("AUTH_TOKEN").unwrap_or_default(),
            },
            report: ReportConfig {
                output_dir: PathBuf::from(
                    get("PDF_OUTPUT_DIR").unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
                ),
                title: get("PDF_TITLE").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            },
            logging: LoggingConfig {
                level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                format,
            },
            cors: CorsConfig {
                allowed_origins: split_list(get("CORS_ALLOWED_ORIGINS").as_deref().unwrap_or("*")),
                allowed_methods: split_list(
                    get("CORS_ALLOWED_METHODS").as_deref().unwrap_or(DEFAULT_METHODS),
                ),
                allowed_headers: split_list(get("CORS_ALLOWED_HEADERS").as_deref().unwrap_or("*")),
            },
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
