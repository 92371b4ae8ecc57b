//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Start from a config file if one is found, otherwise from defaults
//! 2. Apply environment variable overrides on top
//! 3. Files are JSON or TOML, detected by extension
//!
//! ## Environment Variables
//! - `AJOK_API_BASE_URL`: Backend base URL
//! - `AJOK_API_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `AJOK_REFRESH_TIMEOUT_SECS`: Token refresh timeout in seconds
//! - `AJOK_TOKEN_STORE`: `memory`, `file` or `keychain`
//! - `AJOK_TOKEN_STORE_PATH`: Token file used by the `file` store
//! - `AJOK_KEYCHAIN_SERVICE`: Service name used by the `keychain` store
//! - `AJOK_LOG_FILTER`: `tracing` filter directive
//! - `AJOK_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./ajok.toml`, `./ajok.json`, `./config.toml`, `./config.json`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ajok_domain::{AjokError, Config, Result, TokenStoreBackend};

const CONFIG_FILE_NAMES: [&str; 4] = ["ajok.toml", "ajok.json", "config.toml", "config.json"];

/// Load configuration: file (if any) plus environment overrides.
///
/// # Errors
/// Returns `AjokError::Config` if a found file is invalid or an environment
/// variable has an invalid value.
pub fn load() -> Result<Config> {
    let base = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            Config::default()
        }
    };
    apply_env_overrides(base)
}

/// Defaults plus environment overrides, ignoring config files.
///
/// # Errors
/// Returns `AjokError::Config` if a variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    apply_env_overrides(Config::default())
}

/// Overlay any `AJOK_*` variables that are set onto `config`.
///
/// # Errors
/// Returns `AjokError::Config` if a variable has an invalid value.
pub fn apply_env_overrides(mut config: Config) -> Result<Config> {
    if let Some(url) = env_opt("AJOK_API_BASE_URL") {
        config.api.base_url = url;
    }
    if let Some(secs) = env_parse::<u64>("AJOK_API_TIMEOUT_SECS")? {
        config.api.request_timeout_secs = secs;
    }
    if let Some(secs) = env_parse::<u64>("AJOK_REFRESH_TIMEOUT_SECS")? {
        config.api.refresh_timeout_secs = secs;
    }
    if let Some(backend) = env_parse::<TokenStoreBackend>("AJOK_TOKEN_STORE")? {
        config.session.token_store = backend;
    }
    if let Some(path) = env_opt("AJOK_TOKEN_STORE_PATH") {
        config.session.token_path = PathBuf::from(path);
    }
    if let Some(service) = env_opt("AJOK_KEYCHAIN_SERVICE") {
        config.session.keychain_service = service;
    }
    if let Some(filter) = env_opt("AJOK_LOG_FILTER") {
        config.logging.filter = filter;
    }
    config.logging.json = env_bool("AJOK_LOG_JSON", config.logging.json);

    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `AjokError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AjokError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            AjokError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| AjokError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| AjokError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| AjokError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(AjokError::Config(format!("Unsupported config format: {}", extension))),
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.api.base_url.trim().is_empty() {
        return Err(AjokError::Config("api.base_url must not be empty".into()));
    }
    if config.api.request_timeout_secs == 0 || config.api.refresh_timeout_secs == 0 {
        return Err(AjokError::Config("timeouts must be at least one second".into()));
    }
    Ok(())
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| AjokError::Config(format!("Invalid {key}={raw}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
