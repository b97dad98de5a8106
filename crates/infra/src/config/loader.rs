//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the environment if one exists
//! 2. Attempts to load from environment variables
//! 3. If `LALINGUA_API_BASE_URL` is unset, falls back to loading from file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `LALINGUA_API_BASE_URL`: Backend base address (required)
//! - `LALINGUA_API_TIMEOUT_MS`: Request timeout in milliseconds
//! - `LALINGUA_USER_AGENT`: User-Agent header sent with every request
//! - `LALINGUA_PAYMENT_KEY_ID`: Public key for the checkout widget
//! - `LALINGUA_PAYMENT_CURRENCY`: Checkout currency code
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./lalingua.json` or `./lalingua.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use lalingua_domain::{ApiConfig, Config, LaLinguaError, PaymentConfig, Result};

use crate::errors::InfraError;

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the base URL is
/// not set there, falls back to loading from a config file.
///
/// # Errors
/// Returns `LaLinguaError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `LALINGUA_API_BASE_URL` must be present; everything else falls back to
/// defaults.
///
/// # Errors
/// Returns `LaLinguaError::Config` if the base URL is missing or a numeric
/// variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let base_url = env_var("LALINGUA_API_BASE_URL")?;
    let mut api = ApiConfig::new(base_url);

    if let Some(timeout) = optional_env("LALINGUA_API_TIMEOUT_MS") {
        api.timeout_ms = timeout
            .parse::<u64>()
            .map_err(|e| LaLinguaError::Config(format!("Invalid API timeout: {}", e)))?;
    }
    api.user_agent = optional_env("LALINGUA_USER_AGENT");

    let mut payment = PaymentConfig { key_id: optional_env("LALINGUA_PAYMENT_KEY_ID"), ..PaymentConfig::default() };
    if let Some(currency) = optional_env("LALINGUA_PAYMENT_CURRENCY") {
        payment.currency = currency;
    }

    let config = Config { api, payment };
    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `LaLinguaError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LaLinguaError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            LaLinguaError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LaLinguaError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    validate(&config)?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `LaLinguaError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents).map_err(|e| InfraError::from(e).into()),
        _ => Err(LaLinguaError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Reject configurations the client cannot start with.
fn validate(config: &Config) -> Result<()> {
    let parsed = url::Url::parse(&config.api.base_url).map_err(|e| {
        LaLinguaError::Config(format!("Invalid API base URL {}: {}", config.api.base_url, e))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(LaLinguaError::Config(format!(
            "API base URL must be http or https, got {}",
            parsed.scheme()
        )));
    }
    if config.api.timeout_ms == 0 {
        return Err(LaLinguaError::Config("API timeout must be greater than zero".to_string()));
    }
    Ok(())
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 8] = [
        "lalingua.json",
        "lalingua.toml",
        "config.json",
        "config.toml",
        "../config.json",
        "../config.toml",
        "../../config.json",
        "../../config.toml",
    ];

    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `LaLinguaError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        LaLinguaError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Optional environment variable; blank values count as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
