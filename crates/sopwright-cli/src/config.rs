//! Configuration and edits file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory),
//! and assembling the user's metadata edits from a file and `--set` flags.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use sopwright::{SopError, config::AppConfig, synthesize::UserEdits};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Failed to parse metadata edits: {0}")]
    Edits(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for SopError {
    fn from(err: ConfigError) -> Self {
        SopError::Io(std::io::Error::other(err.to_string()))
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (sopwright/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path to config file
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, SopError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("sopwright/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "sopwright", "sopwright") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if the file doesn't exist, cannot be read, or fails to parse.
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, SopError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}

/// Assemble the user's edits
///
/// The edits file is read first (JSON when its extension is `.json`, TOML
/// otherwise); every `FIELD=VALUE` pair then overrides the matching field.
///
/// # Errors
///
/// Returns error if:
/// - The edits file cannot be read or parsed
/// - A field override has no `=` or an empty field name
pub fn load_edits(path: Option<impl AsRef<Path>>, overrides: &[String]) -> Result<UserEdits, SopError> {
    let mut edits = match path {
        Some(path) => load_edits_file(path.as_ref())?,
        None => UserEdits::new(),
    };

    for pair in overrides {
        let (name, value) = parse_override(pair)?;
        debug!(field = name; "Field overridden from command line");
        edits.set_field(name, value);
    }

    Ok(edits)
}

fn load_edits_file(path: &Path) -> Result<UserEdits, SopError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }
    info!(path = path.display().to_string(); "Loading metadata edits");

    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
    let edits = if is_json {
        serde_json::from_str(&content).map_err(|e| ConfigError::Edits(e.to_string()))?
    } else {
        toml::from_str(&content).map_err(|e| ConfigError::Edits(e.to_string()))?
    };

    Ok(edits)
}

fn parse_override(pair: &str) -> Result<(&str, &str), ConfigError> {
    let (name, value) = pair
        .split_once('=')
        .ok_or_else(|| ConfigError::Validation(format!("`{pair}` is not in FIELD=VALUE form")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::Validation(format!("`{pair}` has an empty field name")));
    }
    Ok((name, value))
}
