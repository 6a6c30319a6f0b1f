//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.newsstand/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::article::{Endpoint, Filter, Period};
use crate::core::repository::DEFAULT_BASE_URL;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NewsstandConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
    #[serde(default)]
    pub images: ImagesConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BrowseConfig {
    pub endpoint: Option<Endpoint>,
    pub period: Option<Period>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ImagesConfig {
    pub enabled: Option<bool>,
}

/// Values taken from CLI flags (None = not specified).
#[derive(Debug, Default, Clone, Copy)]
pub struct CliOverrides {
    pub endpoint: Option<Endpoint>,
    pub period: Option<Period>,
    pub no_images: bool,
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_filter: Filter,
    pub images_enabled: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.newsstand/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".newsstand").join("config.toml"))
}

/// Load config from `~/.newsstand/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `NewsstandConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<NewsstandConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(NewsstandConfig::default());
        }
    };
    load_config_from(&path)
}

fn load_config_from(path: &Path) -> Result<NewsstandConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(NewsstandConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: NewsstandConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Newsstand Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [api]
# api_key = "..."                        # Or set NYT_API_KEY env var
# base_url = "https://api.nytimes.com"   # Or set NEWSSTAND_BASE_URL

# [browse]
# endpoint = "viewed"                    # "viewed", "emailed", "shared"
# period = "day"                         # "day", "week", "month"

# [images]
# enabled = true
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &NewsstandConfig, cli: CliOverrides) -> ResolvedConfig {
    // API key: env → config
    let api_key = std::env::var("NYT_API_KEY")
        .ok()
        .or_else(|| config.api.api_key.clone());

    // Base URL: env → config → default
    let base_url = std::env::var("NEWSSTAND_BASE_URL")
        .ok()
        .or_else(|| config.api.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let default_filter = Filter {
        endpoint: cli
            .endpoint
            .or(config.browse.endpoint)
            .unwrap_or_default(),
        period: cli.period.or(config.browse.period).unwrap_or_default(),
    };

    ResolvedConfig {
        api_key,
        base_url,
        default_filter,
        images_enabled: !cli.no_images && config.images.enabled.unwrap_or(true),
    }
}
