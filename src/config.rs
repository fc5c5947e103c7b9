//! Configuration for borderwm
//!
//! Loads configuration from TOML file at `~/.config/borderwm/config.toml`
//! Auto-generates default config file on first run if missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window_manager: WindowManagerConfig,
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            if let Err(e) = Self::save_default(config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {:?}", config_path))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file {:?}", config_path))?;

        info!("Configuration loaded from {:?}", config_path);
        debug!("Config: {:?}", config);

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("borderwm");

        Ok(config_dir.join("config.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string).context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

/// Window manager configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowManagerConfig {
    pub border: BorderConfig,
    pub behavior: BehaviorConfig,
}

/// Container border configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderConfig {
    /// Border width in pixels
    pub width: u16,
    /// Border color of unfocused windows (0xRRGGBB)
    pub color: u32,
    /// Border color of the focused window (0xRRGGBB)
    pub active_color: u32,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            width: 4,
            color: 0x772277,
            active_color: 0xFF00FF,
        }
    }
}

/// What to do with windows that declare `WM_TRANSIENT_FOR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransientPolicy {
    /// Leave transients unmanaged; their owner's decoration covers them.
    #[default]
    Skip,
    /// Give transients a container of their own.
    Adopt,
}

/// Window behavior configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub transient_policy: TransientPolicy,
    /// Smallest width an interactive resize may produce
    pub min_width: u32,
    /// Smallest height an interactive resize may produce
    pub min_height: u32,
    /// Adopt windows that are already mapped when the manager starts
    pub adopt_existing: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            transient_policy: TransientPolicy::Skip,
            min_width: 1,
            min_height: 1,
            adopt_existing: true,
        }
    }
}
