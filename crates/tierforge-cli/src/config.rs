//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tierforge_domain::{RecordId, StandardTier, TierSet};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Profile commands act as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_user: Option<String>,

    /// Database file; `~/.tierforge/tierforge.db` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Tier names, best first
    #[serde(default = "default_tiers")]
    pub tiers: Vec<String>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

fn home_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".tierforge"))
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        Ok(home_dir()?.join("config.toml"))
    }

    /// Load configuration from `path`, or defaults if it does not exist.
    ///
    /// The tier list is validated on load.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let contents = fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };
        config.tier_set()?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// The configured tiers as a validated set.
    pub fn tier_set(&self) -> Result<TierSet> {
        TierSet::new(self.tiers.iter().cloned())
            .map_err(|e| CliError::Config(format!("Invalid tiers: {}", e)))
    }

    /// Database location, with `override_path` taking precedence.
    pub fn database(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        match (override_path, &self.database_path) {
            (Some(path), _) => Ok(path.to_path_buf()),
            (None, Some(path)) => Ok(path.clone()),
            (None, None) => Ok(home_dir()?.join("tierforge.db")),
        }
    }

    /// The signed-in profile.
    pub fn active_user(&self) -> Result<RecordId> {
        let id = self.active_user.as_deref().ok_or(CliError::NotSignedIn)?;
        RecordId::parse(id)
            .map_err(|e| CliError::Config(format!("Invalid active_user '{}': {}", id, e)))
    }

    /// The signed-in profile, if any.
    pub fn viewer(&self) -> Result<Option<RecordId>> {
        match self.active_user {
            Some(_) => self.active_user().map(Some),
            None => Ok(None),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            active_user: None,
            database_path: None,
            tiers: default_tiers(),
            settings: Settings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_tiers() -> Vec<String> {
    StandardTier::ALL.iter().map(|t| t.as_str().to_string()).collect()
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
