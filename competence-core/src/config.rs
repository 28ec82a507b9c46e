use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File used when nothing else names one
pub const DEFAULT_SESSION_FILE: &str = "competences.yaml";

/// User configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Session file used when neither `--file` nor `COMPETENCE_FILE` is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_file: Option<String>,
}

impl Config {
    /// Loads the configuration from the provided path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))
    }

    /// Loads the configuration, or returns the default if the file is absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save the configuration to the specified path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(&self)?;

        // Ensure parent directories exist
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path.as_ref()))?;

        Ok(())
    }
}

/// Gets the path to the configuration file
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var("COMPETENCE_CONFIG_PATH") {
        return Ok(PathBuf::from(path));
    }

    // Default to ~/.competence.config
    let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

    Ok(home_dir.join(".competence.config"))
}

/// Determines the session file to use
pub fn determine_session_path(cli_file: Option<&str>) -> Result<PathBuf> {
    // Priority 1: explicit command line option
    if let Some(file) = cli_file {
        return Ok(PathBuf::from(file));
    }

    // Priority 2: environment variable
    if let Ok(file) = env::var("COMPETENCE_FILE") {
        return Ok(PathBuf::from(file));
    }

    // Priority 3: configured default
    let config = Config::load_or_default(get_config_path()?)?;
    if let Some(file) = config.default_file {
        return Ok(PathBuf::from(file));
    }

    Ok(PathBuf::from(DEFAULT_SESSION_FILE))
}
