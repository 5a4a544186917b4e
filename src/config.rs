use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// File name searched for in the working directory and the user config directory
pub const CONFIG_FILE_NAME: &str = "plugin-release.toml";

/// Represents the complete configuration for plugin-release.
///
/// Contains artifact discovery settings and changelog rendering options.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub artifact: ArtifactConfig,

    #[serde(default)]
    pub changelog: ChangelogConfig,
}

fn default_plugins_root() -> PathBuf {
    PathBuf::from("plugins")
}

/// Returns the default list of entry names skipped during artifact discovery.
fn default_ignore() -> Vec<String> {
    vec![
        ".git".to_string(),
        "__pycache__".to_string(),
        "node_modules".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

fn default_short_hash_len() -> usize {
    7
}

/// Configuration for artifact discovery.
///
/// Controls where plugins live in the repository and how entry names are compared
/// against the plugin name from the tag.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ArtifactConfig {
    /// Directory, relative to the repository root, searched for plugin artifacts
    #[serde(default = "default_plugins_root")]
    pub plugins_root: PathBuf,

    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    /// Treat `-` and `_` as equal when comparing names
    #[serde(default = "default_true")]
    pub normalize_separators: bool,

    /// Also match files whose manifest header declares `id: <plugin>`
    #[serde(default = "default_true")]
    pub match_manifest_id: bool,

    /// What to do when the artifact's manifest `version:` differs from the tag
    #[serde(default)]
    pub manifest_version_check: ManifestCheck,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        ArtifactConfig {
            plugins_root: default_plugins_root(),
            ignore: default_ignore(),
            normalize_separators: true,
            match_manifest_id: true,
            manifest_version_check: ManifestCheck::default(),
        }
    }
}

impl ArtifactConfig {
    /// Ensure the plugins root stays inside the repository
    ///
    /// Only plain relative components are accepted (a leading `.` is
    /// tolerated); absolute paths and `..` are rejected.
    pub fn validate(&self) -> Result<()> {
        let root = &self.plugins_root;
        let escapes = root
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if escapes {
            return Err(ReleaseError::config(format!(
                "plugins_root '{}' must be a relative path inside the repository",
                root.display()
            )));
        }
        Ok(())
    }
}

/// Handling of a manifest version that disagrees with the release tag
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ManifestCheck {
    /// Do not read manifests
    Off,
    /// Report the mismatch and continue
    #[default]
    Warn,
    /// Fail the artifact stage
    Error,
}

/// Configuration for changelog generation and rendering.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChangelogConfig {
    #[serde(default = "default_true")]
    pub include_hash: bool,

    #[serde(default = "default_short_hash_len")]
    pub short_hash_len: usize,

    #[serde(default)]
    pub include_merges: bool,

    /// When releasing a final version, start the notes after the previous
    /// final release rather than after its release candidates
    #[serde(default)]
    pub skip_prereleases: bool,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        ChangelogConfig {
            include_hash: true,
            short_hash_len: default_short_hash_len(),
            include_merges: false,
            skip_prereleases: false,
        }
    }
}

impl Config {
    /// Check settings that deserialization alone cannot enforce
    pub fn validate(&self) -> Result<()> {
        self.artifact.validate()
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `plugin-release.toml` in current directory
/// 3. `plugin-release.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        path.to_path_buf()
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        PathBuf::from(CONFIG_FILE_NAME)
    } else if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            path
        } else {
            log::debug!("No configuration file found, using defaults");
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    log::debug!("Loading configuration from {}", path.display());

    let config_str = fs::read_to_string(&path).map_err(|e| {
        ReleaseError::config(format!("Cannot read '{}': {}", path.display(), e))
    })?;

    let config = parse_config(&config_str)
        .map_err(|e| ReleaseError::config(format!("Cannot parse '{}': {}", path.display(), e)))?;

    config.validate()?;
    Ok(config)
}

/// Parse configuration from TOML text
pub fn parse_config(text: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(text)
}
