use std::{ffi::OsStr, io, path::Path};

use serde::{Deserialize, Serialize};

/// The file name looked up in the working directory when no configuration
/// path is given explicitly.
pub const DEFAULT_FILE_NAME: &str = ".msl.toml";

/// Configuration for converting directories of spec files.
///
/// Single-file conversion ignores everything except `skip_unchanged`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// File extensions (without the dot) that are picked up when walking a
    /// directory.
    ///
    /// For example, 'md'.
    extensions: Vec<String>,

    /// Directory names that are never descended into when walking a
    /// directory.
    ///
    /// For example, 'dist' or '.git'.
    exclude: Vec<String>,

    /// Whether to leave a file alone when converting it would not change its
    /// content.
    pub skip_unchanged: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude: Vec::new(),
            skip_unchanged: true,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads the configuration at `path`, falling back to the defaults if it
    /// is missing or invalid.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::debug!("Failed to load config from {}: {e}", path.display());
            Self::default()
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(ConfigError::Write)
    }

    /// Returns the configured file extensions.
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns the directory names skipped while walking.
    #[must_use]
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Checks whether a file at this path should be converted when walking a
    /// directory.
    #[must_use]
    pub fn is_candidate(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    /// Checks whether a directory with this name is excluded from walking.
    #[must_use]
    pub fn is_excluded(&self, name: &OsStr) -> bool {
        self.exclude.iter().any(|e| OsStr::new(e) == name)
    }

    /// Adds a directory name to the exclude list.
    ///
    /// Returns `true` if the name was added, `false` if it already existed.
    pub fn add_exclude(&mut self, name: String) -> bool {
        if self.exclude.contains(&name) {
            false
        } else {
            self.exclude.push(name);
            true
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

const fn default_skip_unchanged() -> bool {
    true
}

/// Errors that can occur when loading or saving a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file: {0}")]
    Read(#[source] io::Error),

    /// The configuration file is not valid.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The configuration file could not be written.
    #[error("Failed to write config file: {0}")]
    Write(#[source] io::Error),
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_extensions")]
        extensions: Vec<String>,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        exclude: Vec<String>,

        #[serde(default = "default_skip_unchanged")]
        skip_unchanged: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                extensions,
                exclude,
                skip_unchanged,
            } => Self {
                extensions,
                exclude,
                skip_unchanged,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            extensions: config.extensions,
            exclude: config.exclude,
            skip_unchanged: config.skip_unchanged,
        }
    }
}
