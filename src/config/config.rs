use std::path::{Path, PathBuf};

use dimse::{DimseConfig, DimseError, RemoteNode};
use serde::Deserialize;
use thiserror::Error;

use crate::config::LoggingConfig;
use crate::files::{DEFAULT_EXTENSION, DEFAULT_WORKLIST_DIR, SAMPLE_SIZE};

/// Called AE title of the worklist SCP
pub const DEFAULT_REMOTE_AET: &str = "ORTHANC";
/// Host of the worklist SCP
pub const DEFAULT_REMOTE_HOST: &str = "localhost";
/// DICOM port of the worklist SCP
pub const DEFAULT_REMOTE_PORT: u16 = 4242;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid file extension '{0}'")]
    InvalidExtension(String),

    #[error(transparent)]
    Dimse(#[from] DimseError),
}

/// Settings for both diagnostic flows; every field has a compiled-in default
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_worklist_dir")]
    pub worklist_dir: PathBuf,

    /// Worklist file extension, without the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// How many files the presence check lists
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    #[serde(default)]
    pub scu: DimseConfig,

    #[serde(default = "default_remote")]
    pub remote: RemoteNode,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            worklist_dir: default_worklist_dir(),
            extension: default_extension(),
            sample_size: default_sample_size(),
            scu: DimseConfig::default(),
            remote: default_remote(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ProbeConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: ProbeConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extension.is_empty() || self.extension.contains(['.', '/', '\\']) {
            return Err(ConfigError::InvalidExtension(self.extension.clone()));
        }
        self.scu.validate()?;
        self.remote.validate()?;
        Ok(())
    }
}

// Default value functions
fn default_worklist_dir() -> PathBuf {
    PathBuf::from(DEFAULT_WORKLIST_DIR)
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_sample_size() -> usize {
    SAMPLE_SIZE
}

fn default_remote() -> RemoteNode {
    RemoteNode::new(DEFAULT_REMOTE_AET, DEFAULT_REMOTE_HOST, DEFAULT_REMOTE_PORT)
}
