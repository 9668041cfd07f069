//! JSON configuration file adapter.
//!
//! A missing file is not an error: the reference defaults apply. Because
//! every section is `#[serde(default)]`, a file only lists the values it
//! overrides. Saving validates first and never writes a config that
//! [`SystemConfig::validate`] rejects.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("no config at {}, using defaults", self.path.display());
                return Ok(SystemConfig::default());
            }
            Err(e) => {
                warn!("cannot read {}: {}", self.path.display(), e);
                return Err(ConfigError::IoError);
            }
        };
        let config: SystemConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("cannot parse {}: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        config.validate().map_err(ConfigError::ValidationFailed)?;
        info!("config loaded from {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate().map_err(ConfigError::ValidationFailed)?;
        let text = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Corrupted)?;
        fs::write(&self.path, text).map_err(|e| {
            warn!("cannot write {}: {}", self.path.display(), e);
            ConfigError::IoError
        })?;
        info!("config saved to {}", self.path.display());
        Ok(())
    }
}
