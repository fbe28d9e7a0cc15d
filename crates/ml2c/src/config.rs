use crate::{Result, TranspileError};
use ml2c_emit::EmitterConfig;
use ml2c_toolchain::ToolchainConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for a transpile run. Precedence: defaults, then the config file, then `ML2C_*`
/// environment variables, then command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ml2cConfig {
    pub emitter: EmitterConfig,
    pub toolchain: ToolchainConfig,
}

impl Ml2cConfig {
    pub fn from_env() -> Self {
        Self {
            emitter: EmitterConfig::default(),
            toolchain: ToolchainConfig::from_env(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| TranspileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&json).map_err(|source| TranspileError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        config.toolchain = config.toolchain.with_env_overrides();
        Ok(config)
    }
}
