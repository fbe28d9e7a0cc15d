use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub const COMPILER_ENV: &str = "ML2C_CC";
pub const TIMEOUT_ENV: &str = "ML2C_COMPILE_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Compiler executable, looked up on `PATH`.
    pub compiler: String,
    /// Passed to the compiler before `-o`.
    pub extra_args: Vec<String>,
    /// Append `-lm` to the link line.
    pub link_math: bool,
    /// Upper bound on a single compiler or harness run.
    pub timeout_secs: u64,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: "gcc".to_string(),
            extra_args: Vec::new(),
            link_math: true,
            timeout_secs: 60,
        }
    }
}

impl ToolchainConfig {
    /// Defaults overlaid with `ML2C_CC` and `ML2C_COMPILE_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(compiler) = env::var(COMPILER_ENV) {
            if !compiler.trim().is_empty() {
                self.compiler = compiler.trim().to_string();
            }
        }
        if let Ok(raw) = env::var(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => tracing::warn!(value = %raw, "ignoring invalid {}", TIMEOUT_ENV),
            }
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
