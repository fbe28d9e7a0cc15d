/*! Drive an external C compiler over generated source.
 *
 * Generated code is only useful once a real toolchain accepts it. This crate runs the compiler as
 * `<cc> [extra args] -o <binary> <source> -lm`, bounds every run with a timeout, and hands back
 * compiler diagnostics untouched so environment problems stay diagnosable. Compiled harnesses can
 * be executed and their printed predictions read back for comparison with the source model.
 */

pub mod config;
pub mod process;

pub use config::ToolchainConfig;
pub use process::{run_with_timeout, ProcessOutput};

use ml2c_emit::{parse_harness_output, EmitError};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ToolchainError {
    #[error("Compilation failed: {diagnostics}")]
    CompilationFailed {
        status: Option<i32>,
        diagnostics: String,
    },
    #[error("Harness {} failed: {diagnostics}", .binary.display())]
    ExecutionFailed {
        binary: PathBuf,
        status: Option<i32>,
        diagnostics: String,
    },
    #[error(transparent)]
    UnexpectedOutput(#[from] EmitError),
}

pub type Result<T> = std::result::Result<T, ToolchainError>;

/// Stateless compiler driver; every call is independent and safe to retry.
#[derive(Debug, Clone, Default)]
pub struct Toolchain {
    config: ToolchainConfig,
}

impl Toolchain {
    pub fn new(config: ToolchainConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(ToolchainConfig::from_env())
    }

    pub fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    /// Whether the configured compiler answers `--version`.
    pub fn is_available(&self) -> bool {
        let mut command = Command::new(&self.config.compiler);
        command.arg("--version");
        run_with_timeout(command, self.config.timeout())
            .map(|output| output.success())
            .unwrap_or(false)
    }

    /// `model_inference.c` → `model_inference`.
    pub fn default_binary_path(source: &Path) -> PathBuf {
        source.with_extension("")
    }

    /// Compile `source` into `output` (or the default binary path) and return the binary path.
    pub fn compile(&self, source: &Path, output: Option<&Path>) -> Result<PathBuf> {
        let binary = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| Self::default_binary_path(source));

        let mut command = Command::new(&self.config.compiler);
        command
            .args(&self.config.extra_args)
            .arg("-o")
            .arg(&binary)
            .arg(source);
        if self.config.link_math {
            command.arg("-lm");
        }
        debug!(?command, "invoking C compiler");

        let result = run_with_timeout(command, self.config.timeout()).map_err(|e| {
            ToolchainError::CompilationFailed {
                status: None,
                diagnostics: format!("failed to run {}: {}", self.config.compiler, e),
            }
        })?;

        if result.timed_out {
            return Err(ToolchainError::CompilationFailed {
                status: None,
                diagnostics: format!(
                    "{} timed out after {}s",
                    self.config.compiler, self.config.timeout_secs
                ),
            });
        }
        if !result.success() {
            return Err(ToolchainError::CompilationFailed {
                status: result.exit_code(),
                diagnostics: result.stderr,
            });
        }

        info!(
            binary = %binary.display(),
            elapsed_ms = result.duration.as_millis() as u64,
            "compiled generated source"
        );
        Ok(binary)
    }

    /// Run a compiled harness and return its predictions in test-vector order.
    pub fn run_harness(&self, binary: &Path) -> Result<Vec<f64>> {
        // A bare file name would otherwise be looked up on PATH.
        let program = if binary.is_relative() && binary.parent() == Some(Path::new("")) {
            Path::new(".").join(binary)
        } else {
            binary.to_path_buf()
        };
        let command = Command::new(program);
        let result = run_with_timeout(command, self.config.timeout()).map_err(|e| {
            ToolchainError::ExecutionFailed {
                binary: binary.to_path_buf(),
                status: None,
                diagnostics: e.to_string(),
            }
        })?;

        if result.timed_out {
            return Err(ToolchainError::ExecutionFailed {
                binary: binary.to_path_buf(),
                status: None,
                diagnostics: format!("timed out after {}s", self.config.timeout_secs),
            });
        }
        if !result.success() {
            return Err(ToolchainError::ExecutionFailed {
                binary: binary.to_path_buf(),
                status: result.exit_code(),
                diagnostics: result.stderr,
            });
        }

        Ok(parse_harness_output(&result.stdout)?)
    }
}
