/*! Transpile trained models to standalone C.
 *
 * One import for the whole pipeline: load or build a model, extract its spec, emit C with a test
 * harness, and optionally compile and run it. The individual crates stay available for callers
 * that only need one stage.
 */

pub use ml2c_core as core;
pub use ml2c_emit as emit;
pub use ml2c_parser as parser;
pub use ml2c_toolchain as toolchain;

pub mod config;
pub mod transpiler;

pub use config::Ml2cConfig;
pub use transpiler::{default_output_file, transpile_model, TranspileOutput, Transpiler};

pub use ml2c_core::{extract, LoadedModel, Ml2cError, ModelKind, ModelSpec, TreeSpec};
pub use ml2c_emit::{CEmitter, EmitError, EmitterConfig, GeneratedSource, TestVectors};
pub use ml2c_toolchain::{Toolchain, ToolchainConfig, ToolchainError};

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranspileError {
    #[error(transparent)]
    Model(#[from] Ml2cError),
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot link {}: harness generation is disabled, so the source has no main", .c_file.display())]
    HarnessDisabled { c_file: PathBuf },
    #[error("Invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, TranspileError>;
