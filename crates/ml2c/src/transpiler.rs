use crate::config::Ml2cConfig;
use crate::{Result, TranspileError};
use ml2c_core::persist::load_model;
use ml2c_core::{extract, LoadedModel, ModelSpec};
use ml2c_emit::{CEmitter, GeneratedSource, TestVectors};
use ml2c_toolchain::Toolchain;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Transpiles one model: holds its spec plus the emitter and toolchain settings to use.
#[derive(Debug, Clone)]
pub struct Transpiler {
    spec: ModelSpec,
    emitter: CEmitter,
    toolchain: Toolchain,
}

impl Transpiler {
    pub fn new(spec: ModelSpec) -> Self {
        Self::with_config(spec, &Ml2cConfig::from_env())
    }

    pub fn with_config(spec: ModelSpec, config: &Ml2cConfig) -> Self {
        Self {
            spec,
            emitter: CEmitter::with_config(config.emitter.clone()),
            toolchain: Toolchain::new(config.toolchain.clone()),
        }
    }

    pub fn from_model(model: &LoadedModel) -> Result<Self> {
        Ok(Self::new(extract(model)?))
    }

    /// Load a JSON model description from `model_path`.
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self> {
        let model_path = model_path.as_ref();
        let model = load_model(model_path).map_err(|source| TranspileError::Io {
            path: model_path.to_path_buf(),
            source,
        })?;
        Self::from_model(&model)
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    pub fn generate_c_code(&self, test_data: Option<&TestVectors>) -> Result<GeneratedSource> {
        Ok(self.emitter.emit(&self.spec, test_data)?)
    }

    /// Write the generated source to `output_file` and return its path.
    pub fn save(
        &self,
        output_file: impl AsRef<Path>,
        test_data: Option<&TestVectors>,
    ) -> Result<PathBuf> {
        let output_file = output_file.as_ref();
        let source = self.generate_c_code(test_data)?;
        fs::write(output_file, source.as_str()).map_err(|source| TranspileError::Io {
            path: output_file.to_path_buf(),
            source,
        })?;
        info!(
            path = %output_file.display(),
            model_type = %self.spec.kind(),
            "wrote generated C source"
        );
        Ok(output_file.to_path_buf())
    }

    /// Link `c_file` into an executable. Fails before invoking the compiler when this
    /// transpiler emits library-only source.
    pub fn compile(&self, c_file: impl AsRef<Path>, output_binary: Option<&Path>) -> Result<PathBuf> {
        let c_file = c_file.as_ref();
        if !self.emitter.config().emit_harness {
            return Err(TranspileError::HarnessDisabled {
                c_file: c_file.to_path_buf(),
            });
        }
        Ok(self.toolchain.compile(c_file, output_binary)?)
    }

    /// Execute a compiled harness and return its predictions.
    pub fn run(&self, binary: impl AsRef<Path>) -> Result<Vec<f64>> {
        Ok(self.toolchain.run_harness(binary.as_ref())?)
    }
}

/// `models/house.json` → `house_inference.c`, placed in the working directory.
pub fn default_output_file(model_path: &Path) -> PathBuf {
    let stem = model_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    PathBuf::from(format!("{}_inference.c", stem))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileOutput {
    pub c_file: PathBuf,
    pub binary: Option<PathBuf>,
}

/// Load, emit, save and optionally compile in one call.
///
/// Compilation failures are returned as errors; nothing is written beyond the source file and
/// whatever the compiler produced.
pub fn transpile_model(
    model_path: impl AsRef<Path>,
    output_file: Option<&Path>,
    compile: bool,
    test_data: Option<&TestVectors>,
) -> Result<TranspileOutput> {
    let model_path = model_path.as_ref();
    let transpiler = Transpiler::load(model_path)?;

    let output_file = output_file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_file(model_path));
    let c_file = transpiler.save(&output_file, test_data)?;

    let binary = if compile {
        match transpiler.compile(&c_file, None) {
            Ok(binary) => Some(binary),
            Err(e) => {
                warn!(c_file = %c_file.display(), "compilation failed");
                return Err(e);
            }
        }
    } else {
        None
    };

    Ok(TranspileOutput { c_file, binary })
}
