use crate::config::EmitterConfig;
use crate::emitter::{EmitContext, EmitHelper, EmitResult, Emitter};
use crate::harness::{HarnessGenerator, TestVectors};
use crate::linear::LinearEmitter;
use crate::tree::TreeEmitter;
use ml2c_core::ModelSpec;
use std::fmt;
use tracing::debug;

pub const PREDICTION_SIGNATURE: &str = "float prediction(float *features, int n_features)";

/// A complete C translation unit produced by [`CEmitter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource(String);

impl GeneratedSource {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for GeneratedSource {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneratedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Assembles includes, helpers, `prediction` and the optional harness, in that order.
#[derive(Debug, Clone, Default)]
pub struct CEmitter {
    config: EmitterConfig,
}

impl CEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Generate the source for `spec`. Without `test_vectors` the harness runs one all-ones
    /// vector.
    pub fn emit(
        &self,
        spec: &ModelSpec,
        test_vectors: Option<&TestVectors>,
    ) -> EmitResult<GeneratedSource> {
        let mut out = String::new();
        let mut context = EmitContext::new();

        EmitHelper::write_line(&mut out, &context, "#include <stdio.h>")?;
        if matches!(spec, ModelSpec::Logistic(_)) {
            EmitHelper::write_line(&mut out, &context, "#include <math.h>")?;
        }
        EmitHelper::blank_line(&mut out);

        match spec {
            ModelSpec::Linear(linear) => {
                LinearEmitter::linear().emit(linear, &mut out, &mut context)?;
            }
            ModelSpec::Logistic(linear) => {
                LinearEmitter::emit_sigmoid_helper(&mut out, &mut context)?;
                EmitHelper::blank_line(&mut out);
                LinearEmitter::logistic().emit(linear, &mut out, &mut context)?;
            }
            ModelSpec::Tree(tree) => {
                TreeEmitter::new().emit(tree, &mut out, &mut context)?;
            }
        }

        if self.config.emit_harness {
            EmitHelper::blank_line(&mut out);
            let harness = HarnessGenerator::new(spec.n_features());
            match test_vectors {
                Some(vectors) => harness.emit(vectors, &mut out, &mut context)?,
                None => harness.emit(
                    &TestVectors::ones(spec.n_features()),
                    &mut out,
                    &mut context,
                )?,
            }
        }

        debug!(
            model_type = %spec.kind(),
            n_features = spec.n_features(),
            bytes = out.len(),
            "emitted C source"
        );
        Ok(GeneratedSource(out))
    }
}
