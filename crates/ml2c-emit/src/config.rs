use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Append a `main` that runs `prediction` over the test vectors.
    pub emit_harness: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self { emit_harness: true }
    }
}

impl EmitterConfig {
    pub fn library_only() -> Self {
        Self {
            emit_harness: false,
        }
    }
}
