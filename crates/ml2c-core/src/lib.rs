/*! Normalized model descriptions for code generation.
 *
 * A trained model arrives as a bag of library-specific attributes. Code generation only needs a
 * handful of numbers from it, so this crate resolves the model kind once, validates the shape, and
 * hands out an immutable `ModelSpec` that emitters can match on without re-inspecting anything.
 */

pub mod extract;
pub mod model;
pub mod persist;
pub mod spec;

pub use extract::extract;
pub use model::{LoadedModel, ModelKind, TreeTable, TREE_LEAF};
pub use spec::{LinearSpec, ModelSpec, TreeNode, TreeSpec};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Ml2cError {
    #[error("Model type {0} not supported")]
    UnsupportedModelKind(String),
    #[error("Malformed tree: {0}")]
    MalformedTree(String),
    #[error("Contract violation: {0}")]
    ContractViolation(String),
    #[error("Invalid attributes for {model_type}: {source}")]
    InvalidAttributes {
        model_type: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Ml2cError>;

#[cfg(test)]
mod tests;
