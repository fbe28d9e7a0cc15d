/*! Turn model specs into standalone C source.
 *
 * Each model variant gets its own emitter for the body of `prediction`; the tree emitter lowers
 * the node table into nested conditionals. `CEmitter` stitches includes, helpers, `prediction`
 * and the optional test harness together in a fixed order, so the same spec always yields the
 * same bytes.
 */

pub mod config;
pub mod emitter;
pub mod harness;
pub mod linear;
pub mod literal;
pub mod source;
pub mod tree;

pub use config::EmitterConfig;
pub use emitter::{EmitContext, EmitError, EmitHelper, EmitResult, Emitter};
pub use harness::{parse_harness_output, HarnessGenerator, TestVectors};
pub use linear::{Activation, LinearEmitter};
pub use literal::{format_class_literal, format_float_literal, format_test_literal};
pub use source::{CEmitter, GeneratedSource, PREDICTION_SIGNATURE};
pub use tree::TreeEmitter;
