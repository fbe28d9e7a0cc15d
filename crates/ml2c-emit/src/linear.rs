use crate::emitter::{EmitContext, EmitHelper, EmitResult, Emitter};
use crate::literal::format_float_literal;
use crate::source::PREDICTION_SIGNATURE;
use ml2c_core::LinearSpec;

/// What happens to the affine sum before `prediction` returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Identity,
    Sigmoid,
}

impl Activation {
    fn accumulator(&self) -> &'static str {
        match self {
            Activation::Identity => "result",
            Activation::Sigmoid => "z",
        }
    }

    fn return_statement(&self) -> &'static str {
        match self {
            Activation::Identity => "return result;",
            Activation::Sigmoid => "return sigmoid(z);",
        }
    }
}

/// Emits `prediction` for linear and logistic models as straight-line accumulation.
pub struct LinearEmitter {
    activation: Activation,
}

impl LinearEmitter {
    pub fn new(activation: Activation) -> Self {
        Self { activation }
    }

    pub fn linear() -> Self {
        Self::new(Activation::Identity)
    }

    pub fn logistic() -> Self {
        Self::new(Activation::Sigmoid)
    }

    /// `sigmoid` must precede `prediction` in the file; it is always emitted for logistic models.
    pub fn emit_sigmoid_helper(out: &mut String, context: &mut EmitContext) -> EmitResult {
        EmitHelper::write_block(out, context, "float sigmoid(float x)", |w, c| {
            EmitHelper::write_line(w, c, "return 1.0f / (1.0f + expf(-x));")
        })
    }
}

impl Emitter for LinearEmitter {
    type Item = LinearSpec;

    fn emit(&self, item: &LinearSpec, out: &mut String, context: &mut EmitContext) -> EmitResult {
        let acc = self.activation.accumulator();

        EmitHelper::write_block(out, context, PREDICTION_SIGNATURE, |w, c| {
            EmitHelper::write_line(
                w,
                c,
                &format!("float {} = {};", acc, format_float_literal(item.intercept())),
            )?;
            for (index, coefficient) in item.coefficients().iter().enumerate() {
                EmitHelper::write_line(
                    w,
                    c,
                    &format!(
                        "{} += {} * features[{}];",
                        acc,
                        format_float_literal(*coefficient),
                        index
                    ),
                )?;
            }
            EmitHelper::write_line(w, c, self.activation.return_statement())
        })
    }
}
