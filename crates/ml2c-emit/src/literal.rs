//! C float literals.
//!
//! Model parameters are printed with 10 fractional digits and an `f` suffix, so the compiler
//! stores them as 32-bit floats. Values keep full precision up to this point and are narrowed
//! only by the C compiler; generated predictions therefore differ from the double-precision
//! model by up to single-precision rounding. Rust's float formatting ignores locale, so the
//! decimal separator is always `.`.

/// Fractional digits for model parameters.
pub const PARAMETER_PRECISION: usize = 10;

/// Fractional digits for harness test inputs.
pub const TEST_INPUT_PRECISION: usize = 6;

pub fn format_float_literal(value: f64) -> String {
    render(value, PARAMETER_PRECISION)
}

pub fn format_test_literal(value: f64) -> String {
    render(value, TEST_INPUT_PRECISION)
}

/// A leaf's class id as the float `prediction` returns.
pub fn format_class_literal(class_id: usize) -> String {
    format!("{}.0f", class_id)
}

fn render(value: f64, precision: usize) -> String {
    if value.is_nan() {
        "(0.0f / 0.0f)".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "(1.0f / 0.0f)".to_string()
        } else {
            "(-1.0f / 0.0f)".to_string()
        }
    } else {
        format!("{:.*}f", precision, value)
    }
}
