//! Test harness generation.
//!
//! The harness is a `main` that feeds fixed vectors through `prediction` and prints one
//! `  Test <i>: <value>` line per vector under a `C Predictions:` header. It never checks the
//! values; comparing against the source model happens outside the generated program.

use crate::emitter::{EmitContext, EmitError, EmitHelper, EmitResult, Emitter};
use crate::literal::format_test_literal;
use serde::{Deserialize, Serialize};

pub const HARNESS_HEADER: &str = "C Predictions:";

/// Accepted shapes for user-supplied test data: a matrix, or one flat vector.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TestData {
    Matrix(Vec<Vec<f64>>),
    Vector(Vec<f64>),
}

/// Feature vectors embedded in the harness, one `prediction` call each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TestData")]
pub struct TestVectors {
    rows: Vec<Vec<f64>>,
}

impl TestVectors {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }

    pub fn single(row: Vec<f64>) -> Self {
        Self { rows: vec![row] }
    }

    pub fn ones(n_features: usize) -> Self {
        Self::single(vec![1.0; n_features])
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<TestData> for TestVectors {
    fn from(data: TestData) -> Self {
        match data {
            TestData::Matrix(rows) => Self::new(rows),
            TestData::Vector(row) => Self::single(row),
        }
    }
}

pub struct HarnessGenerator {
    n_features: usize,
}

impl HarnessGenerator {
    pub fn new(n_features: usize) -> Self {
        Self { n_features }
    }

    fn check(&self, vectors: &TestVectors) -> EmitResult {
        if vectors.is_empty() {
            return Err(ml2c_core::Ml2cError::ContractViolation(
                "harness needs at least one test vector".to_string(),
            )
            .into());
        }
        for (index, row) in vectors.rows().iter().enumerate() {
            if row.len() != self.n_features {
                return Err(EmitError::TestVector {
                    index,
                    expected: self.n_features,
                    actual: row.len(),
                });
            }
        }
        Ok(())
    }
}

impl Emitter for HarnessGenerator {
    type Item = TestVectors;

    fn emit(&self, item: &TestVectors, out: &mut String, context: &mut EmitContext) -> EmitResult {
        self.check(item)?;

        EmitHelper::write_block(out, context, "int main(void)", |w, c| {
            for (index, row) in item.rows().iter().enumerate() {
                let values: Vec<String> = row.iter().map(|v| format_test_literal(*v)).collect();
                EmitHelper::write_line(
                    w,
                    c,
                    &format!("float test_{}[] = {{{}}};", index, values.join(", ")),
                )?;
            }
            for index in 0..item.len() {
                EmitHelper::write_line(
                    w,
                    c,
                    &format!(
                        "float pred_{} = prediction(test_{}, {});",
                        index, index, self.n_features
                    ),
                )?;
            }
            EmitHelper::write_line(w, c, &format!("printf(\"{}\\n\");", HARNESS_HEADER))?;
            for index in 0..item.len() {
                EmitHelper::write_line(
                    w,
                    c,
                    &format!("printf(\"  Test {}: %f\\n\", pred_{});", index, index),
                )?;
            }
            EmitHelper::write_line(w, c, "return 0;")
        })
    }
}

/// Recover the printed predictions, in test-index order, from a harness run's stdout.
pub fn parse_harness_output(stdout: &str) -> EmitResult<Vec<f64>> {
    let mut lines = stdout.lines().skip_while(|line| line.trim() != HARNESS_HEADER);
    if lines.next().is_none() {
        return Err(EmitError::HarnessOutput(format!(
            "missing '{}' header",
            HARNESS_HEADER
        )));
    }

    let mut values = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (label, value) = line
            .strip_prefix("Test ")
            .and_then(|rest| rest.split_once(':'))
            .ok_or_else(|| EmitError::HarnessOutput(format!("unrecognised line '{}'", line)))?;
        let index: usize = label
            .trim()
            .parse()
            .map_err(|_| EmitError::HarnessOutput(format!("bad test index in '{}'", line)))?;
        if index != values.len() {
            return Err(EmitError::HarnessOutput(format!(
                "expected test {}, found test {}",
                values.len(),
                index
            )));
        }
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| EmitError::HarnessOutput(format!("bad value in '{}'", line)))?;
        values.push(value);
    }
    Ok(values)
}
