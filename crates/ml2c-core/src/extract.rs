use crate::model::{LoadedModel, ModelKind, TreeTable};
use crate::spec::{ModelSpec, TreeSpec};
use crate::{Ml2cError, Result};
use serde::de::Error as _;
use serde::Deserialize;
use tracing::debug;

#[derive(Deserialize)]
#[serde(untagged)]
enum Intercept {
    Scalar(f64),
    Vector(Vec<f64>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Coefficients {
    Flat(Vec<f64>),
    Rows(Vec<Vec<f64>>),
}

/// Resolve a loaded model into the `ModelSpec` variant matching its type.
///
/// The model is only read. Types other than `LinearRegression`, `LogisticRegression` and
/// `DecisionTreeClassifier` fail with [`Ml2cError::UnsupportedModelKind`].
pub fn extract(model: &LoadedModel) -> Result<ModelSpec> {
    let kind = model
        .kind()
        .ok_or_else(|| Ml2cError::UnsupportedModelKind(model.model_type.clone()))?;

    let spec = match kind {
        ModelKind::Linear => ModelSpec::linear(
            single_intercept(attribute(model, "intercept_")?)?,
            single_row(attribute(model, "coef_")?)?,
        )?,
        ModelKind::Logistic => ModelSpec::logistic(
            single_intercept(attribute(model, "intercept_")?)?,
            single_row(attribute(model, "coef_")?)?,
        )?,
        ModelKind::Tree => {
            let table: TreeTable = attribute(model, "tree_")?;
            ModelSpec::tree(TreeSpec::from_table(
                &table,
                attribute(model, "n_features_in_")?,
            )?)
        }
    };

    debug!(
        model_type = %kind,
        n_features = spec.n_features(),
        "extracted model spec"
    );
    Ok(spec)
}

impl TryFrom<&LoadedModel> for ModelSpec {
    type Error = Ml2cError;

    fn try_from(model: &LoadedModel) -> Result<Self> {
        extract(model)
    }
}

/// Deserialize one attribute straight from the borrowed JSON value.
fn attribute<'a, T: Deserialize<'a>>(model: &'a LoadedModel, name: &'static str) -> Result<T> {
    let parsed = match model.attribute(name) {
        Some(value) => T::deserialize(value),
        None => Err(serde_json::Error::missing_field(name)),
    };
    parsed.map_err(|source| Ml2cError::InvalidAttributes {
        model_type: model.model_type.clone(),
        source,
    })
}

fn single_intercept(intercept: Intercept) -> Result<f64> {
    match intercept {
        Intercept::Scalar(value) => Ok(value),
        Intercept::Vector(values) if values.len() == 1 => Ok(values[0]),
        Intercept::Vector(values) => Err(Ml2cError::ContractViolation(format!(
            "expected a single intercept, found {}",
            values.len()
        ))),
    }
}

fn single_row(coefficients: Coefficients) -> Result<Vec<f64>> {
    match coefficients {
        Coefficients::Flat(values) => Ok(values),
        Coefficients::Rows(mut rows) if rows.len() == 1 => Ok(rows.remove(0)),
        Coefficients::Rows(rows) => Err(Ml2cError::ContractViolation(format!(
            "expected a single row of coefficients, found {} (multi-output models are not supported)",
            rows.len()
        ))),
    }
}
