use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// Child index the training library stores for "no child".
pub const TREE_LEAF: i64 = -1;

/// A trained model as handed over by the loading layer: the library's type name plus its fitted
/// attributes, keyed by the names the training library uses (`coef_`, `intercept_`, `tree_`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedModel {
    pub model_type: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl LoadedModel {
    pub fn new(model_type: impl Into<String>) -> Self {
        Self {
            model_type: model_type.into(),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: Value) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn linear_regression(intercept: f64, coefficients: &[f64]) -> Self {
        Self::new(ModelKind::Linear.type_name())
            .with_attribute("intercept_", json!(intercept))
            .with_attribute("coef_", json!(coefficients))
    }

    pub fn logistic_regression(intercept: f64, coefficients: &[f64]) -> Self {
        Self::new(ModelKind::Logistic.type_name())
            .with_attribute("intercept_", json!([intercept]))
            .with_attribute("coef_", json!([coefficients]))
    }

    pub fn decision_tree_classifier(n_features: usize, tree: &TreeTable) -> Self {
        Self::new(ModelKind::Tree.type_name())
            .with_attribute("n_features_in_", json!(n_features))
            .with_attribute("tree_", json!(tree))
    }

    pub fn kind(&self) -> Option<ModelKind> {
        ModelKind::from_type_name(&self.model_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    Linear,
    Logistic,
    Tree,
}

impl ModelKind {
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "LinearRegression" => Some(ModelKind::Linear),
            "LogisticRegression" => Some(ModelKind::Logistic),
            "DecisionTreeClassifier" => Some(ModelKind::Tree),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ModelKind::Linear => "LinearRegression",
            ModelKind::Logistic => "LogisticRegression",
            ModelKind::Tree => "DecisionTreeClassifier",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Parallel-array layout of a fitted binary decision tree.
///
/// `value[node][output]` is the per-class sample count vector of `node`; only the first output
/// is used. Leaves have `children_left[node] == children_right[node]` (both `TREE_LEAF`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeTable {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<Vec<f64>>>,
}

impl TreeTable {
    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }
}
