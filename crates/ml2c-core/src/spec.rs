use crate::model::{ModelKind, TreeTable};
use crate::{Ml2cError, Result};
use serde::Serialize;

/// Everything an emitter needs to know about a trained model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ModelSpec {
    Linear(LinearSpec),
    Logistic(LinearSpec),
    Tree(TreeSpec),
}

impl ModelSpec {
    pub fn linear(intercept: f64, coefficients: Vec<f64>) -> Result<Self> {
        Ok(ModelSpec::Linear(LinearSpec::new(intercept, coefficients)?))
    }

    pub fn logistic(intercept: f64, coefficients: Vec<f64>) -> Result<Self> {
        Ok(ModelSpec::Logistic(LinearSpec::new(intercept, coefficients)?))
    }

    pub fn tree(tree: TreeSpec) -> Self {
        ModelSpec::Tree(tree)
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            ModelSpec::Linear(_) => ModelKind::Linear,
            ModelSpec::Logistic(_) => ModelKind::Logistic,
            ModelSpec::Tree(_) => ModelKind::Tree,
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            ModelSpec::Linear(linear) | ModelSpec::Logistic(linear) => linear.n_features(),
            ModelSpec::Tree(tree) => tree.n_features(),
        }
    }
}

/// Affine map parameters shared by linear and logistic models.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearSpec {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearSpec {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(Ml2cError::ContractViolation(
                "linear model must have at least one coefficient".to_string(),
            ));
        }
        Ok(Self {
            intercept,
            coefficients,
        })
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// `intercept + Σ coefficients[i] * features[i]` in double precision.
    pub fn decision_function(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coefficients.len() {
            return Err(Ml2cError::ContractViolation(format!(
                "expected {} features, got {}",
                self.coefficients.len(),
                features.len()
            )));
        }
        Ok(self
            .coefficients
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (c, x)| acc + c * x))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub id: usize,
    pub left_child: usize,
    pub right_child: usize,
    pub feature: usize,
    pub threshold: f64,
    pub is_leaf: bool,
    pub leaf_value: Option<usize>,
}

impl TreeNode {
    pub const NO_CHILD: usize = usize::MAX;

    pub fn leaf(id: usize, class_id: usize) -> Self {
        Self {
            id,
            left_child: Self::NO_CHILD,
            right_child: Self::NO_CHILD,
            feature: 0,
            threshold: 0.0,
            is_leaf: true,
            leaf_value: Some(class_id),
        }
    }

    pub fn split(id: usize, feature: usize, threshold: f64, left: usize, right: usize) -> Self {
        Self {
            id,
            left_child: left,
            right_child: right,
            feature,
            threshold,
            is_leaf: left == right,
            leaf_value: None,
        }
    }
}

/// A binary decision tree stored as an indexed node table rooted at node 0.
///
/// Construction validates the whole table: every node is reachable from the root exactly once,
/// children are in range, split features are in `[0, n_features)`, thresholds are finite, and
/// every leaf carries a class id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeSpec {
    nodes: Vec<TreeNode>,
    n_features: usize,
}

impl TreeSpec {
    pub fn new(nodes: Vec<TreeNode>, n_features: usize) -> Result<Self> {
        let tree = Self { nodes, n_features };
        tree.validate()?;
        Ok(tree)
    }

    pub fn from_table(table: &TreeTable, n_features: usize) -> Result<Self> {
        let n_nodes = table.node_count();
        let lengths = [
            table.children_right.len(),
            table.feature.len(),
            table.threshold.len(),
            table.value.len(),
        ];
        if lengths.iter().any(|&len| len != n_nodes) {
            return Err(Ml2cError::MalformedTree(format!(
                "tree arrays disagree on node count: children_left={}, children_right={}, feature={}, threshold={}, value={}",
                n_nodes, lengths[0], lengths[1], lengths[2], lengths[3]
            )));
        }

        let mut nodes = Vec::with_capacity(n_nodes);
        for id in 0..n_nodes {
            let left = table.children_left[id];
            let right = table.children_right[id];

            if left == right {
                let counts = table.value[id].first().ok_or_else(|| {
                    Ml2cError::MalformedTree(format!("leaf {} has no class counts", id))
                })?;
                let class_id = argmax(counts).ok_or_else(|| {
                    Ml2cError::MalformedTree(format!("leaf {} has an empty class count vector", id))
                })?;
                nodes.push(TreeNode::leaf(id, class_id));
                continue;
            }

            let left = table_index(id, "left child", left)?;
            let right = table_index(id, "right child", right)?;
            let feature = table_index(id, "feature", table.feature[id])?;
            nodes.push(TreeNode::split(
                id,
                feature,
                table.threshold[id],
                left,
                right,
            ));
        }

        Self::new(nodes, n_features)
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn node(&self, id: usize) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf).count()
    }

    /// Number of node levels on the longest root-to-leaf path; a lone root leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 1usize)];
        while let Some((id, level)) = stack.pop() {
            let node = &self.nodes[id];
            if node.is_leaf {
                deepest = deepest.max(level);
            } else {
                stack.push((node.left_child, level + 1));
                stack.push((node.right_child, level + 1));
            }
        }
        deepest
    }

    /// Class id the tree assigns to `features`, routing ties at a threshold to the left.
    pub fn predict(&self, features: &[f64]) -> Result<usize> {
        if features.len() != self.n_features {
            return Err(Ml2cError::ContractViolation(format!(
                "expected {} features, got {}",
                self.n_features,
                features.len()
            )));
        }
        let mut node = self.root();
        while !node.is_leaf {
            let next = if features[node.feature] <= node.threshold {
                node.left_child
            } else {
                node.right_child
            };
            node = &self.nodes[next];
        }
        node.leaf_value
            .ok_or_else(|| Ml2cError::MalformedTree(format!("leaf {} has no class id", node.id)))
    }

    fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Ml2cError::MalformedTree("tree has no nodes".to_string()));
        }
        if self.n_features == 0 {
            return Err(Ml2cError::ContractViolation(
                "tree model must have at least one feature".to_string(),
            ));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if node.id != index {
                return Err(Ml2cError::MalformedTree(format!(
                    "node at index {} carries id {}",
                    index, node.id
                )));
            }
            if node.is_leaf != (node.left_child == node.right_child) {
                return Err(Ml2cError::MalformedTree(format!(
                    "node {} leaf flag disagrees with its children",
                    index
                )));
            }
            if node.is_leaf {
                if node.leaf_value.is_none() {
                    return Err(Ml2cError::MalformedTree(format!(
                        "leaf {} has no class id",
                        index
                    )));
                }
                continue;
            }
            for child in [node.left_child, node.right_child] {
                if child >= self.nodes.len() {
                    return Err(Ml2cError::MalformedTree(format!(
                        "node {} points at child {} outside {} nodes",
                        index,
                        child,
                        self.nodes.len()
                    )));
                }
            }
            if node.feature >= self.n_features {
                return Err(Ml2cError::MalformedTree(format!(
                    "node {} splits on feature {} but the model has {} features",
                    index, node.feature, self.n_features
                )));
            }
            if !node.threshold.is_finite() {
                return Err(Ml2cError::MalformedTree(format!(
                    "node {} has non-finite threshold {}",
                    index, node.threshold
                )));
            }
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![0usize];
        let mut reached = 0;
        while let Some(id) = stack.pop() {
            if visited[id] {
                return Err(Ml2cError::MalformedTree(format!(
                    "node {} is reachable more than once",
                    id
                )));
            }
            visited[id] = true;
            reached += 1;
            let node = &self.nodes[id];
            if !node.is_leaf {
                stack.push(node.right_child);
                stack.push(node.left_child);
            }
        }
        if reached != self.nodes.len() {
            let unreachable: Vec<usize> = visited
                .iter()
                .enumerate()
                .filter(|(_, seen)| !**seen)
                .map(|(id, _)| id)
                .collect();
            return Err(Ml2cError::MalformedTree(format!(
                "nodes {:?} are unreachable from the root",
                unreachable
            )));
        }

        Ok(())
    }
}

fn table_index(node: usize, what: &str, raw: i64) -> Result<usize> {
    usize::try_from(raw).map_err(|_| {
        Ml2cError::MalformedTree(format!("node {} has invalid {} index {}", node, what, raw))
    })
}

/// Index of the largest count; the first one wins on ties.
fn argmax(counts: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &count) in counts.iter().enumerate() {
        match best {
            Some((_, top)) if count <= top => {}
            _ => best = Some((index, count)),
        }
    }
    best.map(|(index, _)| index)
}
